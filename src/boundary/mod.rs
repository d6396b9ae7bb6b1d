//! Domain-edge policies for fields, moments and particles.

use std::fmt;
use std::error::Error;

use crate::grid::{Direction, GridLayout};
use crate::field::{Field, VecField};
use crate::particle::{Ions, Particle};

mod periodic;
pub use self::periodic::*;

/// Lower or upper edge of the patch along one direction.
#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub enum Edge {
    Lower,
    Upper,
}

/// Indexes of the particles that ended a push outside the physical
/// cells, grouped by direction and edge. A particle that left through a
/// corner appears once per direction it crossed.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct LeavingParticles {
    lists: [Vec<usize>; 6],
}

impl LeavingParticles {
    pub fn new() -> LeavingParticles {
        LeavingParticles::default()
    }

    /// Scans `particles` for cell indexes outside `[0, N)`.
    pub fn find(layout: &GridLayout, particles: &[Particle]) -> LeavingParticles {
        let mut leaving = LeavingParticles::new();
        for (i, p) in particles.iter().enumerate() {
            for &dir in layout.active_directions() {
                let icell = p.icell[dir.index()];
                if icell < 0 {
                    leaving.push(dir, Edge::Lower, i);
                } else if icell >= layout.nbr_cells(dir) as i32 {
                    leaving.push(dir, Edge::Upper, i);
                }
            }
        }
        leaving
    }

    fn slot(dir: Direction, edge: Edge) -> usize {
        2 * dir.index() + match edge {
            Edge::Lower => 0,
            Edge::Upper => 1,
        }
    }

    pub fn push(&mut self, dir: Direction, edge: Edge, index: usize) {
        self.lists[Self::slot(dir, edge)].push(index);
    }

    pub fn indexes(&self, dir: Direction, edge: Edge) -> &[usize] {
        &self.lists[Self::slot(dir, edge)]
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(|l| l.is_empty())
    }

    /// Number of crossings, counting corners once per direction.
    pub fn len(&self) -> usize {
        self.lists.iter().map(|l| l.len()).sum()
    }
}

/// Policy applied at the edges of the simulation domain.
///
/// The solver calls these at fixed points of every step and never looks
/// behind them; the layout is fixed when the condition is built.
pub trait BoundaryCondition {
    fn apply_magnetic_bc(&self, b: &mut VecField);
    fn apply_electric_bc(&self, e: &mut VecField);
    fn apply_current_bc(&self, j: &mut VecField);
    fn apply_density_bc(&self, rho: &mut Field);
    fn apply_flux_bc(&self, ions: &mut Ions);
    fn apply_outgoing_particle_bc(&self, particles: &mut Vec<Particle>, leaving: &LeavingParticles);
    fn apply_incoming_particle_bc(&self, particles: &mut Vec<Particle>, pusher: &str, dt: f64, species: &str, update: bool);
}

pub enum BoundaryError {
    Unknown(String),
}

impl fmt::Debug for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BoundaryError::Unknown(s) => write!(f, "unknown boundary condition '{}', expected 'periodic'", s),
        }
    }
}

impl fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for BoundaryError {}

/// Builds the boundary condition called `name` for `layout`.
pub fn boundary_condition(name: &str, layout: &GridLayout) -> Result<Box<dyn BoundaryCondition>, BoundaryError> {
    match name {
        "periodic" => Ok(Box::new(PeriodicBoundary::new(layout))),
        _ => Err(BoundaryError::Unknown(name.to_owned())),
    }
}
