//! Particle orbit integration.

use std::fmt;
use std::error::Error;
use log::trace;
use num::Zero;
#[cfg(not(feature = "serial_push"))]
use rayon::prelude::*;

use crate::grid::GridLayout;
use crate::field::VecField;
use crate::interpolator::Interpolator;
use crate::boundary::{BoundaryCondition, LeavingParticles};
use crate::particle::{Particle, Vec3};

/// Integrators that can be selected by name.
#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub enum PusherKind {
    ModifiedBoris,
}

impl PusherKind {
    pub fn from_name(name: &str) -> Result<PusherKind, PusherError> {
        match name {
            "modified_boris" | "modifiedBoris" => Ok(PusherKind::ModifiedBoris),
            _ => Err(PusherError::Unknown(name.to_owned())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PusherKind::ModifiedBoris => "modified_boris",
        }
    }
}

pub enum PusherError {
    Unknown(String),
}

impl fmt::Debug for PusherError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PusherError::Unknown(s) => write!(f, "unknown pusher '{}', expected 'modified_boris'", s),
        }
    }
}

impl fmt::Display for PusherError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for PusherError {}

/// Advances particles through one time step of fixed length.
pub struct Pusher {
    kind: PusherKind,
    layout: GridLayout,
    dt: f64,
}

impl Pusher {
    pub fn new(layout: &GridLayout, name: &str, dt: f64) -> Result<Pusher, PusherError> {
        Ok(Pusher {
            kind: PusherKind::from_name(name)?,
            layout: layout.clone(),
            dt,
        })
    }

    pub fn pusher_type(&self) -> &'static str {
        self.kind.name()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Writes the particles of `particles_in`, advanced by one step in the
    /// fields (`E`, `B`), into `particles_out`, which is overwritten. The
    /// input is left untouched.
    #[allow(non_snake_case)]
    pub fn move_particles(&self, particles_in: &[Particle], particles_out: &mut Vec<Particle>, mass: f64, E: &VecField, B: &VecField, interpolator: &Interpolator, bc: &dyn BoundaryCondition) {
        particles_out.clear();
        particles_out.extend_from_slice(particles_in);
        self.move_in_place(particles_out, mass, E, B, interpolator, bc);
    }

    /// Advances `particles` by one step in place.
    #[allow(non_snake_case)]
    pub fn move_in_place(&self, particles: &mut Vec<Particle>, mass: f64, E: &VecField, B: &VecField, interpolator: &Interpolator, bc: &dyn BoundaryCondition) {
        let layout = &self.layout;
        let dt = self.dt;
        let kind = self.kind;

        let advance = |p: &mut Particle| {
            let (e, b) = interpolator.fields_at(layout, E, B, p);
            p.E = e;
            p.B = b;
            match kind {
                PusherKind::ModifiedBoris => boris(p, mass, dt),
            }
            p.advance_position(layout, dt);
        };

        #[cfg(not(feature = "serial_push"))]
        particles.par_iter_mut().for_each(advance);
        #[cfg(feature = "serial_push")]
        particles.iter_mut().for_each(advance);

        let leaving = LeavingParticles::find(layout, particles);
        if !leaving.is_empty() {
            trace!("{} particles crossed the patch boundary", leaving.len());
            bc.apply_outgoing_particle_bc(particles, &leaving);
        }
    }
}

/// Non-relativistic Boris update of the velocity, using the fields
/// cached on the particle.
pub fn boris(p: &mut Particle, mass: f64, dt: f64) {
    let v = Vec3::from(p.v);
    let e = Vec3::from(p.E);
    let b = Vec3::from(p.B);

    let alpha = 0.5 * dt * p.charge / mass;

    // half the electric field acceleration:
    // v_ = v + alpha E
    let v_minus = v + alpha * e;

    // magnetic field rotation:
    // v' = v_ + v_ x t, t = alpha B
    let t = alpha * b;
    let v_plus = if t.is_zero() {
        v_minus
    } else {
        let v_prime = v_minus + v_minus.cross(t);
        // v+ = v_ + v' x s, s = 2 t / (1 + t^2)
        let s = 2.0 * t / (1.0 + t.norm_sqr());
        v_minus + v_prime.cross(s)
    };

    // remaining electric field acceleration
    p.v = (v_plus + alpha * e).into();
}
