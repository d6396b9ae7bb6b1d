use ndarray::Axis;

use crate::grid::{Direction, GridLayout, QtyCentering};
use crate::field::{Field, VecField};
use crate::particle::{Ions, Particle};
use super::{BoundaryCondition, Edge, LeavingParticles};

/// Periodic domain: every edge is glued to the opposite one.
pub struct PeriodicBoundary {
    layout: GridLayout,
}

/*------------------------------------------------------------------------------------

  With N cells, node i and node i + N are the same point. Along x, for
  a quantity with physical range [s, e]:

     ghosts   |  s       ...        e  |   ghosts
     f[i < s] = f[i + N]               f[i > e] = f[i - N]

  For primal quantities e = s + N, so s and e are themselves images
  of each other. Deposited moments are folded before the ghosts are
  refilled: the ghost contributions are added onto their images, and
  the two edge nodes of a primal moment are summed.

------------------------------------------------------------------------------------*/

impl PeriodicBoundary {
    pub fn new(layout: &GridLayout) -> PeriodicBoundary {
        PeriodicBoundary {
            layout: layout.clone(),
        }
    }

    fn range(&self, field: &Field, dir: Direction) -> (usize, usize, usize, usize) {
        let c = self.layout.field_centering(field.quantity(), dir);
        let start = self.layout.physical_start_index(c, dir);
        let end = self.layout.physical_end_index(c, dir);
        let ghost_end = self.layout.ghost_end_index(c, dir);
        let n = self.layout.nbr_cells(dir) as usize;
        (start, end, ghost_end, n)
    }

    /// Copies the periodic image of every ghost node into it.
    pub fn fill_ghosts(&self, field: &mut Field) {
        for &dir in self.layout.active_directions() {
            let (start, end, ghost_end, n) = self.range(field, dir);
            for mut lane in field.data_mut().lanes_mut(Axis(dir.index())) {
                for i in 0..start {
                    lane[i] = lane[i + n];
                }
                for i in (end + 1)..=ghost_end {
                    lane[i] = lane[i - n];
                }
            }
        }
    }

    /// Folds ghost contributions of a deposited moment back into the
    /// physical domain, then refills the ghosts.
    pub fn fold(&self, field: &mut Field) {
        for &dir in self.layout.active_directions() {
            let (start, end, ghost_end, n) = self.range(field, dir);
            let primal = self.layout.field_centering(field.quantity(), dir) == QtyCentering::Primal;
            for mut lane in field.data_mut().lanes_mut(Axis(dir.index())) {
                for i in 0..start {
                    let g = lane[i];
                    lane[i + n] += g;
                }
                for i in (end + 1)..=ghost_end {
                    let g = lane[i];
                    lane[i - n] += g;
                }
                if primal {
                    let total = lane[start] + lane[end];
                    lane[start] = total;
                    lane[end] = total;
                }
            }
        }
        self.fill_ghosts(field);
    }

    fn fill_vector(&self, v: &mut VecField) {
        for c in v.components_mut().iter_mut() {
            self.fill_ghosts(c);
        }
    }
}

impl BoundaryCondition for PeriodicBoundary {
    fn apply_magnetic_bc(&self, b: &mut VecField) {
        self.fill_vector(b);
    }

    fn apply_electric_bc(&self, e: &mut VecField) {
        self.fill_vector(e);
    }

    fn apply_current_bc(&self, j: &mut VecField) {
        self.fill_vector(j);
    }

    fn apply_density_bc(&self, rho: &mut Field) {
        self.fold(rho);
    }

    // the species densities are folded along with their fluxes so that
    // per-species moments read the same as the totals
    fn apply_flux_bc(&self, ions: &mut Ions) {
        for species in ions.species_mut() {
            self.fold(species.rho_mut());
            for c in species.flux_mut().components_mut().iter_mut() {
                self.fold(c);
            }
        }
    }

    fn apply_outgoing_particle_bc(&self, particles: &mut Vec<Particle>, leaving: &LeavingParticles) {
        for &dir in self.layout.active_directions() {
            let d = dir.index();
            let n = self.layout.nbr_cells(dir) as i32;
            for &i in leaving.indexes(dir, Edge::Lower).iter().chain(leaving.indexes(dir, Edge::Upper)) {
                particles[i].icell[d] = particles[i].icell[d].rem_euclid(n);
            }
        }
    }

    // A domain edge has no parent patch to receive particles from.
    fn apply_incoming_particle_bc(&self, _particles: &mut Vec<Particle>, _pusher: &str, _dt: f64, _species: &str, _update: bool) {}
}
