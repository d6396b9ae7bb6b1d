use log::debug;

use crate::grid::{GridLayout, HybridQuantity};
use crate::field::{Field, VecField};
use crate::interpolator::Interpolator;
use super::Species;

/// Charge densities below this magnitude are treated as vacuum: the bulk
/// velocity there is zero and terms divided by density are dropped.
pub const DENSITY_FLOOR: f64 = 1.0e-12;

/// All ion species of a patch, with their total charge density and
/// charge-weighted bulk velocity.
pub struct Ions {
    species: Vec<Species>,
    rho: Field,
    bulk_velocity: VecField,
}

impl Ions {
    pub fn new(layout: &GridLayout, species: Vec<Species>) -> Ions {
        Ions {
            species,
            rho: Field::new(layout, HybridQuantity::Rho, "rho"),
            bulk_velocity: VecField::new(layout, HybridQuantity::V, "Vi"),
        }
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn species_mut(&mut self) -> &mut [Species] {
        &mut self.species
    }

    pub fn species_by_name(&self, name: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.name() == name)
    }

    pub fn rho(&self) -> &Field {
        &self.rho
    }

    pub fn rho_mut(&mut self) -> &mut Field {
        &mut self.rho
    }

    pub fn bulk_velocity(&self) -> &VecField {
        &self.bulk_velocity
    }

    pub fn nbr_particles(&self) -> usize {
        self.species.iter().map(|s| s.particles().len()).sum()
    }

    /// Deposits the moments of every species from its own particles.
    pub fn compute_species_moments(&mut self, interpolator: &Interpolator, layout: &GridLayout) {
        for s in self.species.iter_mut() {
            s.compute_moments(interpolator, layout);
        }
    }

    /// Total density, the node-wise sum of the species densities.
    pub fn compute_charge_density(&mut self) {
        self.rho.zero();
        for s in self.species.iter() {
            self.rho.add_assign(s.rho());
        }
    }

    /// Bulk velocity, total flux over total density. Nodes where the
    /// density magnitude is below `DENSITY_FLOOR` get zero velocity.
    pub fn compute_bulk_velocity(&mut self) {
        self.bulk_velocity.zero();
        for s in self.species.iter() {
            self.bulk_velocity.add_assign(s.flux());
        }

        let mut vacuum = 0;
        for v in self.bulk_velocity.components_mut().iter_mut() {
            ndarray::Zip::from(v.data_mut())
                .and(self.rho.data())
                .apply(|v, &n| {
                    if n.abs() < DENSITY_FLOOR {
                        *v = 0.0;
                        vacuum += 1;
                    } else {
                        *v /= n;
                    }
                });
        }

        if vacuum > 0 {
            debug!("bulk velocity zeroed at {} empty nodes", vacuum / 3);
        }
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.species.iter().map(|s| s.kinetic_energy()).sum()
    }
}
