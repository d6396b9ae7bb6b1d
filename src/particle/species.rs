use crate::grid::{GridLayout, HybridQuantity};
use crate::field::{Field, VecField};
use crate::interpolator::Interpolator;
use super::Particle;

/// A population of ions sharing one mass, with the density and flux they
/// deposit on the mesh.
pub struct Species {
    name: String,
    mass: f64,
    particles: Vec<Particle>,
    rho: Field,
    flux: VecField,
}

impl Species {
    pub fn new(layout: &GridLayout, name: &str, mass: f64) -> Species {
        Species {
            name: name.to_owned(),
            mass,
            particles: Vec::new(),
            rho: Field::new(layout, HybridQuantity::Rho, &format!("{}_rho", name)),
            flux: VecField::new(layout, HybridQuantity::V, &format!("{}_flux", name)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    pub fn rho(&self) -> &Field {
        &self.rho
    }

    pub fn rho_mut(&mut self) -> &mut Field {
        &mut self.rho
    }

    pub fn flux(&self) -> &VecField {
        &self.flux
    }

    pub fn flux_mut(&mut self) -> &mut VecField {
        &mut self.flux
    }

    /// Replaces density and flux by the moments of the species' own particles.
    pub fn compute_moments(&mut self, interpolator: &Interpolator, layout: &GridLayout) {
        let Species {particles, rho, flux, ..} = self;
        rho.zero();
        flux.zero();
        interpolator.deposit(layout, particles, rho, flux);
    }

    /// Replaces density and flux by the moments of `particles`, typically
    /// a predicted copy of the species' particles.
    pub fn compute_moments_from(&mut self, interpolator: &Interpolator, layout: &GridLayout, particles: &[Particle]) {
        self.rho.zero();
        self.flux.zero();
        interpolator.deposit(layout, particles, &mut self.rho, &mut self.flux);
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy(self.mass)).sum()
    }
}
