use rand::prelude::*;
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256StarStar;

use crate::grid::{Direction, GridLayout, QtyCentering};
use super::Particle;

/// A profile along x, as read from the input file.
pub type Profile = Box<dyn Fn(f64) -> f64>;

/// Something that can fill a species with its initial particles.
pub trait ParticleInitializer {
    fn load_particles(&self, particles: &mut Vec<Particle>);
}

/// Loads a drifting Maxwellian with prescribed density, bulk velocity and
/// thermal speed.
///
/// Every physical cell with positive density receives `npc` particles at
/// uniformly random offsets. The profiles are sampled at the cell centre,
/// so all particles in a cell share the weight `n / npc`.
pub struct FluidParticleInitializer {
    layout: GridLayout,
    density: Profile,
    bulk_velocity: [Profile; 3],
    thermal_speed: Profile,
    charge: f64,
    npc: usize,
    seed: u64,
}

impl FluidParticleInitializer {
    pub fn new(layout: &GridLayout, density: Profile, bulk_velocity: [Profile; 3], thermal_speed: Profile, charge: f64, npc: usize, seed: u64) -> FluidParticleInitializer {
        FluidParticleInitializer {
            layout: layout.clone(),
            density,
            bulk_velocity,
            thermal_speed,
            charge,
            npc,
            seed,
        }
    }
}

impl ParticleInitializer for FluidParticleInitializer {
    fn load_particles(&self, particles: &mut Vec<Particle>) {
        let layout = &self.layout;
        let mut rng = Xoshiro256StarStar::seed_from_u64(self.seed);

        let mut ncells = [1u32; 3];
        for &dir in layout.active_directions() {
            ncells[dir.index()] = layout.nbr_cells(dir);
        }

        for ix in 0..ncells[0] {
            for iy in 0..ncells[1] {
                for iz in 0..ncells[2] {
                    let icell = [ix as i32, iy as i32, iz as i32];
                    let mut node = [0usize; 3];
                    for &dir in layout.active_directions() {
                        let d = dir.index();
                        node[d] = layout.physical_start_index(QtyCentering::Primal, dir) + icell[d] as usize;
                    }

                    let x = layout.cell_centered_coordinates(node).component(Direction::X);
                    let n = (self.density)(x);
                    if n <= 0.0 || self.npc == 0 {
                        continue;
                    }

                    let weight = n / (self.npc as f64);
                    let vth = (self.thermal_speed)(x);
                    let bulk = [
                        (self.bulk_velocity[0])(x),
                        (self.bulk_velocity[1])(x),
                        (self.bulk_velocity[2])(x),
                    ];

                    for _ in 0..self.npc {
                        let mut delta = [0.0; 3];
                        for &dir in layout.active_directions() {
                            delta[dir.index()] = rng.gen::<f64>();
                        }
                        let mut v = [0.0; 3];
                        for c in 0..3 {
                            let r: f64 = rng.sample(StandardNormal);
                            v[c] = bulk[c] + vth * r;
                        }
                        particles.push(Particle::new(weight, self.charge, icell, delta, v));
                    }
                }
            }
        }
    }
}
