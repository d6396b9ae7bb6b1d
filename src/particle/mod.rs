//! Macro-particles, the ion species built from them, and the fluid
//! electrons that close the hybrid model.

use crate::grid::{Direction, GridLayout, Point};

mod vec3;
mod species;
mod ions;
mod electrons;
mod loader;

pub use self::vec3::*;
pub use self::species::*;
pub use self::ions::*;
pub use self::electrons::*;
pub use self::loader::*;

/// Ion macro-particle.
///
/// The position is split into the index of the physical cell `icell`,
/// counted from zero at the first physical node, and the fractional offset
/// `delta` inside that cell, in [0, 1). Along invariant directions both
/// are zero. Right after a push, `icell` may lie outside the patch until
/// the boundary condition has dealt with the particle.
#[derive(Copy,Clone,Debug,PartialEq)]
#[allow(non_snake_case)]
pub struct Particle {
    pub weight: f64,
    pub charge: f64,
    pub icell: [i32; 3],
    pub delta: [f64; 3],
    pub v: [f64; 3],
    pub E: [f64; 3],
    pub B: [f64; 3],
}

impl Particle {
    pub fn new(weight: f64, charge: f64, icell: [i32; 3], delta: [f64; 3], v: [f64; 3]) -> Particle {
        Particle {
            weight,
            charge,
            icell,
            delta,
            v,
            E: [0.0; 3],
            B: [0.0; 3],
        }
    }

    pub fn position(&self, layout: &GridLayout) -> Point {
        let origin = layout.origin();
        let mut x = [origin.x, origin.y, origin.z];
        for &dir in layout.active_directions() {
            let d = dir.index();
            x[d] += (self.icell[d] as f64 + self.delta[d]) * layout.spacing(dir);
        }
        Point::new(x[0], x[1], x[2])
    }

    /// Whether the particle sits inside the physical cells of `layout`.
    pub fn is_inside(&self, layout: &GridLayout) -> bool {
        layout.active_directions().iter().all(|&dir| {
            let i = self.icell[dir.index()];
            i >= 0 && i < layout.nbr_cells(dir) as i32
        })
    }

    /// Advances the position by `v dt`, carrying whole cells from `delta`
    /// into `icell`.
    pub fn advance_position(&mut self, layout: &GridLayout, dt: f64) {
        for &dir in layout.active_directions() {
            let d = dir.index();
            let x = self.delta[d] + self.v[d] * dt * layout.inverse_spacing(dir);
            let shift = x.floor();
            self.icell[d] += shift as i32;
            self.delta[d] = x - shift;
            // guard against x - floor(x) rounding up to exactly 1
            if self.delta[d] >= 1.0 {
                self.icell[d] += 1;
                self.delta[d] = 0.0;
            }
        }
    }

    pub fn kinetic_energy(&self, mass: f64) -> f64 {
        let v = Vec3::from(self.v);
        0.5 * mass * self.weight * v.norm_sqr()
    }
}

/// Reduced coordinate of a particle along `dir`, in index space of a
/// quantity with the given physical start: `start + icell + delta`, less
/// half a cell for dual centering.
pub fn reduced_coordinate(particle: &Particle, dir: Direction, physical_start: usize, dual: bool) -> f64 {
    let d = dir.index();
    let x = physical_start as f64 + particle.icell[d] as f64 + particle.delta[d];
    if dual { x - 0.5 } else { x }
}
