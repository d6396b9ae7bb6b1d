//! Particle-mesh coupling: sampling fields at particle positions and
//! depositing particle moments back onto the mesh.

use std::ops::Range;
use ndarray::prelude::*;
use rayon::prelude::*;

use crate::grid::{GridLayout, HybridQuantity, QtyCentering};
use crate::field::{Field, VecField};
use crate::particle::{Particle, reduced_coordinate};

mod indexes;
pub use self::indexes::*;

/// Stencils along x, y and z for one quantity.
type Stencil3 = [(Range<isize>, Weights); 3];

#[derive(Copy,Clone,Debug)]
pub struct Interpolator {
    shape: IndexesAndWeights,
}

impl Interpolator {
    pub fn new(order: u32) -> Interpolator {
        Interpolator {
            shape: IndexesAndWeights::new(order),
        }
    }

    pub fn order(&self) -> u32 {
        self.shape.order()
    }

    // Invariant directions get the single node 0 with unit weight.
    fn stencil(&self, layout: &GridLayout, qty: HybridQuantity, particle: &Particle) -> Stencil3 {
        let mut stencil = [(0..1, Weights::unit()), (0..1, Weights::unit()), (0..1, Weights::unit())];
        for &dir in layout.active_directions() {
            let centering = layout.field_centering(qty, dir);
            let start = layout.physical_start_index(centering, dir);
            let x = reduced_coordinate(particle, dir, start, centering == QtyCentering::Dual);
            stencil[dir.index()] = self.shape.stencil(x);
        }
        stencil
    }

    /// Value of `field` at the particle position.
    pub fn field_at(&self, layout: &GridLayout, field: &Field, particle: &Particle) -> f64 {
        assert_eq!(field.shape(), layout.alloc_size(field.quantity()), "{} does not match the layout", field.name());
        let [(ix, wx), (iy, wy), (iz, wz)] = self.stencil(layout, field.quantity(), particle);
        let data = field.data();
        let mut value = 0.0;
        for (i, a) in ix.zip(wx.iter()) {
            for (j, b) in iy.clone().zip(wy.iter()) {
                for (k, c) in iz.clone().zip(wz.iter()) {
                    value += a * b * c * data[[i as usize, j as usize, k as usize]];
                }
            }
        }
        value
    }

    /// Returns a tuple of (E, B) sampled at the particle.
    #[allow(non_snake_case)]
    pub fn fields_at(&self, layout: &GridLayout, E: &VecField, B: &VecField, particle: &Particle) -> ([f64; 3], [f64; 3]) {
        let mut e = [0.0; 3];
        let mut b = [0.0; 3];
        for c in 0..3 {
            e[c] = self.field_at(layout, E.component(c), particle);
            b[c] = self.field_at(layout, B.component(c), particle);
        }
        (e, b)
    }

    // Adds `value` times the shape function at the particle to `target`.
    fn scatter(&self, layout: &GridLayout, qty: HybridQuantity, particle: &Particle, value: f64, target: &mut Array3<f64>) {
        let [(ix, wx), (iy, wy), (iz, wz)] = self.stencil(layout, qty, particle);
        for (i, a) in ix.zip(wx.iter()) {
            for (j, b) in iy.clone().zip(wy.iter()) {
                for (k, c) in iz.clone().zip(wz.iter()) {
                    target[[i as usize, j as usize, k as usize]] += value * a * b * c;
                }
            }
        }
    }

    /// Adds the charge density and flux of `particles` to `rho` and `flux`:
    /// ```text
    ///   rho  += w q S(x - x_p)
    ///   flux += w q v S(x - x_p)
    /// ```
    /// Particles are split into one chunk per thread, each accumulating
    /// into its own arrays, and the partial moments are summed.
    pub fn deposit(&self, layout: &GridLayout, particles: &[Particle], rho: &mut Field, flux: &mut VecField) {
        assert_eq!(rho.shape(), layout.alloc_size(rho.quantity()), "{} does not match the layout", rho.name());
        for f in flux.components().iter() {
            assert_eq!(f.shape(), layout.alloc_size(f.quantity()), "{} does not match the layout", f.name());
        }

        if particles.is_empty() {
            return;
        }

        let rho_shape = rho.shape();
        let flux_shape = [flux.component(0).shape(), flux.component(1).shape(), flux.component(2).shape()];
        let rho_qty = rho.quantity();
        let flux_qty = flux.quantities();

        // divide particles into nthread chunks
        let nthreads = rayon::current_num_threads();
        // chunk length cannot be zero
        let chunk_len = if particles.len() > nthreads {
            particles.len() / nthreads
        } else {
            particles.len() // which is > 0
        };

        let mut partials: Vec<[Array3<f64>; 4]> = Vec::new();
        particles.par_chunks(chunk_len)
            .map(|chunk: &[Particle]| -> [Array3<f64>; 4] {
                let to_dim = |s: [usize; 3]| (s[0], s[1], s[2]);
                let mut n = Array3::<f64>::zeros(to_dim(rho_shape));
                let mut fx = Array3::<f64>::zeros(to_dim(flux_shape[0]));
                let mut fy = Array3::<f64>::zeros(to_dim(flux_shape[1]));
                let mut fz = Array3::<f64>::zeros(to_dim(flux_shape[2]));
                for p in chunk {
                    let macrocharge = p.weight * p.charge;
                    self.scatter(layout, rho_qty, p, macrocharge, &mut n);
                    self.scatter(layout, flux_qty[0], p, macrocharge * p.v[0], &mut fx);
                    self.scatter(layout, flux_qty[1], p, macrocharge * p.v[1], &mut fy);
                    self.scatter(layout, flux_qty[2], p, macrocharge * p.v[2], &mut fz);
                }
                [n, fx, fy, fz]
            })
            .collect_into_vec(&mut partials);

        for [n, fx, fy, fz] in partials.iter() {
            *rho.data_mut() += n;
            *flux.component_mut(VecField::X).data_mut() += fx;
            *flux.component_mut(VecField::Y).data_mut() += fy;
            *flux.component_mut(VecField::Z).data_mut() += fz;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256StarStar;
    use crate::grid::{Direction, Point};

    fn reduced_x(layout: &GridLayout, qty: HybridQuantity, particle: &Particle) -> f64 {
        let centering = layout.field_centering(qty, Direction::X);
        let start = layout.physical_start_index(centering, Direction::X);
        reduced_coordinate(particle, Direction::X, start, centering == QtyCentering::Dual)
    }

    fn random_particles(layout: &GridLayout, count: usize, seed: u64) -> Vec<Particle> {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let n = layout.nbr_cells(Direction::X) as i32;
        (0..count)
            .map(|_| {
                let icell = [rng.gen_range(0, n), 0, 0];
                let delta = [rng.gen::<f64>(), 0.0, 0.0];
                let v = [rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5];
                Particle::new(rng.gen::<f64>(), 1.0 + rng.gen::<f64>(), icell, delta, v)
            })
            .collect()
    }

    #[test]
    fn charge_conservation() {
        for order in 1..=4 {
            let layout = GridLayout::new(1, "yee", [0.1, 0.0, 0.0], [64, 0, 0], Point::new(0.0, 0.0, 0.0), order).unwrap();
            let particles = random_particles(&layout, 10_000, order as u64);
            let interpolator = Interpolator::new(order);
            let mut rho = Field::new(&layout, HybridQuantity::Rho, "rho");
            let mut flux = VecField::new(&layout, HybridQuantity::V, "flux");
            interpolator.deposit(&layout, &particles, &mut rho, &mut flux);

            let expected: f64 = particles.iter().map(|p| p.weight * p.charge).sum();
            let deposited: f64 = rho.data().sum();
            println!("order {}: expected {:.12e}, deposited {:.12e}", order, expected, deposited);
            assert!((deposited - expected).abs() < 1.0e-10 * expected);

            let expected_jy: f64 = particles.iter().map(|p| p.weight * p.charge * p.v[1]).sum();
            assert!((flux.component(VecField::Y).data().sum() - expected_jy).abs() < 1.0e-9);
        }
    }

    #[test]
    fn uniform_field_is_sampled_exactly() {
        for order in 1..=4 {
            let layout = GridLayout::new(1, "yee", [0.1, 0.0, 0.0], [32, 0, 0], Point::new(0.0, 0.0, 0.0), order).unwrap();
            let interpolator = Interpolator::new(order);
            let mut em = crate::field::Electromag::new(&layout, "");
            em.e.component_mut(VecField::X).fill(1.5);
            em.b.component_mut(VecField::Z).fill(-2.0);
            for p in random_particles(&layout, 200, 10 + order as u64).iter() {
                let (e, b) = interpolator.fields_at(&layout, &em.e, &em.b, p);
                assert!((e[0] - 1.5).abs() < 1.0e-12);
                assert_eq!(e[1], 0.0);
                assert!((b[2] + 2.0).abs() < 1.0e-12);
            }
        }
    }

    #[test]
    #[should_panic]
    fn sampling_needs_matching_layout() {
        let coarse = GridLayout::new(1, "yee", [0.1, 0.0, 0.0], [20, 0, 0], Point::new(0.0, 0.0, 0.0), 1).unwrap();
        let fine = GridLayout::new(1, "yee", [0.05, 0.0, 0.0], [40, 0, 0], Point::new(0.0, 0.0, 0.0), 1).unwrap();
        let mut ex = Field::new(&fine, HybridQuantity::Ex, "Ex");
        ex.fill(6.0);
        let p = Particle::new(1.0, 1.0, [3, 0, 0], [0.5, 0.0, 0.0], [0.0; 3]);
        Interpolator::new(1).field_at(&coarse, &ex, &p);
    }

    #[test]
    #[should_panic]
    fn deposit_needs_matching_layout() {
        let coarse = GridLayout::new(1, "yee", [0.1, 0.0, 0.0], [20, 0, 0], Point::new(0.0, 0.0, 0.0), 1).unwrap();
        let fine = GridLayout::new(1, "yee", [0.05, 0.0, 0.0], [40, 0, 0], Point::new(0.0, 0.0, 0.0), 1).unwrap();
        let mut rho = Field::new(&fine, HybridQuantity::Rho, "rho");
        let mut flux = VecField::new(&fine, HybridQuantity::V, "flux");
        let particles = vec![Particle::new(1.0, 1.0, [3, 0, 0], [0.5, 0.0, 0.0], [0.0; 3])];
        Interpolator::new(1).deposit(&coarse, &particles, &mut rho, &mut flux);
    }

    #[test]
    fn stencils_stay_inside_ghosts() {
        for order in 1..=4 {
            let layout = GridLayout::new(1, "yee", [0.1, 0.0, 0.0], [16, 0, 0], Point::new(0.0, 0.0, 0.0), order).unwrap();
            let shape = IndexesAndWeights::new(order);
            let edges = [
                Particle::new(1.0, 1.0, [0, 0, 0], [0.0, 0.0, 0.0], [0.0; 3]),
                Particle::new(1.0, 1.0, [15, 0, 0], [0.999_999, 0.0, 0.0], [0.0; 3]),
            ];
            for qty in [HybridQuantity::Ex, HybridQuantity::Ey].iter() {
                let ghost_end = layout.ghost_end_index_of(*qty, Direction::X) as isize;
                for p in edges.iter() {
                    let indexes = shape.compute_indexes(reduced_x(&layout, *qty, p));
                    assert!(indexes.start >= 0, "order {}, {:?}: {:?}", order, qty, indexes);
                    assert!(indexes.end - 1 <= ghost_end, "order {}, {:?}: {:?}", order, qty, indexes);
                }
            }
        }
    }
}
