//! Predictor-corrector advance of the hybrid system by one time step.

use std::fmt;
use std::error::Error;
use log::{debug, info, trace};

use crate::grid::{GridLayout, HybridQuantity, LayoutError};
use crate::field::{Electromag, VecField, time_average};
use crate::interpolator::Interpolator;
use crate::pusher::{Pusher, PusherError};
use crate::boundary::{BoundaryCondition, BoundaryError};
use crate::particle::{Electrons, Ions, Particle};

mod faraday;
mod ampere;
mod ohm;

pub use self::faraday::*;
pub use self::ampere::*;
pub use self::ohm::*;

pub enum SolverError {
    Layout(LayoutError),
    Pusher(PusherError),
    Boundary(BoundaryError),
    UnsupportedDimension(usize),
}

impl fmt::Debug for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use SolverError::*;
        match self {
            Layout(e) => write!(f, "{:?}", e),
            Pusher(e) => write!(f, "{:?}", e),
            Boundary(e) => write!(f, "{:?}", e),
            UnsupportedDimension(d) => write!(f, "field solver is only available in 1D, not {}D", d),
        }
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for SolverError {}

impl From<LayoutError> for SolverError {
    fn from(e: LayoutError) -> Self {
        SolverError::Layout(e)
    }
}

impl From<PusherError> for SolverError {
    fn from(e: PusherError) -> Self {
        SolverError::Pusher(e)
    }
}

impl From<BoundaryError> for SolverError {
    fn from(e: BoundaryError) -> Self {
        SolverError::Boundary(e)
    }
}

#[derive(Copy,Clone,Debug,PartialEq,Eq)]
enum Phase {
    Predictor1,
    Predictor2,
}

/// Fields and particles that only live for the duration of one step.
struct StepBuffers {
    predicted: Electromag,
    average: Electromag,
    particles: Vec<Particle>,
}

impl StepBuffers {
    fn new(layout: &GridLayout) -> StepBuffers {
        StepBuffers {
            predicted: Electromag::new(layout, "_pred"),
            average: Electromag::new(layout, "_avg"),
            particles: Vec::new(),
        }
    }
}

/// Advances fields and ions with the two-predictor, one-corrector scheme.
///
/// 1. Predictor 1: B and E are extrapolated from time n, averaged with
///    their time-n values, and a copy of the particles is pushed in the
///    averaged fields. The moments of the copy replace those of time n.
/// 2. Predictor 2: the same, with Faraday driven by the averaged E of
///    predictor 1; the particles themselves are pushed this time.
/// 3. Corrector: Faraday, again driven by the latest averaged E, and Ohm
///    overwrite B and E, which become the fields at time n + 1.
pub struct Solver {
    layout: GridLayout,
    dt: f64,
    interpolator: Interpolator,
    pusher: Pusher,
    faraday: Faraday,
    ampere: Ampere,
    ohm: Ohm,
    j: VecField,
}

impl Solver {
    pub fn new(layout: &GridLayout, dt: f64, pusher: &str, eta: f64) -> Result<Solver, SolverError> {
        if layout.dimension() != 1 {
            return Err(SolverError::UnsupportedDimension(layout.dimension()));
        }

        let pusher = Pusher::new(layout, pusher, dt)?;
        info!("solver ready: {} pusher, interpolation order {}, dt = {:.3e}", pusher.pusher_type(), layout.interp_order(), dt);

        Ok(Solver {
            layout: layout.clone(),
            dt,
            interpolator: Interpolator::new(layout.interp_order()),
            pusher,
            faraday: Faraday::new(layout),
            ampere: Ampere::new(layout),
            ohm: Ohm::new(layout, eta),
            j: VecField::new(layout, HybridQuantity::J, "J"),
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn pusher_type(&self) -> &'static str {
        self.pusher.pusher_type()
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.interpolator
    }

    /// Total current from the last evaluation of Ampère's law.
    pub fn current(&self) -> &VecField {
        &self.j
    }

    /// Deposits the initial moments of every species and completes the
    /// ion density and bulk velocity.
    pub fn init(&self, ions: &mut Ions, bc: &dyn BoundaryCondition) {
        ions.compute_species_moments(&self.interpolator, &self.layout);
        Self::finish_moments(ions, bc);
    }

    pub fn step(&mut self, em: &mut Electromag, ions: &mut Ions, electrons: &mut Electrons, bc: &dyn BoundaryCondition) {
        let mut buffers = StepBuffers::new(&self.layout);
        debug!("step with {} particles", ions.nbr_particles());

        trace!("predictor 1");
        self.predictor1(em, ions, electrons, bc, &mut buffers);
        trace!("predictor 2");
        self.predictor2(em, ions, electrons, bc, &mut buffers);
        trace!("corrector");
        self.corrector(em, ions, electrons, bc, &buffers);
    }

    fn predictor1(&mut self, em: &Electromag, ions: &mut Ions, electrons: &mut Electrons, bc: &dyn BoundaryCondition, buf: &mut StepBuffers) {
        self.faraday.advance(&em.e, &em.b, &mut buf.predicted.b, self.dt);
        bc.apply_magnetic_bc(&mut buf.predicted.b);
        self.electric_field(&buf.predicted.b, ions, electrons, bc, &mut buf.predicted.e);

        time_average(&em.e, &buf.predicted.e, &mut buf.average.e);
        time_average(&em.b, &buf.predicted.b, &mut buf.average.b);

        self.move_ions(&buf.average, ions, bc, Phase::Predictor1, &mut buf.particles);
    }

    fn predictor2(&mut self, em: &Electromag, ions: &mut Ions, electrons: &mut Electrons, bc: &dyn BoundaryCondition, buf: &mut StepBuffers) {
        self.faraday.advance(&buf.average.e, &em.b, &mut buf.predicted.b, self.dt);
        bc.apply_magnetic_bc(&mut buf.predicted.b);
        self.electric_field(&buf.predicted.b, ions, electrons, bc, &mut buf.predicted.e);

        time_average(&em.e, &buf.predicted.e, &mut buf.average.e);
        time_average(&em.b, &buf.predicted.b, &mut buf.average.b);

        self.move_ions(&buf.average, ions, bc, Phase::Predictor2, &mut buf.particles);
    }

    fn corrector(&mut self, em: &mut Electromag, ions: &Ions, electrons: &mut Electrons, bc: &dyn BoundaryCondition, buf: &StepBuffers) {
        self.faraday.advance_in_place(&buf.average.e, &mut em.b, self.dt);
        bc.apply_magnetic_bc(&mut em.b);
        self.electric_field(&em.b, ions, electrons, bc, &mut em.e);
    }

    // Ampère, electron closure and Ohm, each followed by its boundary condition.
    fn electric_field(&mut self, b: &VecField, ions: &Ions, electrons: &mut Electrons, bc: &dyn BoundaryCondition, e: &mut VecField) {
        self.ampere.compute(b, &mut self.j);
        bc.apply_current_bc(&mut self.j);
        electrons.update(ions, &self.j);
        self.ohm.compute(b, ions.rho(), electrons.velocity(), electrons.pressure(), &self.j, e);
        bc.apply_electric_bc(e);
    }

    fn move_ions(&self, fields: &Electromag, ions: &mut Ions, bc: &dyn BoundaryCondition, phase: Phase, buffer: &mut Vec<Particle>) {
        let pusher_type = self.pusher.pusher_type();

        for species in ions.species_mut() {
            let mass = species.mass();
            let name = species.name().to_owned();
            match phase {
                Phase::Predictor1 => {
                    // time-n particles stay untouched
                    self.pusher.move_particles(species.particles(), buffer, mass, &fields.e, &fields.b, &self.interpolator, bc);
                    bc.apply_incoming_particle_bc(buffer, pusher_type, self.dt, &name, false);
                    species.compute_moments_from(&self.interpolator, &self.layout, buffer);
                },
                Phase::Predictor2 => {
                    self.pusher.move_in_place(species.particles_mut(), mass, &fields.e, &fields.b, &self.interpolator, bc);
                    bc.apply_incoming_particle_bc(species.particles_mut(), pusher_type, self.dt, &name, true);
                    species.compute_moments(&self.interpolator, &self.layout);
                },
            }
        }

        Self::finish_moments(ions, bc);
    }

    // Ghost regions of the moments must be consistent before the bulk
    // velocity, and later Ohm's law, read them.
    fn finish_moments(ions: &mut Ions, bc: &dyn BoundaryCondition) {
        ions.compute_charge_density();
        bc.apply_density_bc(ions.rho_mut());
        bc.apply_flux_bc(ions);
        ions.compute_bulk_velocity();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, Point};
    use crate::boundary::PeriodicBoundary;
    use crate::particle::{FluidParticleInitializer, ParticleInitializer, Profile, Species, Vec3};

    #[test]
    fn rejects_multidimensional_layouts() {
        let layout = GridLayout::new(2, "yee", [0.1, 0.1, 0.0], [10, 10, 0], Point::new(0.0, 0.0, 0.0), 1).unwrap();
        assert!(matches!(Solver::new(&layout, 0.01, "modified_boris", 0.0), Err(SolverError::UnsupportedDimension(2))));
    }

    #[test]
    fn rejects_unknown_pusher() {
        let layout = GridLayout::new(1, "yee", [0.1, 0.0, 0.0], [10, 0, 0], Point::new(0.0, 0.0, 0.0), 1).unwrap();
        assert!(matches!(Solver::new(&layout, 0.01, "leapfrog", 0.0), Err(SolverError::Pusher(_))));
    }

    #[test]
    fn particle_at_rest_stays_at_rest() {
        let layout = GridLayout::new(1, "yee", [0.1, 0.0, 0.0], [100, 0, 0], Point::new(0.0, 0.0, 0.0), 1).unwrap();
        let bc = PeriodicBoundary::new(&layout);

        let mut em = Electromag::new(&layout, "");
        em.b.component_mut(VecField::Z).fill(1.0);

        let mut protons = Species::new(&layout, "protons", 1.0);
        protons.particles_mut().push(Particle::new(1.0, 1.0, [50, 0, 0], [0.0; 3], [0.0; 3]));
        let mut ions = Ions::new(&layout, vec![protons]);
        let mut electrons = Electrons::new(&layout, 0.0);

        let mut solver = Solver::new(&layout, 0.01, "modified_boris", 0.0).unwrap();
        solver.init(&mut ions, &bc);
        solver.step(&mut em, &mut ions, &mut electrons, &bc);

        let p = ions.species()[0].particles()[0];
        println!("particle after one step: {:?}", p);
        assert_eq!(p.icell, [50, 0, 0]);
        assert!(p.delta[0].abs() < 1.0e-14);
        assert!(Vec3::from(p.v).norm_sqr().sqrt() < 1.0e-14);

        let start = layout.physical_start_index_of(HybridQuantity::Rho, Direction::X);
        assert!((ions.rho()[start + 50] - 1.0).abs() < 1.0e-12);
        let total: f64 = (start..start + 100).map(|i| ions.rho()[i]).sum();
        assert!((total - 1.0).abs() < 1.0e-12);

        assert!(em.e.components().iter().all(|f| f.data().iter().all(|v| v.abs() < 1.0e-14)));
        assert!(em.b.component(VecField::Z).data().iter().all(|v| (*v - 1.0).abs() < 1.0e-14));
    }

    #[test]
    fn resistive_diffusion_follows_predictor_corrector() {
        // Without ions Ohm's law reduces to E = eta J, and a Fourier mode
        // of By is damped by 1 - g/2 + g^2/4 per step, g = eta dt kappa^2,
        // when both predictor 2 and the corrector use the averaged E.
        let (nx, dx, dt) = (32, 0.1, 0.01);
        let layout = GridLayout::new(1, "yee", [dx, 0.0, 0.0], [nx, 0, 0], Point::new(0.0, 0.0, 0.0), 1).unwrap();
        let bc = PeriodicBoundary::new(&layout);

        let k = 2.0 * std::f64::consts::PI / (nx as f64 * dx);
        let kappa = (2.0 / dx) * (0.5 * k * dx).sin();
        let g = 0.5;
        let eta = g / (dt * kappa * kappa);

        let mut em = Electromag::new(&layout, "");
        let by = em.b.component_mut(VecField::Y);
        for i in 0..by.shape()[0] {
            by[i] = (k * layout.field_node_coordinates(HybridQuantity::By, [i, 0, 0]).x).cos();
        }

        let mut ions = Ions::new(&layout, vec![Species::new(&layout, "protons", 1.0)]);
        let mut electrons = Electrons::new(&layout, 0.0);
        let mut solver = Solver::new(&layout, dt, "modified_boris", eta).unwrap();
        solver.init(&mut ions, &bc);
        solver.step(&mut em, &mut ions, &mut electrons, &bc);

        let damping = 1.0 - 0.5 * g + 0.25 * g * g;
        let by = em.b.component(VecField::Y);
        let start = layout.physical_start_index_of(HybridQuantity::By, Direction::X);
        let end = layout.physical_end_index_of(HybridQuantity::By, Direction::X);
        for i in start..=end {
            let x = layout.field_node_coordinates(HybridQuantity::By, [i, 0, 0]).x;
            assert!((by[i] - damping * (k * x).cos()).abs() < 1.0e-12, "By[{}] = {}", i, by[i]);
        }

        // E at n + 1 comes from the corrected B
        let ez = em.e.component(VecField::Z);
        let start = layout.physical_start_index_of(HybridQuantity::Ez, Direction::X);
        let end = layout.physical_end_index_of(HybridQuantity::Ez, Direction::X);
        for i in start..=end {
            let x = layout.field_node_coordinates(HybridQuantity::Ez, [i, 0, 0]).x;
            let expected = -eta * damping * kappa * (k * x).sin();
            assert!((ez[i] - expected).abs() < 1.0e-9, "Ez[{}] = {}, expected {}", i, ez[i], expected);
        }
        assert!(em.b.component(VecField::Z).data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn drift_equilibrium_is_preserved() {
        // cold plasma drifting along y in Bz, with the motional field
        // E = -V x B already in place: ions feel no net force
        let layout = GridLayout::new(1, "yee", [0.1, 0.0, 0.0], [40, 0, 0], Point::new(0.0, 0.0, 0.0), 2).unwrap();
        let bc = PeriodicBoundary::new(&layout);

        let mut em = Electromag::new(&layout, "");
        em.b.component_mut(VecField::Z).fill(1.0);
        em.e.component_mut(VecField::X).fill(-0.5);

        let constant = |value: f64| -> Profile { Box::new(move |_| value) };
        let loader = FluidParticleInitializer::new(&layout, constant(1.0), [constant(0.0), constant(0.5), constant(0.0)], constant(0.0), 1.0, 20, 3);
        let mut protons = Species::new(&layout, "protons", 1.0);
        loader.load_particles(protons.particles_mut());
        let mut ions = Ions::new(&layout, vec![protons]);
        let mut electrons = Electrons::new(&layout, 0.0);

        let mut solver = Solver::new(&layout, 0.01, "modifiedBoris", 0.0).unwrap();
        solver.init(&mut ions, &bc);
        for _ in 0..10 {
            solver.step(&mut em, &mut ions, &mut electrons, &bc);
        }

        for p in ions.species()[0].particles() {
            assert!(p.v[0].abs() < 1.0e-10);
            assert!((p.v[1] - 0.5).abs() < 1.0e-10);
            assert!(p.v[2].abs() < 1.0e-10);
        }
        let ex = em.e.component(VecField::X);
        let start = layout.physical_start_index_of(HybridQuantity::Ex, Direction::X);
        let end = layout.physical_end_index_of(HybridQuantity::Ex, Direction::X);
        for i in start..=end {
            assert!((ex[i] + 0.5).abs() < 1.0e-10, "Ex[{}] = {}", i, ex[i]);
        }
    }
}
