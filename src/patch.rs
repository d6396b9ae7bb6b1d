//! A single patch: one grid with its fields, ions, electrons, solver
//! and boundary condition, advanced together.

use std::error::Error;
use log::info;

use crate::grid::GridLayout;
use crate::field::Electromag;
use crate::particle::{Electrons, Ions, Species};
use crate::boundary::BoundaryCondition;
use crate::solver::Solver;
use crate::init::InitializerFactory;
use crate::setup::InputError;

pub struct Patch {
    layout: GridLayout,
    em: Electromag,
    ions: Ions,
    electrons: Electrons,
    solver: Solver,
    bc: Box<dyn BoundaryCondition>,
    time: f64,
    step: usize,
}

impl Patch {
    /// Builds the patch, loads the particles and computes the initial
    /// ion moments.
    pub fn new(factory: &dyn InitializerFactory) -> Result<Patch, Box<dyn Error>> {
        let layout = factory.grid_layout().clone();
        if factory.interpolation_order() != layout.interp_order() {
            return Err(InputError::Inconsistent(format!(
                "interpolation order {} differs from that of the layout, {}",
                factory.interpolation_order(), layout.interp_order()
            )).into());
        }

        let bc = factory.boundary_condition()?;

        let closure = factory.electrons_initializer()?;
        let solver = Solver::new(&layout, factory.time_step(), factory.pusher(), closure.eta)?;
        let electrons = Electrons::new(&layout, closure.te);

        let mut em = Electromag::new(&layout, "");
        factory.electromag_initializer()?.initialize(&layout, &mut em);

        let mut species = Vec::new();
        for init in factory.ions_initializer()?.species {
            let mut s = Species::new(&layout, &init.name, init.mass);
            init.loader.load_particles(s.particles_mut());
            info!("loaded {} particles of '{}'", s.particles().len(), s.name());
            species.push(s);
        }

        let mut ions = Ions::new(&layout, species);
        solver.init(&mut ions, bc.as_ref());

        Ok(Patch {
            layout,
            em,
            ions,
            electrons,
            solver,
            bc,
            time: 0.0,
            step: 0,
        })
    }

    /// Advances everything by one time step.
    pub fn advance(&mut self) {
        self.solver.step(&mut self.em, &mut self.ions, &mut self.electrons, self.bc.as_ref());
        self.step += 1;
        self.time = (self.step as f64) * self.solver.dt();
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step_count(&self) -> usize {
        self.step
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn electromag(&self) -> &Electromag {
        &self.em
    }

    pub fn ions(&self) -> &Ions {
        &self.ions
    }

    pub fn electrons(&self) -> &Electrons {
        &self.electrons
    }

    pub fn field_energy(&self) -> f64 {
        self.em.energy(&self.layout)
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.ions.kinetic_energy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, HybridQuantity, Point};
    use crate::boundary::{self, BoundaryError};
    use crate::init::{ElectromagInitializer, ElectronsInitializer, IonsInitializer, SpeciesInitializer};
    use crate::particle::{FluidParticleInitializer, Profile};
    use crate::setup::Configuration;
    use crate::init::ConfigInitializer;

    fn uniform(value: f64) -> Profile {
        Box::new(move |_x| value)
    }

    /// Uniform plasma at rest in a uniform magnetic field.
    struct QuietPlasma {
        layout: GridLayout,
        pusher: String,
    }

    impl QuietPlasma {
        fn new(order: u32) -> QuietPlasma {
            QuietPlasma {
                layout: GridLayout::new(1, "yee", [0.2, 0.0, 0.0], [32, 0, 0], Point::new(0.0, 0.0, 0.0), order).unwrap(),
                pusher: "modified_boris".to_owned(),
            }
        }
    }

    impl InitializerFactory for QuietPlasma {
        fn grid_layout(&self) -> &GridLayout {
            &self.layout
        }

        fn time_step(&self) -> f64 {
            0.01
        }

        fn pusher(&self) -> &str {
            &self.pusher
        }

        fn interpolation_order(&self) -> u32 {
            self.layout.interp_order()
        }

        fn ions_initializer(&self) -> Result<IonsInitializer, InputError> {
            let loader = FluidParticleInitializer::new(&self.layout, uniform(1.0), [uniform(0.0), uniform(0.0), uniform(0.0)], uniform(0.0), 1.0, 10, 1);
            Ok(IonsInitializer {
                species: vec![SpeciesInitializer { name: "protons".to_owned(), mass: 1.0, loader: Box::new(loader) }],
            })
        }

        fn electromag_initializer(&self) -> Result<ElectromagInitializer, InputError> {
            Ok(ElectromagInitializer {
                e: [uniform(0.0), uniform(0.0), uniform(0.0)],
                b: [uniform(1.0), uniform(0.0), uniform(0.0)],
            })
        }

        fn electrons_initializer(&self) -> Result<ElectronsInitializer, InputError> {
            Ok(ElectronsInitializer { te: 0.0, eta: 0.0 })
        }

        fn boundary_condition(&self) -> Result<Box<dyn BoundaryCondition>, BoundaryError> {
            boundary::boundary_condition("periodic", &self.layout)
        }
    }

    #[test]
    fn quiet_plasma_stays_quiet() {
        let mut patch = Patch::new(&QuietPlasma::new(1)).unwrap();
        let n = patch.ions().nbr_particles();
        assert_eq!(n, 320);
        let w0 = patch.field_energy();

        for _ in 0..20 {
            patch.advance();
        }

        println!("field energy {:e} -> {:e}, kinetic {:e}", w0, patch.field_energy(), patch.kinetic_energy());
        assert_eq!(patch.step_count(), 20);
        assert!((patch.time() - 0.2).abs() < 1.0e-12);
        assert_eq!(patch.ions().nbr_particles(), n);
        assert!(patch.kinetic_energy() < 1.0e-20);
        assert!((patch.field_energy() - w0).abs() < 1.0e-10 * w0);

        // the last physical node is the periodic image of the first
        let protons = patch.ions().species_by_name("protons").unwrap();
        let layout = patch.layout();
        let start = layout.physical_start_index_of(HybridQuantity::Rho, Direction::X);
        let end = layout.physical_end_index_of(HybridQuantity::Rho, Direction::X);
        let charge: f64 = (start..end).map(|i| protons.rho()[i]).sum();
        assert!((charge - 32.0).abs() < 1.0e-9);
        assert_eq!(protons.rho()[start], protons.rho()[end]);
    }

    #[test]
    fn rejects_unknown_pusher() {
        let mut plasma = QuietPlasma::new(2);
        plasma.pusher = "leapfrog".to_owned();
        assert!(Patch::new(&plasma).is_err());
    }

    #[test]
    fn runs_from_input_file() {
        let text = "
control:
  dimension: 1
  nx: 20
  dx: 0.5
  dt: 0.005
  steps: 4
  interpolation_order: 3

fields:
  Bx: 1.0
  By: 0.01 * sin(2 * pi * x / 10)

electrons:
  Te: 0.05

ions:
  species: protons

protons:
  mass: 1.0
  npc: 16
  density: 1.0
  vth: 0.2
  seed: 11
";
        let mut config = Configuration::from_str(text).unwrap();
        config.with_context("constants");
        let init = ConfigInitializer::new(&config).unwrap();
        let mut patch = Patch::new(&init).unwrap();
        let k0 = patch.kinetic_energy();
        for _ in 0..init.steps() {
            patch.advance();
        }
        let k1 = patch.kinetic_energy();
        println!("kinetic energy {} -> {}", k0, k1);
        assert_eq!(patch.ions().nbr_particles(), 20 * 16);
        assert!(k1.is_finite() && patch.field_energy().is_finite());
        assert!((k1 - k0).abs() < 0.05 * k0);
    }
}
