//! Everything needed to set up a patch, either read from an input file
//! or supplied directly.

use std::error::Error;
use log::debug;

use crate::grid::{Direction, GridLayout, Point};
use crate::field::{Electromag, VecField};
use crate::particle::{FluidParticleInitializer, ParticleInitializer, Profile};
use crate::boundary::{self, BoundaryCondition, BoundaryError};
use crate::setup::{Configuration, InputError};

/// Initial state of one ion species.
pub struct SpeciesInitializer {
    pub name: String,
    pub mass: f64,
    pub loader: Box<dyn ParticleInitializer>,
}

pub struct IonsInitializer {
    pub species: Vec<SpeciesInitializer>,
}

/// Initial electric and magnetic fields, as functions of x.
pub struct ElectromagInitializer {
    pub e: [Profile; 3],
    pub b: [Profile; 3],
}

impl ElectromagInitializer {
    /// Evaluates the profiles at every node of every component,
    /// ghost nodes included.
    pub fn initialize(&self, layout: &GridLayout, em: &mut Electromag) {
        Self::fill(layout, &self.e, &mut em.e);
        Self::fill(layout, &self.b, &mut em.b);
    }

    fn fill(layout: &GridLayout, profiles: &[Profile; 3], v: &mut VecField) {
        for (f, profile) in v.components_mut().iter_mut().zip(profiles.iter()) {
            let qty = f.quantity();
            for ((i, j, k), value) in f.data_mut().indexed_iter_mut() {
                *value = profile(layout.field_node_coordinates(qty, [i, j, k]).x);
            }
        }
    }
}

#[derive(Copy,Clone,Debug,PartialEq)]
pub struct ElectronsInitializer {
    pub te: f64,
    pub eta: f64,
}

/// Supplies the pieces a `Patch` is assembled from.
pub trait InitializerFactory {
    fn grid_layout(&self) -> &GridLayout;
    fn time_step(&self) -> f64;
    fn pusher(&self) -> &str;
    fn interpolation_order(&self) -> u32;
    fn ions_initializer(&self) -> Result<IonsInitializer, InputError>;
    fn electromag_initializer(&self) -> Result<ElectromagInitializer, InputError>;
    fn electrons_initializer(&self) -> Result<ElectronsInitializer, InputError>;
    fn boundary_condition(&self) -> Result<Box<dyn BoundaryCondition>, BoundaryError>;
}

/// Reads a patch description from an input file.
///
/// ```yaml
/// control:
///   dimension: 1
///   nx: 100
///   dx: 0.2
///   dt: 0.005
///   steps: 2000
///   n_outputs: 20
///   interpolation_order: 1
///   pusher: modified_boris
///   boundary: periodic
///
/// fields:
///   Bx: 1.0
///   Ey: 0.0
///
/// electrons:
///   Te: 0.1
///   eta: 0.0
///
/// ions:
///   species: [protons]
///
/// protons:
///   mass: 1.0
///   charge: 1.0
///   npc: 100
///   density: 1.0 + 0.1 * cos(2 * pi * x / 20)
///   vth: 0.3
/// ```
/// Field components and bulk velocities that are left out are zero.
pub struct ConfigInitializer<'a> {
    config: &'a Configuration,
    layout: GridLayout,
    dt: f64,
    pusher: String,
    boundary: String,
    steps: usize,
    n_outputs: usize,
}

impl<'a> ConfigInitializer<'a> {
    pub fn new(config: &'a Configuration) -> Result<ConfigInitializer<'a>, Box<dyn Error>> {
        let dims = config.integer("control", "dimension")?;
        if dims < 1 || dims > 3 {
            return Err(InputError::Inconsistent(format!("dimension must be 1, 2 or 3, not {}", dims)).into());
        }
        let dims = dims as usize;

        let mut spacing = [0.0; 3];
        let mut nbr_cells = [0u32; 3];
        let mut origin = [0.0; 3];
        for dir in Direction::ALL.iter().take(dims) {
            let d = dir.index();
            let axis = ["x", "y", "z"][d];
            let n = config.integer("control", &format!("n{}", axis))?;
            if n < 0 {
                return Err(InputError::Inconsistent(format!("n{} = {} is negative", axis, n)).into());
            }
            nbr_cells[d] = n as u32;
            spacing[d] = config.real("control", &format!("d{}", axis))?;
            origin[d] = config.real_or("control", &format!("{}0", axis), 0.0)?;
        }

        let order = config.integer_or("control", "interpolation_order", 1)?;
        if order < 1 {
            return Err(InputError::Inconsistent(format!("interpolation order {} is not positive", order)).into());
        }

        let layout_name = config.string_or("control", "layout", "yee")?;
        let layout = GridLayout::new(
            dims,
            &layout_name,
            spacing,
            nbr_cells,
            Point::new(origin[0], origin[1], origin[2]),
            order as u32,
        )?;

        let dt = config.real("control", "dt")?;
        if !(dt > 0.0) {
            return Err(InputError::Inconsistent(format!("time step {} is not positive", dt)).into());
        }

        let steps = config.integer("control", "steps")?;
        let n_outputs = config.integer_or("control", "n_outputs", 1)?;
        if steps < 0 || n_outputs < 1 {
            return Err(InputError::Inconsistent("steps must be >= 0 and n_outputs >= 1".to_owned()).into());
        }

        Ok(ConfigInitializer {
            config,
            layout,
            dt,
            pusher: config.string_or("control", "pusher", "modified_boris")?,
            boundary: config.string_or("control", "boundary", "periodic")?,
            steps: steps as usize,
            n_outputs: n_outputs as usize,
        })
    }

    /// Total number of time steps to run.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of progress reports spread over the run.
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    fn species(&self, name: &str) -> Result<SpeciesInitializer, InputError> {
        let config = self.config;
        let mass = config.real(name, "mass")?;
        if !(mass > 0.0) {
            return Err(InputError::Inconsistent(format!("mass of '{}' must be positive", name)));
        }
        let charge = config.real_or(name, "charge", 1.0)?;
        let npc = config.integer(name, "npc")?;
        if npc < 0 {
            return Err(InputError::Inconsistent(format!("npc of '{}' is negative", name)));
        }
        let seed = config.integer_or(name, "seed", 0)?;

        let loader = FluidParticleInitializer::new(
            &self.layout,
            config.func(name, "density", "x")?,
            [
                config.func_or(name, "vx", "x", 0.0)?,
                config.func_or(name, "vy", "x", 0.0)?,
                config.func_or(name, "vz", "x", 0.0)?,
            ],
            config.func_or(name, "vth", "x", 0.0)?,
            charge,
            npc as usize,
            seed as u64,
        );

        debug!("species '{}': mass {}, charge {}, {} per cell", name, mass, charge, npc);

        Ok(SpeciesInitializer {
            name: name.to_owned(),
            mass,
            loader: Box::new(loader),
        })
    }
}

impl<'a> InitializerFactory for ConfigInitializer<'a> {
    fn grid_layout(&self) -> &GridLayout {
        &self.layout
    }

    fn time_step(&self) -> f64 {
        self.dt
    }

    fn pusher(&self) -> &str {
        &self.pusher
    }

    fn interpolation_order(&self) -> u32 {
        self.layout.interp_order()
    }

    fn ions_initializer(&self) -> Result<IonsInitializer, InputError> {
        let names = self.config.strings("ions", "species")?;
        let species = names.iter()
            .map(|name| self.species(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IonsInitializer { species })
    }

    fn electromag_initializer(&self) -> Result<ElectromagInitializer, InputError> {
        let config = self.config;
        let field = |name: &str| config.func_or("fields", name, "x", 0.0);
        Ok(ElectromagInitializer {
            e: [field("Ex")?, field("Ey")?, field("Ez")?],
            b: [field("Bx")?, field("By")?, field("Bz")?],
        })
    }

    fn electrons_initializer(&self) -> Result<ElectronsInitializer, InputError> {
        let te = self.config.real("electrons", "Te")?;
        if te < 0.0 {
            return Err(InputError::Inconsistent(format!("electron temperature {} is negative", te)));
        }
        let eta = self.config.real_or("electrons", "eta", 0.0)?;
        Ok(ElectronsInitializer { te, eta })
    }

    fn boundary_condition(&self) -> Result<Box<dyn BoundaryCondition>, BoundaryError> {
        boundary::boundary_condition(&self.boundary, &self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::HybridQuantity;

    static INPUT: &str = "
---
constants:
  L: 4.0

control:
  dimension: 1
  nx: 40
  dx: L / 40
  dt: 0.01
  steps: 10
  n_outputs: 2
  interpolation_order: 2

fields:
  Bx: 1.0
  Ez: 0.5 * x

electrons:
  Te: 0.2

ions:
  species: [protons, alphas]

protons:
  mass: 1.0
  npc: 8
  density: 1.0
  vth: 0.1

alphas:
  mass: 4.0
  charge: 2.0
  npc: 4
  density: 0.1
  vx: 0.5
  seed: 3
";

    #[test]
    fn reads_a_complete_input() {
        let mut config = Configuration::from_str(INPUT).unwrap();
        config.with_context("constants");
        let init = ConfigInitializer::new(&config).unwrap();

        let layout = init.grid_layout();
        assert_eq!(layout.dimension(), 1);
        assert_eq!(layout.nbr_cells(Direction::X), 40);
        assert!((layout.dx() - 0.1).abs() < 1.0e-15);
        assert_eq!(init.interpolation_order(), 2);
        assert_eq!(init.time_step(), 0.01);
        assert_eq!(init.pusher(), "modified_boris");
        assert_eq!((init.steps(), init.n_outputs()), (10, 2));
        assert!(init.boundary_condition().is_ok());

        let electrons = init.electrons_initializer().unwrap();
        assert_eq!(electrons, ElectronsInitializer { te: 0.2, eta: 0.0 });

        let ions = init.ions_initializer().unwrap();
        let names: Vec<&str> = ions.species.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["protons", "alphas"]);
        assert_eq!(ions.species[1].mass, 4.0);

        let mut alphas = Vec::new();
        ions.species[1].loader.load_particles(&mut alphas);
        assert_eq!(alphas.len(), 40 * 4);
        assert!(alphas.iter().all(|p| p.charge == 2.0 && p.v[0] == 0.5));
    }

    #[test]
    fn fields_cover_ghost_nodes() {
        let mut config = Configuration::from_str(INPUT).unwrap();
        config.with_context("constants");
        let init = ConfigInitializer::new(&config).unwrap();
        let layout = init.grid_layout().clone();

        let mut em = Electromag::new(&layout, "");
        init.electromag_initializer().unwrap().initialize(&layout, &mut em);

        assert!(em.b.component(VecField::X).data().iter().all(|v| *v == 1.0));
        assert!(em.b.component(VecField::Y).data().iter().all(|v| *v == 0.0));
        let ez = em.e.component(VecField::Z);
        for i in 0..ez.shape()[0] {
            let x = layout.field_node_coordinates(HybridQuantity::Ez, [i, 0, 0]).x;
            assert_eq!(ez[i], 0.5 * x);
        }
        assert!(ez[0] < 0.0);
    }

    #[test]
    fn rejects_bad_control() {
        let read = |text: &str| {
            let mut config = Configuration::from_str(text).unwrap();
            config.with_context("constants");
            config
        };

        let config = read(&INPUT.replace("dt: 0.01", "dt: -0.01"));
        assert!(ConfigInitializer::new(&config).is_err());

        let config = read(&INPUT.replace("nx: 40", "nx: 5"));
        assert!(ConfigInitializer::new(&config).is_err());

        // present but mistyped control strings are not replaced by defaults
        let config = read(&INPUT.replace("interpolation_order: 2", "interpolation_order: 2\n  pusher: 3"));
        assert!(ConfigInitializer::new(&config).is_err());

        let config = read(&INPUT.replace("interpolation_order: 2", "interpolation_order: 2\n  boundary: [periodic, open]"));
        assert!(ConfigInitializer::new(&config).is_err());

        let config = read(&INPUT.replace("interpolation_order: 2", "interpolation_order: 2\n  layout: 1.5"));
        assert!(ConfigInitializer::new(&config).is_err());

        let config = read(&INPUT.replace("mass: 4.0", "mass: 0.0"));
        let init = ConfigInitializer::new(&config).unwrap();
        assert!(matches!(init.ions_initializer(), Err(InputError::Inconsistent(_))));
    }
}
