use crate::grid::{Direction, GridLayout, HybridQuantity};
use crate::field::{Field, VecField};
use super::{Ions, DENSITY_FLOOR};

/// Isothermal, massless electron fluid.
///
/// Quasi-neutrality makes the electron density equal to the ion charge
/// density `n`, from which the closure gives
/// ```text
///   Pe = n Te,    Ve = Vi - J / n
/// ```
/// on the primal moment nodes.
pub struct Electrons {
    te: f64,
    layout: GridLayout,
    velocity: VecField,
    pressure: Field,
}

impl Electrons {
    pub fn new(layout: &GridLayout, te: f64) -> Electrons {
        Electrons {
            te,
            layout: layout.clone(),
            velocity: VecField::new(layout, HybridQuantity::V, "Ve"),
            pressure: Field::new(layout, HybridQuantity::P, "Pe"),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.te
    }

    pub fn velocity(&self) -> &VecField {
        &self.velocity
    }

    pub fn pressure(&self) -> &Field {
        &self.pressure
    }

    /// Recomputes Pe and Ve from the current ion moments and total current.
    pub fn update(&mut self, ions: &Ions, j: &VecField) {
        let layout = &self.layout;
        let n = ions.rho();
        let vi = ions.bulk_velocity();
        let start = layout.physical_start_index_of(HybridQuantity::P, Direction::X);
        let end = layout.physical_end_index_of(HybridQuantity::P, Direction::X);

        self.pressure.zero();
        self.velocity.zero();

        for i in start..=end {
            self.pressure[i] = n[i] * self.te;

            for c in 0..3 {
                let ji = layout.project_x(j.component(c), HybridQuantity::V[c], i);
                let ve = if n[i].abs() < DENSITY_FLOOR {
                    vi.component(c)[i]
                } else {
                    vi.component(c)[i] - ji / n[i]
                };
                self.velocity.component_mut(c)[i] = ve;
            }
        }
    }
}
