use crate::grid::{Direction, GridLayout, HybridQuantity};
use crate::field::{Field, VecField};
use crate::particle::DENSITY_FLOOR;

/// Generalized Ohm's law for a massless electron fluid,
/// ```text
///   E = -Ve x B - grad(Pe) / n + eta J
/// ```
/// with every term brought to the centering of the E component it feeds.
/// Where `n` is below `DENSITY_FLOOR` the pressure term is dropped.
pub struct Ohm {
    layout: GridLayout,
    eta: f64,
    dx_pe: Field,
}

impl Ohm {
    pub fn new(layout: &GridLayout, eta: f64) -> Ohm {
        Ohm {
            layout: layout.clone(),
            eta,
            // the pressure gradient lands on Ex nodes
            dx_pe: Field::new(layout, HybridQuantity::Ex, "dxPe"),
        }
    }

    pub fn resistivity(&self) -> f64 {
        self.eta
    }

    pub fn compute(&mut self, b: &VecField, n: &Field, ve: &VecField, pe: &Field, j: &VecField, e: &mut VecField) {
        self.layout.deriv(pe, Direction::X, &mut self.dx_pe);

        let layout = &self.layout;
        let eta = self.eta;
        let (bx, by, bz) = (b.component(VecField::X), b.component(VecField::Y), b.component(VecField::Z));
        let (vx, vy, vz) = (ve.component(VecField::X), ve.component(VecField::Y), ve.component(VecField::Z));

        let ex = e.component_mut(VecField::X);
        let qty = ex.quantity();
        let start = layout.physical_start_index_of(qty, Direction::X);
        let end = layout.physical_end_index_of(qty, Direction::X);
        for i in start..=end {
            let vey = layout.project_x(vy, qty, i);
            let vez = layout.project_x(vz, qty, i);
            let b_y = layout.project_x(by, qty, i);
            let b_z = layout.project_x(bz, qty, i);
            let density = layout.project_x(n, qty, i);
            let pressure = if density.abs() < DENSITY_FLOOR { 0.0 } else { self.dx_pe[i] / density };
            ex[i] = -(vey * b_z - vez * b_y) - pressure + eta * j.component(VecField::X)[i];
        }

        let ey = e.component_mut(VecField::Y);
        let qty = ey.quantity();
        let start = layout.physical_start_index_of(qty, Direction::X);
        let end = layout.physical_end_index_of(qty, Direction::X);
        for i in start..=end {
            let vex = layout.project_x(vx, qty, i);
            let vez = layout.project_x(vz, qty, i);
            let b_x = layout.project_x(bx, qty, i);
            let b_z = layout.project_x(bz, qty, i);
            ey[i] = -(vez * b_x - vex * b_z) + eta * j.component(VecField::Y)[i];
        }

        let ez = e.component_mut(VecField::Z);
        let qty = ez.quantity();
        let start = layout.physical_start_index_of(qty, Direction::X);
        let end = layout.physical_end_index_of(qty, Direction::X);
        for i in start..=end {
            let vex = layout.project_x(vx, qty, i);
            let vey = layout.project_x(vy, qty, i);
            let b_x = layout.project_x(bx, qty, i);
            let b_y = layout.project_x(by, qty, i);
            ez[i] = -(vex * b_y - vey * b_x) + eta * j.component(VecField::Z)[i];
        }
    }
}
