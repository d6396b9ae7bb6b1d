use crate::grid::{Direction, GridLayout, HybridQuantity};
use crate::field::{Field, VecField};

/// Faraday's law, `dB/dt = -curl E`, in 1D:
/// ```text
///   Bx' = Bx
///   By' = By + dt dEz/dx
///   Bz' = Bz - dt dEy/dx
/// ```
pub struct Faraday {
    layout: GridLayout,
    dx_ez: Field,
    dx_ey: Field,
}

impl Faraday {
    pub fn new(layout: &GridLayout) -> Faraday {
        Faraday {
            layout: layout.clone(),
            dx_ez: Field::new(layout, HybridQuantity::By, "dxEz"),
            dx_ey: Field::new(layout, HybridQuantity::Bz, "dxEy"),
        }
    }

    fn differentiate(&mut self, e: &VecField) {
        self.layout.deriv(e.component(VecField::Z), Direction::X, &mut self.dx_ez);
        self.layout.deriv(e.component(VecField::Y), Direction::X, &mut self.dx_ey);
    }

    /// Writes `B - dt curl E` into `b_new` over the physical nodes.
    pub fn advance(&mut self, e: &VecField, b: &VecField, b_new: &mut VecField, dt: f64) {
        b_new.assign(b);
        self.advance_in_place(e, b_new, dt);
    }

    /// Same as `advance` with `b` overwritten.
    pub fn advance_in_place(&mut self, e: &VecField, b: &mut VecField, dt: f64) {
        self.differentiate(e);

        let layout = &self.layout;
        let by = b.component_mut(VecField::Y);
        let start = layout.physical_start_index_of(HybridQuantity::By, Direction::X);
        let end = layout.physical_end_index_of(HybridQuantity::By, Direction::X);
        for i in start..=end {
            by[i] += dt * self.dx_ez[i];
        }

        let bz = b.component_mut(VecField::Z);
        let start = layout.physical_start_index_of(HybridQuantity::Bz, Direction::X);
        let end = layout.physical_end_index_of(HybridQuantity::Bz, Direction::X);
        for i in start..=end {
            bz[i] -= dt * self.dx_ey[i];
        }
    }
}
