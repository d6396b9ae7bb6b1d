use crate::grid::{Direction, GridLayout, HybridQuantity};
use crate::field::{Field, VecField};

/// Ampère's law without displacement current, `J = curl B`, in 1D:
/// `Jx = 0`, `Jy = -dBz/dx`, `Jz = dBy/dx`.
pub struct Ampere {
    layout: GridLayout,
    dx_bz: Field,
}

impl Ampere {
    pub fn new(layout: &GridLayout) -> Ampere {
        Ampere {
            layout: layout.clone(),
            dx_bz: Field::new(layout, HybridQuantity::Jy, "dxBz"),
        }
    }

    pub fn compute(&mut self, b: &VecField, j: &mut VecField) {
        j.zero();

        // Jz is centered like the derivative of By
        self.layout.deriv(b.component(VecField::Y), Direction::X, j.component_mut(VecField::Z));

        self.layout.deriv(b.component(VecField::Z), Direction::X, &mut self.dx_bz);
        let jy = j.component_mut(VecField::Y);
        let start = self.layout.physical_start_index_of(HybridQuantity::Jy, Direction::X);
        let end = self.layout.physical_end_index_of(HybridQuantity::Jy, Direction::X);
        for i in start..=end {
            jy[i] = -self.dx_bz[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Point;

    #[test]
    fn current_of_sheared_field() {
        let layout = GridLayout::new(1, "yee", [0.05, 0.0, 0.0], [40, 0, 0], Point::new(0.0, 0.0, 0.0), 3).unwrap();
        let mut b = VecField::new(&layout, HybridQuantity::B, "B");
        for c in &[VecField::Y, VecField::Z] {
            let f = b.component_mut(*c);
            let qty = f.quantity();
            for i in 0..f.shape()[0] {
                let x = layout.field_node_coordinates(qty, [i, 0, 0]).x;
                f[i] = if *c == VecField::Y { 2.0 * x } else { 0.5 * x + 1.0 };
            }
        }
        b.component_mut(VecField::X).fill(7.0);

        let mut j = VecField::new(&layout, HybridQuantity::J, "J");
        let mut ampere = Ampere::new(&layout);
        ampere.compute(&b, &mut j);

        assert!(j.component(VecField::X).data().iter().all(|v| *v == 0.0));
        let start = layout.physical_start_index_of(HybridQuantity::Jy, Direction::X);
        let end = layout.physical_end_index_of(HybridQuantity::Jy, Direction::X);
        for i in start..=end {
            assert!((j.component(VecField::Y)[i] + 0.5).abs() < 1.0e-10);
            assert!((j.component(VecField::Z)[i] - 2.0).abs() < 1.0e-10);
        }
    }
}
