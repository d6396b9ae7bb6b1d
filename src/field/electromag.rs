use crate::grid::{GridLayout, HybridQuantity};
use super::{Field, VecField};

/// Electric and magnetic fields of a patch.
#[derive(Clone,Debug)]
pub struct Electromag {
    pub e: VecField,
    pub b: VecField,
}

impl Electromag {
    /// Allocates zeroed fields named `E<suffix>` and `B<suffix>`.
    pub fn new(layout: &GridLayout, suffix: &str) -> Electromag {
        Electromag {
            e: VecField::new(layout, HybridQuantity::E, &format!("E{}", suffix)),
            b: VecField::new(layout, HybridQuantity::B, &format!("B{}", suffix)),
        }
    }

    /// Electric field energy, in normalized units, integrated over the
    /// physical domain.
    pub fn electric_energy(&self, layout: &GridLayout) -> f64 {
        self.e.components().iter().map(|f| energy_of(layout, f)).sum()
    }

    pub fn magnetic_energy(&self, layout: &GridLayout) -> f64 {
        self.b.components().iter().map(|f| energy_of(layout, f)).sum()
    }

    pub fn energy(&self, layout: &GridLayout) -> f64 {
        self.electric_energy(layout) + self.magnetic_energy(layout)
    }
}

// One node per cell along each active direction, so that the shared
// periodic primal node is not counted twice.
fn energy_of(layout: &GridLayout, field: &Field) -> f64 {
    let mut lo = [0; 3];
    let mut hi = [1; 3];
    for &dir in layout.active_directions() {
        let d = dir.index();
        lo[d] = layout.physical_start_index_of(field.quantity(), dir);
        hi[d] = lo[d] + layout.nbr_cells(dir) as usize;
    }

    let mut sum = 0.0;
    for i in lo[0]..hi[0] {
        for j in lo[1]..hi[1] {
            for k in lo[2]..hi[2] {
                sum += field[[i, j, k]].powi(2);
            }
        }
    }

    0.5 * sum * layout.cell_volume()
}
