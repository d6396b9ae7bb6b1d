//! Named, centered storage for grid quantities.

use std::ops::{Index, IndexMut};
use ndarray::prelude::*;

use crate::grid::{GridLayout, HybridQuantity};

mod vecfield;
mod electromag;
pub use self::vecfield::*;
pub use self::electromag::*;

/// One scalar quantity on the mesh, ghosts included, with shape
/// `layout.alloc_size(qty)`.
///
/// `field[i]` addresses node `(i, 0, 0)`, which is the whole field in 1D;
/// `field[[i, j, k]]` addresses any node.
#[derive(Clone,Debug)]
pub struct Field {
    name: String,
    qty: HybridQuantity,
    data: Array3<f64>,
}

impl Field {
    pub fn new(layout: &GridLayout, qty: HybridQuantity, name: &str) -> Field {
        let [nx, ny, nz] = layout.alloc_size(qty);
        Field {
            name: name.to_owned(),
            qty,
            data: Array3::zeros((nx, ny, nz)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> HybridQuantity {
        self.qty
    }

    pub fn shape(&self) -> [usize; 3] {
        let s = self.data.shape();
        [s[0], s[1], s[2]]
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array3<f64> {
        &mut self.data
    }

    pub fn fill(&mut self, value: f64) {
        self.data.map_inplace(|v| *v = value);
    }

    pub fn zero(&mut self) {
        self.fill(0.0);
    }

    /// Copies values from a field of the same shape.
    pub fn assign(&mut self, other: &Field) {
        assert_eq!(self.shape(), other.shape(), "cannot copy {} into {}", other.name, self.name);
        self.data.assign(&other.data);
    }

    /// Adds, node by node, a field of the same shape.
    pub fn add_assign(&mut self, other: &Field) {
        assert_eq!(self.shape(), other.shape(), "cannot add {} to {}", other.name, self.name);
        self.data.zip_mut_with(&other.data, |a, b| *a += *b);
    }
}

impl Index<usize> for Field {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.data[[i, 0, 0]]
    }
}

impl IndexMut<usize> for Field {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.data[[i, 0, 0]]
    }
}

impl Index<[usize; 3]> for Field {
    type Output = f64;
    fn index(&self, i: [usize; 3]) -> &f64 {
        &self.data[i]
    }
}

impl IndexMut<[usize; 3]> for Field {
    fn index_mut(&mut self, i: [usize; 3]) -> &mut f64 {
        &mut self.data[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Point;

    #[test]
    fn shape_follows_layout() {
        let layout = GridLayout::new(2, "yee", [0.1, 0.1, 0.0], [10, 12, 0], Point::new(0.0, 0.0, 0.0), 1).unwrap();
        let bx = Field::new(&layout, HybridQuantity::Bx, "Bx");
        assert_eq!(bx.shape(), layout.alloc_size(HybridQuantity::Bx));
        assert_eq!(bx.name(), "Bx");
        assert!(bx.data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn flat_and_multi_indexing_agree() {
        let layout = GridLayout::new(1, "yee", [0.1, 0.0, 0.0], [10, 0, 0], Point::new(0.0, 0.0, 0.0), 2).unwrap();
        let mut rho = Field::new(&layout, HybridQuantity::Rho, "rho");
        rho[4] = 2.5;
        assert_eq!(rho[[4, 0, 0]], 2.5);
        let mut other = rho.clone();
        other.add_assign(&rho);
        assert_eq!(other[4], 5.0);
        other.zero();
        assert_eq!(other[4], 0.0);
    }
}
