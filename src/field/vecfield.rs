use crate::grid::{GridLayout, HybridQuantity};
use super::Field;

/// Three fields holding the x, y and z components of a vector quantity.
#[derive(Clone,Debug)]
pub struct VecField {
    name: String,
    components: [Field; 3],
}

impl VecField {
    pub const X: usize = 0;
    pub const Y: usize = 1;
    pub const Z: usize = 2;

    /// Allocates the components, named `<name>_x` etc., with the
    /// centerings of `quantities`.
    pub fn new(layout: &GridLayout, quantities: [HybridQuantity; 3], name: &str) -> VecField {
        VecField {
            name: name.to_owned(),
            components: [
                Field::new(layout, quantities[0], &format!("{}_x", name)),
                Field::new(layout, quantities[1], &format!("{}_y", name)),
                Field::new(layout, quantities[2], &format!("{}_z", name)),
            ],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component(&self, i: usize) -> &Field {
        &self.components[i]
    }

    pub fn component_mut(&mut self, i: usize) -> &mut Field {
        &mut self.components[i]
    }

    pub fn components(&self) -> &[Field; 3] {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut [Field; 3] {
        &mut self.components
    }

    pub fn quantities(&self) -> [HybridQuantity; 3] {
        [self.components[0].quantity(), self.components[1].quantity(), self.components[2].quantity()]
    }

    pub fn zero(&mut self) {
        for c in self.components.iter_mut() {
            c.zero();
        }
    }

    pub fn assign(&mut self, other: &VecField) {
        for (c, o) in self.components.iter_mut().zip(other.components.iter()) {
            c.assign(o);
        }
    }

    pub fn add_assign(&mut self, other: &VecField) {
        for (c, o) in self.components.iter_mut().zip(other.components.iter()) {
            c.add_assign(o);
        }
    }
}

/// Writes the node-wise mean of `a` and `b` into `avg`, ghosts included.
pub fn time_average(a: &VecField, b: &VecField, avg: &mut VecField) {
    for i in 0..3 {
        let (fa, fb) = (a.component(i), b.component(i));
        assert_eq!(fa.shape(), fb.shape());
        assert_eq!(fa.shape(), avg.component(i).shape());
        let out = avg.component_mut(i).data_mut();
        ndarray::Zip::from(out)
            .and(fa.data())
            .and(fb.data())
            .apply(|o, &x, &y| *o = 0.5 * (x + y));
    }
}
