use std::ops::{Deref, Range};

/// Widest stencil, reached at order 4.
pub const MAX_STENCIL: usize = 5;

/// Shape-function weights of one stencil, `order + 1` of them.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Weights {
    values: [f64; MAX_STENCIL],
    len: usize,
}

impl Weights {
    /// Single unit weight, the stencil along an invariant direction.
    pub fn unit() -> Weights {
        let mut values = [0.0; MAX_STENCIL];
        values[0] = 1.0;
        Weights {values, len: 1}
    }
}

impl Deref for Weights {
    type Target = [f64];
    fn deref(&self) -> &[f64] {
        &self.values[..self.len]
    }
}

/// B-spline shape functions of order 1 to 4 in mesh index units.
#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub struct IndexesAndWeights {
    order: u32,
}

impl IndexesAndWeights {
    pub fn new(order: u32) -> IndexesAndWeights {
        assert!(order >= 1 && order <= 4, "no shape function of order {}", order);
        IndexesAndWeights {order}
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    /// The `order + 1` contiguous nodes touched by a particle at `reduced`.
    pub fn compute_indexes(&self, reduced: f64) -> Range<isize> {
        let start = (reduced - 0.5 * (self.order as f64 - 1.0)).floor() as isize;
        start..(start + self.order as isize + 1)
    }

    /*------------------------------------------------------------------------------------

      Weights of the nodes returned by compute_indexes, in order. Odd orders
      measure the offset from the node below, even orders from the nearest
      node, so that the stencil is centred on the particle:

               order 1, 3                       order 2, 4
        |-------x---|-----------|      |-----|--x--------|-----|
        i    delta  i+1                i-1   i delta    i+1

    ------------------------------------------------------------------------------------*/

    pub fn compute_weights(&self, reduced: f64) -> Weights {
        let mut values = [0.0; MAX_STENCIL];
        match self.order {
            1 => {
                let d = reduced - reduced.floor();
                values[0] = 1.0 - d;
                values[1] = d;
            },
            2 => {
                let d = reduced - reduced.round();
                values[0] = 0.5 * (0.5 - d).powi(2);
                values[1] = 0.75 - d * d;
                values[2] = 0.5 * (0.5 + d).powi(2);
            },
            3 => {
                let d = reduced - reduced.floor();
                let d2 = d * d;
                let d3 = d2 * d;
                values[0] = (1.0 - d).powi(3) / 6.0;
                values[1] = (4.0 - 6.0 * d2 + 3.0 * d3) / 6.0;
                values[2] = (1.0 + 3.0 * d + 3.0 * d2 - 3.0 * d3) / 6.0;
                values[3] = d3 / 6.0;
            },
            _ => {
                let d = reduced - reduced.round();
                let d2 = d * d;
                let d3 = d2 * d;
                let d4 = d3 * d;
                values[0] = (1.0 - 2.0 * d).powi(4) / 384.0;
                values[1] = (19.0 - 44.0 * d + 24.0 * d2 + 16.0 * d3 - 16.0 * d4) / 96.0;
                values[2] = (115.0 - 120.0 * d2 + 48.0 * d4) / 192.0;
                values[3] = (19.0 + 44.0 * d + 24.0 * d2 - 16.0 * d3 - 16.0 * d4) / 96.0;
                values[4] = (1.0 + 2.0 * d).powi(4) / 384.0;
            },
        }
        Weights {values, len: self.order as usize + 1}
    }

    pub fn stencil(&self, reduced: f64) -> (Range<isize>, Weights) {
        (self.compute_indexes(reduced), self.compute_weights(reduced))
    }
}
