use crate::grid::{Direction, HybridQuantity, QtyCentering};

/// Mesh families the layout knows how to stagger quantities on.
/// Only the Yee arrangement is currently available.
#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub enum LayoutFamily {
    Yee,
}

impl LayoutFamily {
    /// Matches the exact, lowercase name used in input files.
    pub fn from_name(name: &str) -> Option<LayoutFamily> {
        match name {
            "yee" => Some(LayoutFamily::Yee),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutFamily::Yee => "yee",
        }
    }

    /// Centering of `qty` along `dir`.
    pub fn centering(&self, qty: HybridQuantity, dir: Direction) -> QtyCentering {
        match self {
            LayoutFamily::Yee => yee_centering(qty)[dir.index()],
        }
    }
}

/*------------------------------------------------------------------------------------

  Yee staggering, per direction (x, y, z):

        |  primal nodes sit on cell boundaries, dual nodes at cell centres
        |
    B   |  Bx (P, D, D)    By (D, P, D)    Bz (D, D, P)
    E   |  Ex (D, P, P)    Ey (P, D, P)    Ez (P, P, D)
    J   |  centred like E
    n,V |  primal everywhere, as is the electron pressure

  In 1D only the first column matters: B is transverse-dual, E is
  transverse-primal, and the derivative along x of one lands on the other.

------------------------------------------------------------------------------------*/

fn yee_centering(qty: HybridQuantity) -> [QtyCentering; 3] {
    use HybridQuantity::*;
    use QtyCentering::*;
    match qty {
        Bx => [Primal, Dual, Dual],
        By => [Dual, Primal, Dual],
        Bz => [Dual, Dual, Primal],
        Ex | Jx => [Dual, Primal, Primal],
        Ey | Jy => [Primal, Dual, Primal],
        Ez | Jz => [Primal, Primal, Dual],
        Rho | Vx | Vy | Vz | P => [Primal, Primal, Primal],
    }
}
