//! Description of the staggered mesh on a patch: where every hybrid
//! quantity lives, how many ghost nodes surround it, and how to take
//! finite differences between centerings.

use std::fmt;
use std::error::Error;

use crate::field::Field;

mod yee;
pub use self::yee::*;

/// Smallest number of physical cells allowed along an active direction.
pub const MIN_NBR_CELLS: u32 = 10;

// Absorbs round-off in extent / spacing when sizing a refined layout.
const CELL_COUNT_TOLERANCE: f64 = 1.0e-10;

#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub enum Direction {
    X,
    Y,
    Z,
}

static DIRECTIONS: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

    pub fn index(self) -> usize {
        match self {
            Direction::X => 0,
            Direction::Y => 1,
            Direction::Z => 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Direction::X => "x",
            Direction::Y => "y",
            Direction::Z => "z",
        }
    }
}

/// Whether a quantity sits on cell boundaries (primal) or cell centres
/// (dual) along a given direction.
#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub enum QtyCentering {
    Primal,
    Dual,
}

impl QtyCentering {
    /// The centering obtained after one finite difference.
    pub fn flip(self) -> QtyCentering {
        match self {
            QtyCentering::Primal => QtyCentering::Dual,
            QtyCentering::Dual => QtyCentering::Primal,
        }
    }

    fn is_dual(self) -> usize {
        match self {
            QtyCentering::Primal => 0,
            QtyCentering::Dual => 1,
        }
    }
}

#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub enum HybridQuantity {
    Bx, By, Bz,
    Ex, Ey, Ez,
    Jx, Jy, Jz,
    Rho,
    Vx, Vy, Vz,
    P,
}

impl HybridQuantity {
    pub const B: [HybridQuantity; 3] = [HybridQuantity::Bx, HybridQuantity::By, HybridQuantity::Bz];
    pub const E: [HybridQuantity; 3] = [HybridQuantity::Ex, HybridQuantity::Ey, HybridQuantity::Ez];
    pub const J: [HybridQuantity; 3] = [HybridQuantity::Jx, HybridQuantity::Jy, HybridQuantity::Jz];
    pub const V: [HybridQuantity; 3] = [HybridQuantity::Vx, HybridQuantity::Vy, HybridQuantity::Vz];
}

#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Point {
        Point {x, y, z}
    }

    pub fn component(&self, dir: Direction) -> f64 {
        match dir {
            Direction::X => self.x,
            Direction::Y => self.y,
            Direction::Z => self.z,
        }
    }

    fn component_mut(&mut self, dir: Direction) -> &mut f64 {
        match dir {
            Direction::X => &mut self.x,
            Direction::Y => &mut self.y,
            Direction::Z => &mut self.z,
        }
    }
}

/// Axis-aligned box, `lower` inclusive, `upper` exclusive.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Region {
    pub lower: Point,
    pub upper: Point,
}

impl Region {
    pub fn new(lower: Point, upper: Point) -> Region {
        Region {lower, upper}
    }

    pub fn extent(&self, dir: Direction) -> f64 {
        self.upper.component(dir) - self.lower.component(dir)
    }
}

pub enum LayoutError {
    InvalidDimension(usize),
    UnknownLayout(String),
    InvalidInterpolationOrder(u32),
    InvalidSpacing(Direction, f64),
    TooFewCells(Direction, u32),
    NonZeroInvariant(Direction),
    InvalidRefinementRatio(u32),
}

impl fmt::Debug for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use LayoutError::*;
        match self {
            InvalidDimension(d) => write!(f, "dimension must be 1, 2 or 3, not {}", d),
            UnknownLayout(s) => write!(f, "unknown layout '{}', expected 'yee'", s),
            InvalidInterpolationOrder(p) => write!(f, "interpolation order must be between 1 and 4, not {}", p),
            InvalidSpacing(dir, dx) => write!(f, "mesh spacing along {} must be finite and positive, not {}", dir.label(), dx),
            TooFewCells(dir, n) => write!(f, "need at least {} cells along {}, found {}", MIN_NBR_CELLS, dir.label(), n),
            NonZeroInvariant(dir) => write!(f, "spacing and cell count along invariant direction {} must be zero", dir.label()),
            InvalidRefinementRatio(r) => write!(f, "refinement ratio must be positive, not {}", r),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for LayoutError {}

/// Validated description of the mesh on one patch.
///
/// Quantities are stored as `[x][y][z]` arrays whose extent along every
/// invariant direction is one. Along an active direction, a quantity with
/// centering `c` spans
/// ```text
///   ghost start (0) .. physical start .. physical end .. ghost end
/// ```
/// where the physical start equals the number of ghosts for `c`, the
/// physical end is `start + cells - isDual`, and the same number of ghosts
/// follow the physical end.
#[derive(Clone,Debug,PartialEq)]
pub struct GridLayout {
    dims: usize,
    family: LayoutFamily,
    spacing: [f64; 3],
    inverse_spacing: [f64; 3],
    nbr_cells: [u32; 3],
    origin: Point,
    interp_order: u32,
}

impl GridLayout {
    /// Builds and validates a layout. `spacing` and `nbr_cells` must be
    /// zero along directions beyond `dims`.
    pub fn new(dims: usize, layout_name: &str, spacing: [f64; 3], nbr_cells: [u32; 3], origin: Point, interp_order: u32) -> Result<GridLayout, LayoutError> {
        if dims < 1 || dims > 3 {
            return Err(LayoutError::InvalidDimension(dims));
        }

        let family = LayoutFamily::from_name(layout_name)
            .ok_or_else(|| LayoutError::UnknownLayout(layout_name.to_owned()))?;

        if interp_order < 1 || interp_order > 4 {
            return Err(LayoutError::InvalidInterpolationOrder(interp_order));
        }

        for dir in Direction::ALL.iter() {
            let i = dir.index();
            if i < dims {
                if !spacing[i].is_finite() || spacing[i] <= 0.0 {
                    return Err(LayoutError::InvalidSpacing(*dir, spacing[i]));
                }
                if nbr_cells[i] < MIN_NBR_CELLS {
                    return Err(LayoutError::TooFewCells(*dir, nbr_cells[i]));
                }
            } else if spacing[i] != 0.0 || nbr_cells[i] != 0 {
                return Err(LayoutError::NonZeroInvariant(*dir));
            }
        }

        let mut inverse_spacing = [0.0; 3];
        for i in 0..dims {
            inverse_spacing[i] = 1.0 / spacing[i];
        }

        Ok(GridLayout {
            dims,
            family,
            spacing,
            inverse_spacing,
            nbr_cells,
            origin,
            interp_order,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dims
    }

    pub fn layout_name(&self) -> &'static str {
        self.family.name()
    }

    pub fn spacing(&self, dir: Direction) -> f64 {
        self.spacing[dir.index()]
    }

    pub fn dx(&self) -> f64 {
        self.spacing[0]
    }

    pub fn dy(&self) -> f64 {
        self.spacing[1]
    }

    pub fn dz(&self) -> f64 {
        self.spacing[2]
    }

    /// Panics along an invariant direction, where the spacing is zero.
    pub fn inverse_spacing(&self, dir: Direction) -> f64 {
        assert!(self.is_active(dir), "no inverse spacing along invariant direction {}", dir.label());
        self.inverse_spacing[dir.index()]
    }

    pub fn nbr_cells(&self, dir: Direction) -> u32 {
        self.nbr_cells[dir.index()]
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn interp_order(&self) -> u32 {
        self.interp_order
    }

    pub fn is_active(&self, dir: Direction) -> bool {
        dir.index() < self.dims
    }

    /// The first `dims` directions.
    pub fn active_directions(&self) -> &'static [Direction] {
        &DIRECTIONS[..self.dims]
    }

    /// Volume (length, area) of one cell.
    pub fn cell_volume(&self) -> f64 {
        self.spacing[..self.dims].iter().product()
    }

    /// Physical extent of the patch.
    pub fn bounds(&self) -> Region {
        let mut upper = self.origin;
        for &dir in self.active_directions() {
            *upper.component_mut(dir) += self.spacing(dir) * (self.nbr_cells(dir) as f64);
        }
        Region::new(self.origin, upper)
    }

    pub fn field_centering(&self, qty: HybridQuantity, dir: Direction) -> QtyCentering {
        self.family.centering(qty, dir)
    }

    /// Centering of the derivative of `qty` along `dir`.
    pub fn derived_centering(&self, qty: HybridQuantity, dir: Direction) -> QtyCentering {
        self.field_centering(qty, dir).flip()
    }

    /*------------------------------------------------------------------------------------

      Ghost widths follow from the interpolation order p. A particle
      standing on the last physical node reaches floor(p/2) primal or
      floor((p+1)/2) dual nodes beyond it. Order 1 is widened to one
      ghost in both centerings so that finite differences always have a
      neighbour to read.

              p   |  1  2  3  4
        ----------+-------------
        primal    |  1  1  1  2
        dual      |  1  1  2  2

    ------------------------------------------------------------------------------------*/

    pub fn nbr_ghosts(&self, centering: QtyCentering) -> usize {
        let p = self.interp_order as usize;
        if p == 1 {
            return 1;
        }
        match centering {
            QtyCentering::Primal => p / 2,
            QtyCentering::Dual => (p + 1) / 2,
        }
    }

    pub fn ghost_start_index(&self, _centering: QtyCentering, _dir: Direction) -> usize {
        0
    }

    pub fn physical_start_index(&self, centering: QtyCentering, dir: Direction) -> usize {
        if self.is_active(dir) {
            self.nbr_ghosts(centering)
        } else {
            0
        }
    }

    pub fn physical_end_index(&self, centering: QtyCentering, dir: Direction) -> usize {
        if self.is_active(dir) {
            self.physical_start_index(centering, dir) + self.nbr_cells(dir) as usize - centering.is_dual()
        } else {
            0
        }
    }

    pub fn ghost_end_index(&self, centering: QtyCentering, dir: Direction) -> usize {
        if self.is_active(dir) {
            self.physical_end_index(centering, dir) + self.nbr_ghosts(centering)
        } else {
            0
        }
    }

    pub fn physical_start_index_of(&self, qty: HybridQuantity, dir: Direction) -> usize {
        self.physical_start_index(self.field_centering(qty, dir), dir)
    }

    pub fn physical_end_index_of(&self, qty: HybridQuantity, dir: Direction) -> usize {
        self.physical_end_index(self.field_centering(qty, dir), dir)
    }

    pub fn ghost_end_index_of(&self, qty: HybridQuantity, dir: Direction) -> usize {
        self.ghost_end_index(self.field_centering(qty, dir), dir)
    }

    pub fn physical_start_index_of_field(&self, field: &Field, dir: Direction) -> usize {
        self.physical_start_index_of(field.quantity(), dir)
    }

    pub fn physical_end_index_of_field(&self, field: &Field, dir: Direction) -> usize {
        self.physical_end_index_of(field.quantity(), dir)
    }

    /// Number of physical nodes of `qty` along each direction.
    pub fn nbr_physical_nodes(&self, qty: HybridQuantity) -> [usize; 3] {
        let mut nodes = [1; 3];
        for &dir in self.active_directions() {
            let c = self.field_centering(qty, dir);
            nodes[dir.index()] = self.physical_end_index(c, dir) - self.physical_start_index(c, dir) + 1;
        }
        nodes
    }

    fn alloc_along(&self, centering: QtyCentering, dir: Direction) -> usize {
        if self.is_active(dir) {
            self.nbr_cells(dir) as usize + 1 - centering.is_dual() + 2 * self.nbr_ghosts(centering)
        } else {
            1
        }
    }

    /// Array shape, ghosts included, of a quantity.
    pub fn alloc_size(&self, qty: HybridQuantity) -> [usize; 3] {
        let mut shape = [1; 3];
        for &dir in self.active_directions() {
            shape[dir.index()] = self.alloc_along(self.field_centering(qty, dir), dir);
        }
        shape
    }

    /// Array shape of the derivative of `qty` along `dir`.
    pub fn alloc_size_derived(&self, qty: HybridQuantity, dir: Direction) -> [usize; 3] {
        let mut shape = self.alloc_size(qty);
        if self.is_active(dir) {
            shape[dir.index()] = self.alloc_along(self.derived_centering(qty, dir), dir);
        }
        shape
    }

    /// First-order finite difference of `operand` along `dir`, written over
    /// the physical range of `derivative`. The derivative must be centered
    /// opposite to the operand along `dir`, and only 1D layouts are supported.
    ///
    /// Walking the destination's physical nodes from `iDer`, the operand is
    /// read from its own physical start, one node earlier if it is dual:
    /// ```text
    ///   der[iDer] = (op[iOp + 1] - op[iOp]) / dx
    /// ```
    pub fn deriv(&self, operand: &Field, dir: Direction, derivative: &mut Field) {
        assert!(self.dims == 1, "finite differences are only available in 1D");
        assert!(dir == Direction::X, "1D layouts can only be differentiated along x");

        let op_centering = self.field_centering(operand.quantity(), dir);
        let der_centering = self.field_centering(derivative.quantity(), dir);
        assert_eq!(der_centering, op_centering.flip(), "derivative of {:?} cannot be stored in {:?}", operand.quantity(), derivative.quantity());
        assert_eq!(operand.shape(), self.alloc_size(operand.quantity()));
        assert_eq!(derivative.shape(), self.alloc_size_derived(operand.quantity(), dir));

        let inv_dx = self.inverse_spacing(dir);
        let start = self.physical_start_index(der_centering, dir);
        let end = self.physical_end_index(der_centering, dir);
        let mut i_op = self.physical_start_index(op_centering, dir) - op_centering.is_dual();

        for i_der in start..=end {
            derivative[i_der] = (operand[i_op + 1] - operand[i_op]) * inv_dx;
            i_op += 1;
        }
    }

    /// Mean of `operand` onto node `index` of a quantity centered like `dest`
    /// along x. Nodes of the same centering are read directly; a dual node
    /// averages its two primal neighbours and vice versa. `index` must lie
    /// in the physical range of `dest`.
    pub fn project_x(&self, operand: &Field, dest: HybridQuantity, index: usize) -> f64 {
        let op_centering = self.field_centering(operand.quantity(), Direction::X);
        let dest_centering = self.field_centering(dest, Direction::X);
        let k = index - self.physical_start_index(dest_centering, Direction::X);
        let op_start = self.physical_start_index(op_centering, Direction::X);

        match (dest_centering, op_centering) {
            (QtyCentering::Dual, QtyCentering::Primal) => {
                0.5 * (operand[op_start + k] + operand[op_start + k + 1])
            },
            (QtyCentering::Primal, QtyCentering::Dual) => {
                0.5 * (operand[op_start + k - 1] + operand[op_start + k])
            },
            _ => operand[op_start + k],
        }
    }

    /// Physical coordinates of node `index` of `qty`.
    pub fn field_node_coordinates(&self, qty: HybridQuantity, index: [usize; 3]) -> Point {
        let mut point = self.origin;
        for &dir in self.active_directions() {
            let centering = self.field_centering(qty, dir);
            let start = self.physical_start_index(centering, dir) as f64;
            let half = 0.5 * (centering.is_dual() as f64);
            *point.component_mut(dir) += (index[dir.index()] as f64 - start + half) * self.spacing(dir);
        }
        point
    }

    /// Coordinates of the centre of the cell whose primal lower node is `index`.
    pub fn cell_centered_coordinates(&self, index: [usize; 3]) -> Point {
        let mut point = self.origin;
        for &dir in self.active_directions() {
            let start = self.physical_start_index(QtyCentering::Primal, dir) as f64;
            *point.component_mut(dir) += (index[dir.index()] as f64 - start + 0.5) * self.spacing(dir);
        }
        point
    }

    /// Layout of a mesh refined by `ratio` over `region`. The origin is
    /// kept, spacing is divided by the ratio and the cell count follows
    /// from the extent of the region.
    pub fn sub_layout(&self, region: &Region, ratio: u32) -> Result<GridLayout, LayoutError> {
        if ratio == 0 {
            return Err(LayoutError::InvalidRefinementRatio(ratio));
        }

        let mut spacing = [0.0; 3];
        let mut nbr_cells = [0; 3];
        for &dir in self.active_directions() {
            let i = dir.index();
            spacing[i] = self.spacing[i] / (ratio as f64);
            let cells = region.extent(dir) / spacing[i] - CELL_COUNT_TOLERANCE;
            nbr_cells[i] = cells.ceil().max(0.0) as u32;
        }

        GridLayout::new(self.dims, self.family.name(), spacing, nbr_cells, self.origin, self.interp_order)
    }
}
