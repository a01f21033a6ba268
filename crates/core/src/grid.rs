//! Grid model: the bounded integer coordinate space of a site.
//!
//! A site is an N×N grid of square cells. `cell_size` is the real-world area
//! of one cell in square metres, so a cell edge is `sqrt(cell_size)` metres
//! long. All metric conversions in the engine go through [`Grid::scaled_distance`].

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest supported grid side; cell coordinates are `i32`.
pub const MAX_GRID_SIZE: u32 = i32::MAX as u32;

/// A bounded N×N site grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    /// Number of cells along each axis.
    size: u32,
    /// Area of a single cell in square metres.
    cell_size: f64,
}

impl Grid {
    /// Creates a grid with `size`×`size` cells of `cell_size` m² each.
    pub fn new(size: u32, cell_size: f64) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidInput("grid size must be positive".into()));
        }
        if size > MAX_GRID_SIZE {
            return Err(Error::InvalidInput(format!(
                "grid size must be at most {MAX_GRID_SIZE}, got {size}"
            )));
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "cell size must be a positive finite number, got {cell_size}"
            )));
        }
        Ok(Self { size, cell_size })
    }

    /// Derives the grid side from an area budget: `ceil(sqrt(area / cell_size))`.
    pub fn from_area(area_m2: f64, cell_size: f64) -> Result<Self> {
        if !area_m2.is_finite() || area_m2 <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "area budget must be a positive finite number, got {area_m2}"
            )));
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "cell size must be a positive finite number, got {cell_size}"
            )));
        }
        let side = (area_m2 / cell_size).sqrt().ceil();
        if side > u32::MAX as f64 {
            return Err(Error::InvalidInput("area budget too large".into()));
        }
        Self::new(side as u32, cell_size)
    }

    /// Returns N.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the area of one cell in m².
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Edge length of one cell in metres.
    pub fn cell_side_m(&self) -> f64 {
        self.cell_size.sqrt()
    }

    /// Total grid area in m².
    pub fn area_m2(&self) -> f64 {
        let n = self.size as f64;
        n * n * self.cell_size
    }

    /// The geometric centre of the grid, `(N/2, N/2)`.
    pub fn center(&self) -> GridPoint {
        let half = self.size as f64 / 2.0;
        GridPoint::new(half, half)
    }

    /// Returns true iff `x≥0 ∧ y≥0 ∧ x+w≤N ∧ y+h≤N`.
    pub fn in_bounds(&self, x: i32, y: i32, width: u32, height: u32) -> bool {
        let n = i64::from(self.size);
        x >= 0
            && y >= 0
            && i64::from(x) + i64::from(width) <= n
            && i64::from(y) + i64::from(height) <= n
    }

    /// Returns true if the single cell `(x, y)` is on the grid.
    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y, 1, 1)
    }

    /// Iterates every cell origin in row-major order (`y` outer, `x` inner).
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let n = i32::try_from(self.size).unwrap_or(i32::MAX);
        (0..n).flat_map(move |y| (0..n).map(move |x| (x, y)))
    }

    /// Euclidean distance in metres between two grid-space points.
    ///
    /// Each axis delta is scaled by `sqrt(cell_size)` before squaring.
    pub fn scaled_distance(&self, a: GridPoint, b: GridPoint) -> f64 {
        let side = self.cell_side_m();
        let dx = (b.x - a.x) * side;
        let dy = (b.y - a.y) * side;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A point in continuous grid space (cell units, not metres).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Plain Euclidean distance in grid units.
    pub fn distance_to(&self, other: GridPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<(f64, f64)> for GridPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<GridPoint> for (f64, f64) {
    fn from(p: GridPoint) -> Self {
        (p.x, p.y)
    }
}

/// An axis-aligned block of whole cells anchored at its top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CellRect {
    /// Creates a new rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of cells covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Returns true if the rectangle covers no cells.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Geometric centre `(x + w/2, y + h/2)`.
    pub fn center(&self) -> GridPoint {
        GridPoint::new(
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }

    /// Returns true if the cell `(cx, cy)` is covered.
    pub fn contains_cell(&self, cx: i32, cy: i32) -> bool {
        self.aabb().contains(i64::from(cx), i64::from(cy))
    }

    /// The half-open box covered by this rectangle.
    pub fn aabb(&self) -> CellAabb {
        self.expanded(0)
    }

    /// The half-open box grown by `clearance` cells on all four sides.
    pub fn expanded(&self, clearance: u32) -> CellAabb {
        let c = i64::from(clearance);
        CellAabb {
            min_x: i64::from(self.x) - c,
            min_y: i64::from(self.y) - c,
            max_x: i64::from(self.x) + i64::from(self.width) + c,
            max_y: i64::from(self.y) + i64::from(self.height) + c,
        }
    }

    /// Lattice points of the closed rectangle, row-major.
    ///
    /// This covers the origin of every occupied cell plus the far edges, so the
    /// four corners are always included.
    pub fn lattice_points(&self) -> impl Iterator<Item = GridPoint> {
        let (x0, y0) = (i64::from(self.x), i64::from(self.y));
        let (x1, y1) = (x0 + i64::from(self.width), y0 + i64::from(self.height));
        (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| GridPoint::new(x as f64, y as f64)))
    }
}

/// Half-open integer box `[min_x, max_x) × [min_y, max_y)`.
///
/// Widened to `i64` so clearance expansion near the grid edge cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAabb {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl CellAabb {
    /// Standard AABB overlap test; touching edges do not intersect.
    pub fn intersects(&self, other: &CellAabb) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Returns true if the cell `(x, y)` lies inside.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }
}
