//! Restriction zones and containment predicates.
//!
//! A restriction zone is the buildable area of a site. When a zone is enabled,
//! a module may only be placed if its whole footprint lies inside it.

use crate::error::{Error, Result};
use crate::grid::{CellRect, Grid, GridPoint};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Returns true iff `((p.x-c.x)/rx)² + ((p.y-c.y)/ry)² ≤ 1`.
///
/// Radii must be positive; callers validate the zone first.
pub fn point_in_ellipse(p: GridPoint, center: GridPoint, radius_x: f64, radius_y: f64) -> bool {
    let nx = (p.x - center.x) / radius_x;
    let ny = (p.y - center.y) / radius_y;
    nx * nx + ny * ny <= 1.0
}

/// Even-odd ray casting test. Returns false for fewer than 3 vertices.
///
/// Points lying exactly on an edge may be classified either way depending on
/// edge direction; no special handling is applied.
pub fn point_in_polygon(p: GridPoint, polygon: &[GridPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Shape of the buildable area.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "shape", rename_all = "snake_case"))]
pub enum RestrictionZone {
    /// Axis-aligned ellipse centred on the grid centre, radii in cells.
    Ellipse { radius_x: f64, radius_y: f64 },
    /// Closed polygon in grid coordinates.
    Polygon { points: Vec<GridPoint> },
}

impl RestrictionZone {
    /// Ellipse with radii given directly in cells.
    pub fn ellipse(radius_x: f64, radius_y: f64) -> Self {
        Self::Ellipse { radius_x, radius_y }
    }

    /// Ellipse from a metric width and height: `r = extent / (2·sqrt(cell_size))`.
    pub fn ellipse_from_extent(width_m: f64, height_m: f64, cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "cell size must be a positive finite number, got {cell_size}"
            )));
        }
        let side = cell_size.sqrt();
        let zone = Self::Ellipse {
            radius_x: width_m / (2.0 * side),
            radius_y: height_m / (2.0 * side),
        };
        zone.validate()?;
        Ok(zone)
    }

    /// Polygon from an ordered list of vertices.
    pub fn polygon(points: Vec<GridPoint>) -> Self {
        Self::Polygon { points }
    }

    /// Checks that the shape can be used for containment tests.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Ellipse { radius_x, radius_y } => {
                let ok = |r: f64| r.is_finite() && r > 0.0;
                if !ok(*radius_x) || !ok(*radius_y) {
                    return Err(Error::InvalidZoneShape(format!(
                        "ellipse radii must be positive, got ({radius_x}, {radius_y})"
                    )));
                }
            }
            Self::Polygon { points } => {
                if points.len() < 3 {
                    return Err(Error::InvalidZoneShape(format!(
                        "polygon needs at least 3 points, got {}",
                        points.len()
                    )));
                }
                if points.iter().any(|p| !p.is_finite()) {
                    return Err(Error::InvalidZoneShape(
                        "polygon vertices must be finite".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Tests a single point against the zone on the given grid.
    pub fn contains_point(&self, p: GridPoint, grid: &Grid) -> bool {
        match self {
            Self::Ellipse { radius_x, radius_y } => {
                point_in_ellipse(p, grid.center(), *radius_x, *radius_y)
            }
            Self::Polygon { points } => point_in_polygon(p, points),
        }
    }
}

/// Returns true iff every lattice point of `rect` lies inside `zone`.
///
/// The lattice covers every occupied cell's origin and the far edges, which is
/// strictly stronger than testing the four corners alone.
pub fn footprint_in_zone(rect: &CellRect, zone: &RestrictionZone, grid: &Grid) -> bool {
    rect.lattice_points().all(|p| zone.contains_point(p, grid))
}
