//! Interactive restriction-zone drawing and zone metrics.
//!
//! Polygons are drawn click by click:
//!
//! ```text
//! Idle --start--> Drawing --click near first vertex / close--> Closed
//!                   ^  |
//!                   +--+ click (append vertex)
//! ```
//!
//! Ellipse zones need no state machine; see
//! [`RestrictionZone::ellipse_from_extent`].

use geo::{Area, Coord, LineString, Polygon as GeoPolygon};
use moonbase_core::{Error, Grid, GridPoint, RestrictionZone, Result, DEFAULT_CLOSURE_EPSILON};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State of the polygon drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing,
    Closed,
}

/// What a click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// A vertex was appended; holds the new vertex count.
    Added(usize),
    /// The click landed near the first vertex and closed the polygon.
    Closed(RestrictionZone),
}

/// Incremental polygon builder.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneDrawing {
    state: DrawingState,
    points: Vec<GridPoint>,
    epsilon: f64,
}

impl Default for ZoneDrawing {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneDrawing {
    /// Creates an idle tool with the default closure distance.
    pub fn new() -> Self {
        Self {
            state: DrawingState::Idle,
            points: Vec::new(),
            epsilon: DEFAULT_CLOSURE_EPSILON,
        }
    }

    /// Sets the distance below which a click closes the polygon.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Current tool state.
    pub fn state(&self) -> DrawingState {
        self.state
    }

    /// Vertices collected so far.
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// Enters `Drawing` with an empty vertex list.
    pub fn start(&mut self) {
        self.points.clear();
        self.state = DrawingState::Drawing;
    }

    /// Handles a click at `p`.
    ///
    /// With at least three vertices, a click strictly closer than epsilon to
    /// the first vertex closes the polygon instead of adding a vertex.
    pub fn click(&mut self, p: GridPoint) -> Result<ClickOutcome> {
        if self.state != DrawingState::Drawing {
            return Err(Error::InvalidInput(format!(
                "cannot add a vertex while {:?}",
                self.state
            )));
        }
        if !p.is_finite() {
            return Err(Error::InvalidInput(format!(
                "vertex must be finite, got ({}, {})",
                p.x, p.y
            )));
        }

        if let Some(first) = self.points.first() {
            if self.points.len() >= 3 && p.distance_to(*first) < self.epsilon {
                return self.close().map(ClickOutcome::Closed);
            }
        }

        self.points.push(p);
        Ok(ClickOutcome::Added(self.points.len()))
    }

    /// Closes the polygon explicitly.
    ///
    /// Fails with [`Error::InvalidZoneShape`] and stays in `Drawing` if fewer
    /// than three vertices were collected.
    pub fn close(&mut self) -> Result<RestrictionZone> {
        if self.state != DrawingState::Drawing {
            return Err(Error::InvalidInput(format!(
                "cannot close a polygon while {:?}",
                self.state
            )));
        }
        let zone = RestrictionZone::polygon(self.points.clone());
        zone.validate()?;
        self.state = DrawingState::Closed;
        Ok(zone)
    }

    /// The finished polygon, once closed.
    pub fn polygon(&self) -> Option<RestrictionZone> {
        match self.state {
            DrawingState::Closed => Some(RestrictionZone::polygon(self.points.clone())),
            _ => None,
        }
    }

    /// Discards all vertices and returns to `Idle`.
    pub fn reset(&mut self) {
        self.points.clear();
        self.state = DrawingState::Idle;
    }
}

/// Area of a polygon in square grid units (shoelace formula via `geo`).
pub fn polygon_area(points: &[GridPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let exterior = LineString::from(
        points
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect::<Vec<_>>(),
    );
    GeoPolygon::new(exterior, vec![]).unsigned_area()
}

/// Area of a zone in cells.
pub fn zone_area_cells(zone: &RestrictionZone) -> f64 {
    match zone {
        RestrictionZone::Ellipse { radius_x, radius_y } => {
            std::f64::consts::PI * radius_x * radius_y
        }
        RestrictionZone::Polygon { points } => polygon_area(points),
    }
}

/// Area of a zone in m².
pub fn zone_area_m2(zone: &RestrictionZone, grid: &Grid) -> f64 {
    zone_area_cells(zone) * grid.cell_size()
}

/// Cells whose origin lies inside the zone, row-major.
pub fn zone_cells(zone: &RestrictionZone, grid: &Grid) -> Vec<(i32, i32)> {
    grid.cells()
        .filter(|&(x, y)| zone.contains_point(GridPoint::new(f64::from(x), f64::from(y)), grid))
        .collect()
}
