//! Free ruler measurements between two arbitrary grid points.

use moonbase_core::{Error, Grid, GridPoint, MeasurementId, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Colour tag given to new measurements.
pub const DEFAULT_MEASUREMENT_COLOR: &str = "blue";

/// A finished measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    pub id: MeasurementId,
    pub start: GridPoint,
    pub end: GridPoint,
    /// Length in metres.
    pub distance_m: f64,
    pub color: String,
}

/// Two-click ruler: the first point is held until the second arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementEngine {
    grid: Grid,
    pending: Option<GridPoint>,
}

impl MeasurementEngine {
    /// Creates an idle engine.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            pending: None,
        }
    }

    /// Metric distance between two raw points.
    pub fn distance(&self, a: GridPoint, b: GridPoint) -> f64 {
        self.grid.scaled_distance(a, b)
    }

    /// Records the start point, replacing any measurement in progress.
    pub fn start_measurement(&mut self, p: GridPoint) -> Result<()> {
        check_point(p)?;
        self.pending = Some(p);
        Ok(())
    }

    /// Completes the measurement in progress.
    ///
    /// On error the pending start point is kept.
    pub fn finish_measurement(&mut self, id: MeasurementId, p: GridPoint) -> Result<Measurement> {
        check_point(p)?;
        let start = self
            .pending
            .ok_or_else(|| Error::InvalidInput("no measurement in progress".into()))?;
        self.pending = None;

        Ok(Measurement {
            id,
            start,
            end: p,
            distance_m: self.distance(start, p),
            color: DEFAULT_MEASUREMENT_COLOR.to_string(),
        })
    }

    /// Drops the measurement in progress.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Returns true while a start point is pending.
    pub fn is_measuring(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending start point, if any.
    pub fn pending_start(&self) -> Option<GridPoint> {
        self.pending
    }
}

fn check_point(p: GridPoint) -> Result<()> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "measurement point must be finite, got ({}, {})",
            p.x, p.y
        )))
    }
}
