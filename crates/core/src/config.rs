//! Site configuration.

use crate::error::{Error, Result};
use crate::grid::Grid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default grid side in cells.
pub const DEFAULT_GRID_SIZE: u32 = 20;

/// Default area of one cell in m².
pub const DEFAULT_CELL_SIZE: f64 = 10.0;

/// Default walking speed used for route time estimates, in metres per minute.
pub const DEFAULT_WALKING_SPEED: f64 = 80.0;

/// Default distance (in cells) within which a click closes a polygon.
pub const DEFAULT_CLOSURE_EPSILON: f64 = 1.0;

/// Configuration of a site layout session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SiteConfig {
    /// Number of cells along each axis.
    pub grid_size: u32,

    /// Real-world area of one cell in m².
    pub cell_size: f64,

    /// Walking speed for route time estimates (m/min).
    pub walking_speed: f64,

    /// A polygon drawing click closer than this to the first vertex closes it.
    pub closure_epsilon: f64,

    /// Whether auto-optimization keeps modules inside the enabled restriction zone.
    pub reflow_respects_zone: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            cell_size: DEFAULT_CELL_SIZE,
            walking_speed: DEFAULT_WALKING_SPEED,
            closure_epsilon: DEFAULT_CLOSURE_EPSILON,
            reflow_respects_zone: true,
        }
    }
}

impl SiteConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration whose grid covers `area_m2`.
    pub fn from_area(area_m2: f64, cell_size: f64) -> Result<Self> {
        let grid = Grid::from_area(area_m2, cell_size)?;
        Ok(Self::default()
            .with_grid_size(grid.size())
            .with_cell_size(cell_size))
    }

    /// Sets the grid side.
    pub fn with_grid_size(mut self, size: u32) -> Self {
        self.grid_size = size;
        self
    }

    /// Sets the cell area.
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Sets the walking speed in m/min.
    pub fn with_walking_speed(mut self, speed: f64) -> Self {
        self.walking_speed = speed;
        self
    }

    /// Sets the polygon closure distance.
    pub fn with_closure_epsilon(mut self, epsilon: f64) -> Self {
        self.closure_epsilon = epsilon;
        self
    }

    /// Sets whether reflow re-checks the restriction zone.
    pub fn with_reflow_respects_zone(mut self, respect: bool) -> Self {
        self.reflow_respects_zone = respect;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.grid()?;
        if !self.walking_speed.is_finite() || self.walking_speed <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "walking speed must be positive, got {}",
                self.walking_speed
            )));
        }
        if !self.closure_epsilon.is_finite() || self.closure_epsilon <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "closure epsilon must be positive, got {}",
                self.closure_epsilon
            )));
        }
        Ok(())
    }

    /// Builds the grid described by this configuration.
    pub fn grid(&self) -> Result<Grid> {
        Grid::new(self.grid_size, self.cell_size)
    }
}
