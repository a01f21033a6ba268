//! # Moonbase Core
//!
//! Grid model, restriction-zone containment, and shared types for the Moonbase
//! lunar site layout engine.
//!
//! This crate holds the leaf components every higher layer builds on:
//!
//! - **Grid model**: [`Grid`], [`CellRect`], [`GridPoint`] - the bounded N×N
//!   coordinate space and its metric conversion
//! - **Zone containment**: [`RestrictionZone`], [`point_in_ellipse`],
//!   [`point_in_polygon`], [`footprint_in_zone`]
//! - **Configuration**: [`SiteConfig`]
//! - **Errors**: [`Error`], [`Result`], [`ValidationResult`]
//!
//! ## Example
//!
//! ```rust
//! use moonbase_core::{CellRect, Grid, RestrictionZone, footprint_in_zone};
//!
//! let grid = Grid::new(20, 10.0).unwrap();
//! let zone = RestrictionZone::ellipse(5.0, 5.0);
//!
//! assert!(grid.in_bounds(9, 9, 2, 2));
//! assert!(footprint_in_zone(&CellRect::new(9, 9, 2, 2), &zone, &grid));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod config;
pub mod error;
pub mod grid;
pub mod id;
pub mod zone;

// Re-exports
pub use config::{
    SiteConfig, DEFAULT_CELL_SIZE, DEFAULT_CLOSURE_EPSILON, DEFAULT_GRID_SIZE,
    DEFAULT_WALKING_SPEED,
};
pub use error::{Error, Result, ValidationResult};
pub use grid::{CellAabb, CellRect, Grid, GridPoint, MAX_GRID_SIZE};
pub use id::{IdAllocator, MeasurementId, ObjectId, RouteId};
pub use zone::{footprint_in_zone, point_in_ellipse, point_in_polygon, RestrictionZone};
