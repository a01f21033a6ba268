//! # Moonbase Layout
//!
//! Module placement and site editing for the Moonbase lunar site layout engine.
//!
//! This crate builds on [`moonbase_core`] and provides the operations a site
//! planner performs on a grid of cells.
//!
//! ## Features
//!
//! - Catalog of fifteen standard module types with default footprints
//! - Placement validation (bounds, restriction zone, mutual clearance)
//! - R*-tree broad phase for collision queries
//! - Greedy auto-optimization that re-packs every module
//! - Straight-line routes with walking time estimates
//! - Free ruler measurements
//! - Polygon zone drawing with click-to-close
//! - Terrain tile lookup by cell
//! - Named project snapshots with JSON save/load
//!
//! ## Quick Start
//!
//! ```rust
//! use moonbase_layout::{ModuleKind, RestrictionZone, SiteConfig, SiteSession};
//!
//! let config = SiteConfig::new().with_grid_size(30).with_cell_size(10.0);
//! let mut site = SiteSession::new(config).unwrap();
//!
//! site.set_zone(RestrictionZone::ellipse(12.0, 12.0)).unwrap();
//! site.enable_zone(true).unwrap();
//!
//! let habitat = site.place_module(ModuleKind::ResidentialCommon, 12, 12).unwrap();
//! let clinic = site.place_module(ModuleKind::Medical, 20, 12).unwrap();
//! let route = site.add_route(habitat, clinic).unwrap();
//!
//! println!("walk: {} min", site.route_minutes(route).unwrap());
//!
//! let result = site.auto_optimize();
//! assert_eq!(result.objects.len(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialization of every data type and JSON project files

pub mod drawing;
pub mod measurement;
pub mod module;
pub mod optimizer;
pub mod route;
pub mod session;
pub mod spatial_index;
pub mod tiles;
pub mod validator;

// Re-exports
pub use drawing::{
    polygon_area, zone_area_cells, zone_area_m2, zone_cells, ClickOutcome, DrawingState,
    ZoneDrawing,
};
pub use measurement::{Measurement, MeasurementEngine, DEFAULT_MEASUREMENT_COLOR};
pub use module::{Footprint, ModuleKind, ModuleSpec, PlacedObject, PlacementRequest};
pub use optimizer::{AutoOptimizer, ReflowResult};
pub use route::{whole_minutes, Route, RouteEngine};
pub use session::{SiteSession, SiteSnapshot};
pub use spatial_index::{SpatialEntry, SpatialIndex};
pub use tiles::{GeoRange, LayerStats, PixelRange, TileArea, TileLayers, TileRecord, TileSet};
pub use validator::{clearance_conflict, PlacementValidator};
pub use moonbase_core::{
    footprint_in_zone, point_in_ellipse, point_in_polygon, CellRect, Error, Grid, GridPoint,
    MeasurementId, ObjectId, RestrictionZone, Result, RouteId, SiteConfig, ValidationResult,
};
