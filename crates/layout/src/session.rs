//! The site session: owner of all mutable layout state.
//!
//! Every mutating method validates first and only then commits, so a call
//! that returns `Err` leaves the session exactly as it was.

use crate::drawing::{self, ClickOutcome, ZoneDrawing};
use crate::measurement::{Measurement, MeasurementEngine};
use crate::module::{ModuleKind, PlacedObject, PlacementRequest};
use crate::optimizer::{AutoOptimizer, ReflowResult};
use crate::route::{Route, RouteEngine};
use crate::validator::PlacementValidator;
use moonbase_core::{
    Error, Grid, GridPoint, IdAllocator, MeasurementId, ObjectId, RestrictionZone, Result,
    RouteId, SiteConfig, ValidationResult,
};
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plain-data copy of a session, suitable for saving under a project name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SiteSnapshot {
    pub name: String,
    pub config: SiteConfig,
    pub objects: Vec<PlacedObject>,
    pub zone: Option<RestrictionZone>,
    pub zone_enabled: bool,
    pub routes: Vec<Route>,
    pub measurements: Vec<Measurement>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub object_ids: IdAllocator,
    #[cfg_attr(feature = "serde", serde(default))]
    pub route_ids: IdAllocator,
    #[cfg_attr(feature = "serde", serde(default))]
    pub measurement_ids: IdAllocator,
}

/// A lunar site layout being edited.
#[derive(Debug, Clone)]
pub struct SiteSession {
    config: SiteConfig,
    grid: Grid,
    objects: Vec<PlacedObject>,
    zone: Option<RestrictionZone>,
    zone_enabled: bool,
    routes: Vec<Route>,
    measurements: Vec<Measurement>,
    drawing: ZoneDrawing,
    ruler: MeasurementEngine,
    object_ids: IdAllocator,
    route_ids: IdAllocator,
    measurement_ids: IdAllocator,
}

impl SiteSession {
    /// Creates an empty session.
    pub fn new(config: SiteConfig) -> Result<Self> {
        config.validate()?;
        let grid = config.grid()?;
        Ok(Self {
            drawing: ZoneDrawing::new().with_epsilon(config.closure_epsilon),
            ruler: MeasurementEngine::new(grid),
            config,
            grid,
            objects: Vec::new(),
            zone: None,
            zone_enabled: false,
            routes: Vec::new(),
            measurements: Vec::new(),
            object_ids: IdAllocator::new(),
            route_ids: IdAllocator::new(),
            measurement_ids: IdAllocator::new(),
        })
    }

    /// The active site configuration.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The grid derived from the configuration.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Placed objects in placement order.
    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    /// Routes in creation order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Stored measurements in creation order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Replaces the configuration.
    ///
    /// Objects keep their cells even if they no longer fit the new grid;
    /// route lengths are recomputed for the new cell size.
    pub fn update_config(&mut self, config: SiteConfig) -> Result<()> {
        config.validate()?;
        let grid = config.grid()?;

        self.drawing = self.drawing.clone().with_epsilon(config.closure_epsilon);
        self.ruler = MeasurementEngine::new(grid);
        self.config = config;
        self.grid = grid;
        self.refresh_routes();
        Ok(())
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Validator for the current grid and enabled zone.
    pub fn validator(&self) -> PlacementValidator<'_> {
        PlacementValidator::new(self.grid).with_zone(self.active_zone())
    }

    /// Checks whether `request` could be placed at `(x, y)` without placing it.
    pub fn check_placement(&self, request: &PlacementRequest, x: i32, y: i32) -> ValidationResult {
        self.validator()
            .can_place(x, y, request.footprint, request.clearance, &self.objects)
    }

    /// Places a module and returns its new id.
    pub fn place(&mut self, request: PlacementRequest, x: i32, y: i32) -> Result<ObjectId> {
        self.check_placement(&request, x, y)?;

        let id = ObjectId::new(self.object_ids.allocate()?);
        log::debug!("placed {} {} at ({}, {})", id, request.label, x, y);
        self.objects
            .push(PlacedObject::from_request(id, request, x, y));
        Ok(id)
    }

    /// Places a catalog module with its default footprint and clearance.
    pub fn place_module(&mut self, kind: ModuleKind, x: i32, y: i32) -> Result<ObjectId> {
        self.place(PlacementRequest::new(kind), x, y)
    }

    /// Looks up a placed object by id.
    pub fn object(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.iter().find(|obj| obj.id == id)
    }

    /// The object whose body covers the cell `(x, y)`.
    pub fn object_at(&self, x: i32, y: i32) -> Option<&PlacedObject> {
        self.objects.iter().find(|obj| obj.rect().contains_cell(x, y))
    }

    /// Deletes an object together with every route touching it.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<PlacedObject> {
        let index = self.object_index(id)?;
        let removed = self.objects.remove(index);

        let before = self.routes.len();
        self.routes.retain(|route| !route.touches(id));
        log::debug!(
            "removed {} {} and {} route(s)",
            id,
            removed.label,
            before - self.routes.len()
        );
        Ok(removed)
    }

    /// Moves an object, revalidating against every other object.
    pub fn move_object(&mut self, id: ObjectId, x: i32, y: i32) -> Result<()> {
        let index = self.object_index(id)?;
        let obj = &self.objects[index];
        self.validator().can_place_excluding(
            x,
            y,
            obj.footprint,
            obj.clearance,
            &self.objects,
            id,
        )?;

        let moved = obj.moved_to(x, y);
        log::debug!("moved {} to ({}, {})", id, x, y);
        self.objects[index] = moved;
        self.refresh_routes();
        Ok(())
    }

    /// Re-packs every object; routes follow their endpoints.
    pub fn auto_optimize(&mut self) -> ReflowResult {
        let result = AutoOptimizer::from_config(&self.config).reflow(
            &self.objects,
            &self.grid,
            self.active_zone(),
        );
        self.objects = result.objects.clone();
        self.refresh_routes();
        result
    }

    // ========================================================================
    // Routes
    // ========================================================================

    fn route_engine(&self) -> RouteEngine {
        RouteEngine::new(self.grid).with_walking_speed(self.config.walking_speed)
    }

    /// Creates a route between two placed objects.
    pub fn add_route(&mut self, start: ObjectId, end: ObjectId) -> Result<RouteId> {
        let a = self.object_ref(start)?;
        let b = self.object_ref(end)?;
        let id = RouteId::new(self.route_ids.peek());
        let route = self.route_engine().compute_route(id, a, b)?;

        self.route_ids.allocate()?;
        log::debug!("route {} {} -> {}: {:.1} m", id, start, end, route.distance_m);
        self.routes.push(route);
        Ok(id)
    }

    /// Looks up a route by id.
    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.iter().find(|route| route.id == id)
    }

    /// Deletes a route; its endpoints stay placed.
    pub fn remove_route(&mut self, id: RouteId) -> Result<Route> {
        let index = self
            .routes
            .iter()
            .position(|route| route.id == id)
            .ok_or(Error::NotFound {
                kind: "route",
                id: id.get(),
            })?;
        Ok(self.routes.remove(index))
    }

    /// Display minutes of a route at the configured walking speed.
    pub fn route_minutes(&self, id: RouteId) -> Result<u64> {
        self.route(id)
            .map(|route| route.display_minutes(self.config.walking_speed))
            .ok_or(Error::NotFound {
                kind: "route",
                id: id.get(),
            })
    }

    fn refresh_routes(&mut self) {
        let engine = self.route_engine();
        let objects = &self.objects;
        for route in &mut self.routes {
            let a = objects.iter().find(|obj| obj.id == route.start);
            let b = objects.iter().find(|obj| obj.id == route.end);
            if let (Some(a), Some(b)) = (a, b) {
                engine.refresh(route, a, b);
            }
        }
    }

    // ========================================================================
    // Measurements
    // ========================================================================

    /// Records the first point of a new measurement.
    pub fn start_measurement(&mut self, p: GridPoint) -> Result<()> {
        self.ruler.start_measurement(p)
    }

    /// Finishes the pending measurement and stores it.
    pub fn finish_measurement(&mut self, p: GridPoint) -> Result<MeasurementId> {
        let id = MeasurementId::new(self.measurement_ids.peek());
        let measurement = self.ruler.finish_measurement(id, p)?;

        self.measurement_ids.allocate()?;
        self.measurements.push(measurement);
        Ok(id)
    }

    /// Drops the pending first point, if any.
    pub fn cancel_measurement(&mut self) {
        self.ruler.cancel();
    }

    /// Returns true while a first point is pending.
    pub fn is_measuring(&self) -> bool {
        self.ruler.is_measuring()
    }

    /// Looks up a stored measurement by id.
    pub fn measurement(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id == id)
    }

    /// Deletes a stored measurement.
    pub fn remove_measurement(&mut self, id: MeasurementId) -> Result<Measurement> {
        let index = self.measurement_index(id)?;
        Ok(self.measurements.remove(index))
    }

    /// Retags a measurement; the colour must not be blank.
    pub fn set_measurement_color(&mut self, id: MeasurementId, color: &str) -> Result<()> {
        if color.trim().is_empty() {
            return Err(Error::InvalidInput("colour tag must not be empty".into()));
        }
        let index = self.measurement_index(id)?;
        self.measurements[index].color = color.to_string();
        Ok(())
    }

    // ========================================================================
    // Restriction zone
    // ========================================================================

    /// The stored zone, whether or not it is enabled.
    pub fn zone(&self) -> Option<&RestrictionZone> {
        self.zone.as_ref()
    }

    /// Returns true if placement is confined to the stored zone.
    pub fn zone_enabled(&self) -> bool {
        self.zone_enabled
    }

    /// The zone placement is checked against, if any.
    pub fn active_zone(&self) -> Option<&RestrictionZone> {
        self.zone.as_ref().filter(|_| self.zone_enabled)
    }

    /// Replaces the stored zone; the enabled flag is unchanged.
    ///
    /// Existing objects are not re-checked against the new shape.
    pub fn set_zone(&mut self, zone: RestrictionZone) -> Result<()> {
        zone.validate()?;
        self.zone = Some(zone);
        Ok(())
    }

    /// Sets an ellipse zone from its metric width and height.
    pub fn set_ellipse_zone(&mut self, width_m: f64, height_m: f64) -> Result<()> {
        let zone = RestrictionZone::ellipse_from_extent(width_m, height_m, self.config.cell_size)?;
        self.set_zone(zone)
    }

    /// Removes the zone and disables containment.
    pub fn clear_zone(&mut self) {
        self.zone = None;
        self.zone_enabled = false;
    }

    /// Toggles containment; enabling requires a stored zone.
    pub fn enable_zone(&mut self, enabled: bool) -> Result<()> {
        if enabled && self.zone.is_none() {
            return Err(Error::InvalidInput("no restriction zone defined".into()));
        }
        self.zone_enabled = enabled;
        Ok(())
    }

    /// Area of the stored zone in m².
    pub fn zone_area_m2(&self) -> Option<f64> {
        self.zone
            .as_ref()
            .map(|zone| drawing::zone_area_m2(zone, &self.grid))
    }

    /// Cells inside the stored zone, row-major; empty when no zone is stored.
    pub fn zone_cells(&self) -> Vec<(i32, i32)> {
        match &self.zone {
            Some(zone) => drawing::zone_cells(zone, &self.grid),
            None => Vec::new(),
        }
    }

    /// The polygon drawing tool.
    pub fn drawing(&self) -> &ZoneDrawing {
        &self.drawing
    }

    /// Starts drawing a new polygon zone.
    pub fn start_polygon(&mut self) {
        self.drawing.start();
    }

    /// Feeds a click to the polygon tool; closing activates the polygon.
    pub fn polygon_click(&mut self, p: GridPoint) -> Result<ClickOutcome> {
        let outcome = self.drawing.click(p)?;
        if let ClickOutcome::Closed(zone) = &outcome {
            self.activate_polygon(zone.clone());
        }
        Ok(outcome)
    }

    /// Closes the polygon being drawn and activates it.
    pub fn close_polygon(&mut self) -> Result<()> {
        let zone = self.drawing.close()?;
        self.activate_polygon(zone);
        Ok(())
    }

    /// Discards the polygon being drawn; the stored zone is unchanged.
    pub fn cancel_polygon(&mut self) {
        self.drawing.reset();
    }

    fn activate_polygon(&mut self, zone: RestrictionZone) {
        log::debug!("polygon zone closed, {:.1} m²", drawing::zone_area_m2(&zone, &self.grid));
        self.zone = Some(zone);
        self.zone_enabled = true;
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Captures the persistent state under `name`.
    pub fn snapshot(&self, name: impl Into<String>) -> SiteSnapshot {
        SiteSnapshot {
            name: name.into(),
            config: self.config.clone(),
            objects: self.objects.clone(),
            zone: self.zone.clone(),
            zone_enabled: self.zone_enabled,
            routes: self.routes.clone(),
            measurements: self.measurements.clone(),
            object_ids: self.object_ids.clone(),
            route_ids: self.route_ids.clone(),
            measurement_ids: self.measurement_ids.clone(),
        }
    }

    /// Builds a session from a snapshot.
    ///
    /// Transient tool state (polygon drawing, pending ruler point) starts idle.
    pub fn from_snapshot(snapshot: SiteSnapshot) -> Result<Self> {
        let mut session = Self::new(snapshot.config)?;

        if let Some(zone) = &snapshot.zone {
            zone.validate()?;
        } else if snapshot.zone_enabled {
            return Err(Error::InvalidInput(
                "snapshot enables a zone but defines none".into(),
            ));
        }

        let mut seen = HashSet::new();
        for obj in &snapshot.objects {
            obj.footprint.validate()?;
            if !seen.insert(obj.id) {
                return Err(Error::InvalidInput(format!("duplicate object id {}", obj.id)));
            }
        }

        let mut route_ids = HashSet::new();
        for route in &snapshot.routes {
            if !route_ids.insert(route.id) {
                return Err(Error::InvalidInput(format!("duplicate route id {}", route.id)));
            }
            if route.start == route.end {
                return Err(Error::InvalidInput(format!(
                    "route {} starts and ends at {}",
                    route.id, route.start
                )));
            }
            if !seen.contains(&route.start) || !seen.contains(&route.end) {
                return Err(Error::InvalidInput(format!(
                    "route {} references a missing object",
                    route.id
                )));
            }
        }

        let mut measurement_ids = HashSet::new();
        for m in &snapshot.measurements {
            if !measurement_ids.insert(m.id) {
                return Err(Error::InvalidInput(format!("duplicate measurement id {}", m.id)));
            }
        }

        session.object_ids = snapshot.object_ids;
        session.route_ids = snapshot.route_ids;
        session.measurement_ids = snapshot.measurement_ids;
        for obj in &snapshot.objects {
            session.object_ids.observe(obj.id.get())?;
        }
        for route in &snapshot.routes {
            session.route_ids.observe(route.id.get())?;
        }
        for m in &snapshot.measurements {
            session.measurement_ids.observe(m.id.get())?;
        }

        session.objects = snapshot.objects;
        session.zone = snapshot.zone;
        session.zone_enabled = snapshot.zone_enabled;
        session.routes = snapshot.routes;
        session.measurements = snapshot.measurements;

        log::info!(
            "loaded project '{}': {} objects, {} routes, {} measurements",
            snapshot.name,
            session.objects.len(),
            session.routes.len(),
            session.measurements.len()
        );
        Ok(session)
    }

    /// Replaces the whole session state with `snapshot`.
    pub fn restore(&mut self, snapshot: SiteSnapshot) -> Result<()> {
        *self = Self::from_snapshot(snapshot)?;
        Ok(())
    }

    /// Serializes a named snapshot to JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self, name: &str) -> Result<String> {
        serde_json::to_string_pretty(&self.snapshot(name))
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Loads a session from JSON produced by [`to_json`](Self::to_json).
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SiteSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    // ========================================================================
    // Lookup helpers
    // ========================================================================

    fn object_index(&self, id: ObjectId) -> Result<usize> {
        self.objects
            .iter()
            .position(|obj| obj.id == id)
            .ok_or(Error::NotFound {
                kind: "object",
                id: id.get(),
            })
    }

    fn object_ref(&self, id: ObjectId) -> Result<&PlacedObject> {
        self.object(id).ok_or(Error::NotFound {
            kind: "object",
            id: id.get(),
        })
    }

    fn measurement_index(&self, id: MeasurementId) -> Result<usize> {
        self.measurements
            .iter()
            .position(|m| m.id == id)
            .ok_or(Error::NotFound {
                kind: "measurement",
                id: id.get(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::DrawingState;
    use approx::assert_relative_eq;

    fn session(n: u32, cell_size: f64) -> SiteSession {
        SiteSession::new(
            SiteConfig::new()
                .with_grid_size(n)
                .with_cell_size(cell_size),
        )
        .unwrap()
    }

    fn small(w: u32, h: u32, clearance: u32) -> PlacementRequest {
        PlacementRequest::new(ModuleKind::Research)
            .with_footprint(w, h)
            .with_clearance(clearance)
    }

    #[test]
    fn test_place_and_reject() {
        let mut site = session(10, 1.0);
        let a = site.place(small(2, 2, 1), 0, 0).unwrap();
        assert_eq!(a, ObjectId::new(1));

        let err = site.place(small(1, 1, 0), 2, 2).unwrap_err();
        assert_eq!(err, Error::TooCloseTo(a));
        assert_eq!(site.objects().len(), 1);

        let err = site.place(small(2, 2, 0), 9, 9).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
        assert_eq!(site.objects().len(), 1);
    }

    #[test]
    fn test_place_module_uses_catalog() {
        let mut site = session(20, 10.0);
        let id = site.place_module(ModuleKind::Solar, 0, 0).unwrap();
        let obj = site.object(id).unwrap();
        assert_eq!((obj.footprint.width, obj.footprint.height), (5, 3));
        assert_eq!(obj.clearance, 2);
    }

    #[test]
    fn test_ids_not_reused() {
        let mut site = session(10, 1.0);
        let a = site.place(small(1, 1, 0), 0, 0).unwrap();
        site.remove_object(a).unwrap();
        let b = site.place(small(1, 1, 0), 0, 0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_prunes_routes() {
        let mut site = session(20, 1.0);
        let a = site.place(small(1, 1, 0), 0, 0).unwrap();
        let b = site.place(small(1, 1, 0), 5, 0).unwrap();
        let c = site.place(small(1, 1, 0), 10, 0).unwrap();
        site.add_route(a, b).unwrap();
        let keep = site.add_route(b, c).unwrap();

        site.remove_object(a).unwrap();
        assert_eq!(site.routes().len(), 1);
        assert_eq!(site.routes()[0].id, keep);

        assert!(matches!(
            site.remove_object(a),
            Err(Error::NotFound { kind: "object", .. })
        ));
    }

    #[test]
    fn test_move_updates_routes() {
        let mut site = session(20, 1.0);
        let a = site.place(small(2, 2, 1), 0, 0).unwrap();
        let b = site.place(small(2, 2, 1), 3, 4).unwrap();
        let route = site.add_route(a, b).unwrap();
        assert_relative_eq!(site.route(route).unwrap().distance_m, 5.0, epsilon = 1e-12);

        site.move_object(b, 0, 6).unwrap();
        assert_relative_eq!(site.route(route).unwrap().distance_m, 6.0, epsilon = 1e-12);

        // Overlapping `a` is rejected and nothing changes.
        assert!(site.move_object(b, 1, 1).is_err());
        let obj = site.object(b).unwrap();
        assert_eq!((obj.x, obj.y), (0, 6));
    }

    #[test]
    fn test_move_within_own_clearance() {
        let mut site = session(10, 1.0);
        let a = site.place(small(2, 2, 1), 0, 0).unwrap();
        site.move_object(a, 1, 0).unwrap();
        assert_eq!(site.object(a).unwrap().x, 1);
    }

    #[test]
    fn test_object_at() {
        let mut site = session(10, 1.0);
        let a = site.place(small(2, 3, 0), 4, 4).unwrap();
        assert_eq!(site.object_at(5, 6).map(|o| o.id), Some(a));
        assert!(site.object_at(6, 4).is_none());
    }

    #[test]
    fn test_zone_toggle() {
        let mut site = session(20, 1.0);
        assert!(site.enable_zone(true).is_err());

        site.set_zone(RestrictionZone::ellipse(5.0, 5.0)).unwrap();
        assert!(site.active_zone().is_none());
        assert!(site.place(small(2, 2, 0), 0, 0).is_ok());

        site.enable_zone(true).unwrap();
        assert_eq!(
            site.place(small(2, 2, 0), 16, 16),
            Err(Error::OutsideActiveZone)
        );
        assert!(site.place(small(2, 2, 0), 9, 9).is_ok());

        assert!(site.set_zone(RestrictionZone::ellipse(0.0, 1.0)).is_err());
        assert_eq!(site.zone(), Some(&RestrictionZone::ellipse(5.0, 5.0)));
    }

    #[test]
    fn test_polygon_drawing_activates_zone() {
        let mut site = session(20, 10.0);
        site.start_polygon();
        for (x, y) in [(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)] {
            site.polygon_click(GridPoint::new(x, y)).unwrap();
        }
        assert!(site.zone().is_none());

        let outcome = site.polygon_click(GridPoint::new(0.5, 0.5)).unwrap();
        assert!(matches!(outcome, ClickOutcome::Closed(_)));
        assert!(site.zone_enabled());
        assert_relative_eq!(site.zone_area_m2().unwrap(), 125.0, epsilon = 1e-9);
    }

    #[test]
    fn test_close_polygon_too_few_points() {
        let mut site = session(20, 10.0);
        site.start_polygon();
        site.polygon_click(GridPoint::new(0.0, 0.0)).unwrap();
        assert!(matches!(
            site.close_polygon(),
            Err(Error::InvalidZoneShape(_))
        ));
        assert!(site.zone().is_none());
    }

    #[test]
    fn test_measurements() {
        let mut site = session(20, 1.0);
        site.start_measurement(GridPoint::new(0.0, 0.0)).unwrap();
        let id = site.finish_measurement(GridPoint::new(3.0, 4.0)).unwrap();
        assert_relative_eq!(site.measurement(id).unwrap().distance_m, 5.0, epsilon = 1e-12);

        site.set_measurement_color(id, "red").unwrap();
        assert_eq!(site.measurement(id).unwrap().color, "red");
        assert!(site.set_measurement_color(id, " ").is_err());

        site.remove_measurement(id).unwrap();
        assert!(site.measurements().is_empty());
        assert!(site.remove_measurement(id).is_err());
    }

    #[test]
    fn test_cancel_measurement() {
        let mut site = session(20, 1.0);
        site.start_measurement(GridPoint::new(0.0, 0.0)).unwrap();
        assert!(site.is_measuring());

        site.cancel_measurement();
        assert!(!site.is_measuring());
        assert!(site.finish_measurement(GridPoint::new(1.0, 1.0)).is_err());
        assert!(site.measurements().is_empty());
    }

    #[test]
    fn test_remove_route_keeps_objects() {
        let mut site = session(20, 1.0);
        let a = site.place(small(1, 1, 0), 0, 0).unwrap();
        let b = site.place(small(1, 1, 0), 5, 0).unwrap();
        let route = site.add_route(a, b).unwrap();

        assert_eq!(site.remove_route(route).unwrap().id, route);
        assert!(site.routes().is_empty());
        assert_eq!(site.objects().len(), 2);
        assert!(matches!(
            site.remove_route(route),
            Err(Error::NotFound { kind: "route", .. })
        ));
    }

    #[test]
    fn test_cancel_polygon_keeps_stored_zone() {
        let mut site = session(20, 10.0);
        site.set_zone(RestrictionZone::ellipse(5.0, 5.0)).unwrap();
        site.start_polygon();
        site.polygon_click(GridPoint::new(0.0, 0.0)).unwrap();
        site.polygon_click(GridPoint::new(5.0, 0.0)).unwrap();

        site.cancel_polygon();
        assert_eq!(site.drawing().state(), DrawingState::Idle);
        assert!(site.drawing().points().is_empty());
        assert_eq!(site.zone(), Some(&RestrictionZone::ellipse(5.0, 5.0)));
    }

    #[test]
    fn test_failed_finish_does_not_consume_id() {
        let mut site = session(20, 1.0);
        assert!(site.finish_measurement(GridPoint::new(1.0, 1.0)).is_err());
        site.start_measurement(GridPoint::new(0.0, 0.0)).unwrap();
        let id = site.finish_measurement(GridPoint::new(1.0, 0.0)).unwrap();
        assert_eq!(id, MeasurementId::new(1));
    }

    #[test]
    fn test_auto_optimize_keeps_routes_consistent() {
        let mut site = session(20, 1.0);
        let a = site.place(small(1, 1, 0), 10, 10).unwrap();
        let b = site.place(small(2, 2, 0), 15, 15).unwrap();
        let route = site.add_route(a, b).unwrap();

        let result = site.auto_optimize();
        assert!(result.all_placed());

        let (oa, ob) = (site.object(a).unwrap(), site.object(b).unwrap());
        assert_eq!((ob.x, ob.y), (0, 0));
        assert_eq!((oa.x, oa.y), (2, 0));

        // Centres (2.5, 0.5) and (1, 1).
        let expected = (1.5f64 * 1.5 + 0.5 * 0.5).sqrt();
        assert_relative_eq!(site.route(route).unwrap().distance_m, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_update_config_keeps_objects() {
        let mut site = session(20, 1.0);
        let a = site.place(small(1, 1, 0), 0, 0).unwrap();
        let b = site.place(small(1, 1, 0), 3, 4).unwrap();
        let route = site.add_route(a, b).unwrap();

        let config = site.config().clone().with_cell_size(4.0);
        site.update_config(config).unwrap();
        assert_eq!(site.object(b).map(|o| (o.x, o.y)), Some((3, 4)));
        assert_relative_eq!(site.route(route).unwrap().distance_m, 10.0, epsilon = 1e-12);

        let config = site.config().clone().with_grid_size(0);
        assert!(site.update_config(config).is_err());
        assert_eq!(site.grid().cell_size(), 4.0);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut site = session(20, 1.0);
        let a = site.place(small(1, 1, 0), 0, 0).unwrap();
        let b = site.place(small(1, 1, 0), 3, 4).unwrap();
        site.add_route(a, b).unwrap();
        site.set_zone(RestrictionZone::ellipse(9.0, 9.0)).unwrap();

        let snapshot = site.snapshot("rim");
        site.remove_object(a).unwrap();
        site.clear_zone();

        site.restore(snapshot).unwrap();
        assert_eq!(site.objects().len(), 2);
        assert_eq!(site.routes().len(), 1);
        assert!(site.zone().is_some());

        let c = site.place(small(1, 1, 0), 10, 10).unwrap();
        assert_eq!(c, ObjectId::new(3));
    }

    #[test]
    fn test_restore_rejects_dangling_route() {
        let mut site = session(20, 1.0);
        let a = site.place(small(1, 1, 0), 0, 0).unwrap();
        let b = site.place(small(1, 1, 0), 3, 4).unwrap();
        site.add_route(a, b).unwrap();

        let mut snapshot = site.snapshot("broken");
        snapshot.objects.retain(|obj| obj.id != a);
        assert!(matches!(
            site.restore(snapshot),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(site.objects().len(), 2);
    }

    #[test]
    fn test_restore_rejects_duplicate_route_ids() {
        let mut site = session(20, 1.0);
        let a = site.place(small(1, 1, 0), 0, 0).unwrap();
        let b = site.place(small(1, 1, 0), 3, 4).unwrap();
        site.add_route(a, b).unwrap();
        site.add_route(b, a).unwrap();

        let mut snapshot = site.snapshot("twins");
        snapshot.routes[1].id = snapshot.routes[0].id;
        assert!(matches!(
            SiteSession::from_snapshot(snapshot),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_restore_rejects_self_route() {
        let mut site = session(20, 1.0);
        let a = site.place(small(1, 1, 0), 0, 0).unwrap();
        let b = site.place(small(1, 1, 0), 3, 4).unwrap();
        site.add_route(a, b).unwrap();

        let mut snapshot = site.snapshot("loop");
        snapshot.routes[0].end = a;
        assert!(matches!(
            SiteSession::from_snapshot(snapshot),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_restore_rejects_duplicate_measurement_ids() {
        let mut site = session(20, 1.0);
        for x in [3.0, 6.0] {
            site.start_measurement(GridPoint::new(0.0, 0.0)).unwrap();
            site.finish_measurement(GridPoint::new(x, 0.0)).unwrap();
        }

        let mut snapshot = site.snapshot("twins");
        snapshot.measurements[1].id = snapshot.measurements[0].id;
        assert!(matches!(
            SiteSession::from_snapshot(snapshot),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_place_fails_when_ids_run_out() {
        let mut site = session(20, 1.0);
        site.place(small(1, 1, 0), 0, 0).unwrap();

        let mut snapshot = site.snapshot("full");
        snapshot.objects[0].id = ObjectId::new(u64::MAX - 1);
        let mut site = SiteSession::from_snapshot(snapshot).unwrap();

        assert!(matches!(
            site.place(small(1, 1, 0), 5, 5),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(site.objects().len(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_with_max_object_id_is_rejected() {
        let mut site = session(20, 1.0);
        site.place(small(1, 1, 0), 0, 0).unwrap();

        let json = site.to_json("overflow").unwrap();
        assert!(json.contains("\"id\": 1"));
        let json = json.replace("\"id\": 1", "\"id\": 18446744073709551615");

        assert!(matches!(
            SiteSession::from_json(&json),
            Err(Error::InvalidInput(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let mut site = session(20, 10.0);
        let a = site.place_module(ModuleKind::Medical, 0, 0).unwrap();
        let b = site.place_module(ModuleKind::Repair, 10, 10).unwrap();
        site.add_route(a, b).unwrap();
        site.start_measurement(GridPoint::new(0.5, 0.5)).unwrap();
        site.finish_measurement(GridPoint::new(7.25, 3.0)).unwrap();
        site.set_zone(RestrictionZone::ellipse(9.5, 8.0)).unwrap();
        site.enable_zone(true).unwrap();

        let json = site.to_json("crater").unwrap();
        let loaded = SiteSession::from_json(&json).unwrap();

        assert_eq!(loaded.objects(), site.objects());
        assert_eq!(loaded.routes(), site.routes());
        assert_eq!(loaded.measurements(), site.measurements());
        assert_eq!(loaded.zone(), site.zone());
        assert!(loaded.zone_enabled());
        assert_eq!(loaded.config(), site.config());

        assert!(matches!(
            SiteSession::from_json("not json"),
            Err(Error::Serialization(_))
        ));
    }
}
