//! Placement validation.
//!
//! A candidate is checked in a fixed order and the first failure wins:
//!
//! 1. Preconditions (non-empty footprint, usable zone shape)
//! 2. Grid bounds
//! 3. Containment in the enabled restriction zone
//! 4. Clearance collision against every existing object
//!
//! Collision compares the candidate footprint grown by its own clearance with
//! each existing footprint grown by *that* object's clearance, so two modules
//! with clearances `c1` and `c2` end up at least `c1 + c2` cells apart.

use crate::module::{Footprint, PlacedObject};
use crate::spatial_index::SpatialIndex;
use moonbase_core::{
    footprint_in_zone, CellRect, Error, Grid, ObjectId, RestrictionZone, Result,
    ValidationResult,
};

/// Returns true if the clearance-expanded boxes of `rect` and `other` overlap.
pub fn clearance_conflict(rect: &CellRect, clearance: u32, other: &PlacedObject) -> bool {
    rect.expanded(clearance)
        .intersects(&other.rect().expanded(other.clearance))
}

/// Stateless placement checker for one grid and an optional enabled zone.
///
/// Results depend only on the arguments, so repeated calls with identical
/// inputs always agree.
#[derive(Debug, Clone, Copy)]
pub struct PlacementValidator<'a> {
    grid: Grid,
    zone: Option<&'a RestrictionZone>,
}

impl<'a> PlacementValidator<'a> {
    /// Creates a validator with no restriction zone.
    pub fn new(grid: Grid) -> Self {
        Self { grid, zone: None }
    }

    /// Sets the enabled restriction zone (`None` disables containment).
    pub fn with_zone(mut self, zone: Option<&'a RestrictionZone>) -> Self {
        self.zone = zone;
        self
    }

    /// Returns the grid this validator checks against.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Checks a candidate against a slice of existing objects.
    pub fn can_place(
        &self,
        x: i32,
        y: i32,
        footprint: Footprint,
        clearance: u32,
        existing: &[PlacedObject],
    ) -> ValidationResult {
        self.can_place_filtered(x, y, footprint, clearance, existing, None)
    }

    /// Like [`can_place`](Self::can_place) but ignores the object `skip`.
    ///
    /// Used when moving an object so that it does not collide with itself.
    pub fn can_place_excluding(
        &self,
        x: i32,
        y: i32,
        footprint: Footprint,
        clearance: u32,
        existing: &[PlacedObject],
        skip: ObjectId,
    ) -> ValidationResult {
        self.can_place_filtered(x, y, footprint, clearance, existing, Some(skip))
    }

    /// Checks a candidate using an R*-tree over the existing objects.
    ///
    /// Returns the same result as [`can_place`](Self::can_place) on the
    /// collection the index was built from.
    pub fn can_place_indexed(
        &self,
        x: i32,
        y: i32,
        footprint: Footprint,
        clearance: u32,
        index: &SpatialIndex,
    ) -> ValidationResult {
        let rect = self.check_site(x, y, footprint)?;
        match index.first_conflict(&rect.expanded(clearance)) {
            Some(entry) => Err(Error::TooCloseTo(entry.id)),
            None => Ok(()),
        }
    }

    /// Returns true if `rect` lies inside the enabled zone, or no zone is enabled.
    pub fn in_zone(&self, rect: &CellRect) -> bool {
        match self.zone {
            Some(zone) => footprint_in_zone(rect, zone, &self.grid),
            None => true,
        }
    }

    fn can_place_filtered(
        &self,
        x: i32,
        y: i32,
        footprint: Footprint,
        clearance: u32,
        existing: &[PlacedObject],
        skip: Option<ObjectId>,
    ) -> ValidationResult {
        let rect = self.check_site(x, y, footprint)?;

        let conflict = existing
            .iter()
            .filter(|obj| Some(obj.id) != skip)
            .find(|obj| clearance_conflict(&rect, clearance, obj));

        match conflict {
            Some(obj) => Err(Error::TooCloseTo(obj.id)),
            None => Ok(()),
        }
    }

    /// Preconditions, bounds and containment; collision is left to the caller.
    fn check_site(&self, x: i32, y: i32, footprint: Footprint) -> Result<CellRect> {
        footprint.validate()?;
        if let Some(zone) = self.zone {
            zone.validate()?;
        }

        if !self.grid.in_bounds(x, y, footprint.width, footprint.height) {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: footprint.width,
                height: footprint.height,
            });
        }

        let rect = footprint.at(x, y);
        if !self.in_zone(&rect) {
            return Err(Error::OutsideActiveZone);
        }
        Ok(rect)
    }
}
