//! Greedy auto-optimization (reflow) of placed modules.
//!
//! Modules are re-inserted largest first, each at the first legal cell in
//! row-major order. This is a heuristic: it gives compact, deterministic
//! layouts but no packing optimality guarantee.

use crate::module::PlacedObject;
use crate::spatial_index::SpatialIndex;
use crate::validator::PlacementValidator;
use moonbase_core::{Grid, ObjectId, RestrictionZone, SiteConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a reflow pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReflowResult {
    /// Every input object, in placement order (largest footprint first).
    pub objects: Vec<PlacedObject>,

    /// Objects that found no legal cell and kept their previous position.
    pub unplaced: Vec<ObjectId>,

    /// Number of objects whose position changed.
    pub moved: usize,
}

impl ReflowResult {
    /// Returns true if every object found a legal cell.
    pub fn all_placed(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// Area-descending, row-major first-fit re-packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoOptimizer {
    respect_zone: bool,
}

impl Default for AutoOptimizer {
    fn default() -> Self {
        Self { respect_zone: true }
    }
}

impl AutoOptimizer {
    /// Creates an optimizer that keeps modules inside the enabled zone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an optimizer following the site configuration.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new().with_respect_zone(config.reflow_respects_zone)
    }

    /// Sets whether the restriction zone is re-checked during reflow.
    pub fn with_respect_zone(mut self, respect: bool) -> Self {
        self.respect_zone = respect;
        self
    }

    /// Returns whether the restriction zone is re-checked during reflow.
    pub fn respects_zone(&self) -> bool {
        self.respect_zone
    }

    /// Re-places every object; never drops one.
    ///
    /// `zone` is the enabled restriction zone, if any. It is ignored when the
    /// optimizer was configured not to respect it.
    pub fn reflow(
        &self,
        objects: &[PlacedObject],
        grid: &Grid,
        zone: Option<&RestrictionZone>,
    ) -> ReflowResult {
        let zone = if self.respect_zone { zone } else { None };
        let validator = PlacementValidator::new(*grid).with_zone(zone);

        // Stable sort: equal areas keep their input order.
        let mut order: Vec<&PlacedObject> = objects.iter().collect();
        order.sort_by(|a, b| b.area().cmp(&a.area()));

        let mut placed: Vec<PlacedObject> = Vec::with_capacity(objects.len());
        let mut index = SpatialIndex::new();
        let mut unplaced = Vec::new();
        let mut moved = 0;

        for obj in order {
            let slot = grid.cells().find(|&(x, y)| {
                validator
                    .can_place_indexed(x, y, obj.footprint, obj.clearance, &index)
                    .is_ok()
            });

            let next = match slot {
                Some((x, y)) => {
                    log::debug!("reflow: {} {} -> ({}, {})", obj.id, obj.label, x, y);
                    if (x, y) != (obj.x, obj.y) {
                        moved += 1;
                    }
                    obj.moved_to(x, y)
                }
                None => {
                    log::warn!(
                        "reflow: no legal cell for {} {}, keeping ({}, {})",
                        obj.id,
                        obj.label,
                        obj.x,
                        obj.y
                    );
                    unplaced.push(obj.id);
                    obj.clone()
                }
            };

            // Objects that kept their old position still block later ones.
            index.insert(placed.len(), &next);
            placed.push(next);
        }

        log::info!(
            "reflow finished: {} objects, {} moved, {} without a legal cell",
            placed.len(),
            moved,
            unplaced.len()
        );

        ReflowResult {
            objects: placed,
            unplaced,
            moved,
        }
    }
}
