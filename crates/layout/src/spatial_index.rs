//! Spatial indexing of clearance zones using an R*-tree.
//!
//! The index is a broad phase only: the R*-tree treats touching envelopes as
//! intersecting, so every hit is confirmed with the half-open
//! [`CellAabb::intersects`] test before it counts as a conflict.

use crate::module::PlacedObject;
use moonbase_core::{CellAabb, ObjectId};
use rstar::{RTree, RTreeObject, AABB};

/// An entry in the index: one placed object's clearance-expanded box.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialEntry {
    /// Position of the object in the owning collection.
    pub order: usize,
    /// Object identifier.
    pub id: ObjectId,
    /// Footprint grown by the object's own clearance.
    pub zone: CellAabb,
}

impl SpatialEntry {
    /// Creates an entry for `object` at position `order` of its collection.
    pub fn from_object(order: usize, object: &PlacedObject) -> Self {
        Self {
            order,
            id: object.id,
            zone: object.rect().expanded(object.clearance),
        }
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.zone.min_x, self.zone.min_y],
            [self.zone.max_x, self.zone.max_y],
        )
    }
}

/// R*-tree over placed objects' clearance zones.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-loads an index over `objects`, preserving their order.
    pub fn from_objects(objects: &[PlacedObject]) -> Self {
        let entries = objects
            .iter()
            .enumerate()
            .map(|(order, obj)| SpatialEntry::from_object(order, obj))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Inserts an object; `order` must be its position in the owning collection.
    pub fn insert(&mut self, order: usize, object: &PlacedObject) {
        self.tree.insert(SpatialEntry::from_object(order, object));
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    fn intersecting(&self, query: &CellAabb) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners([query.min_x, query.min_y], [query.max_x, query.max_y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.zone.intersects(query))
            .collect()
    }

    /// All entries whose zone truly intersects `query`, in collection order.
    pub fn conflicts(&self, query: &CellAabb) -> Vec<&SpatialEntry> {
        let mut hits = self.intersecting(query);
        hits.sort_by_key(|entry| entry.order);
        hits
    }

    /// The earliest entry in collection order whose zone intersects `query`.
    pub fn first_conflict(&self, query: &CellAabb) -> Option<&SpatialEntry> {
        self.intersecting(query)
            .into_iter()
            .min_by_key(|entry| entry.order)
    }

    /// Entries whose clearance zone covers the cell `(x, y)`, in collection order.
    pub fn zones_at(&self, x: i64, y: i64) -> Vec<&SpatialEntry> {
        let mut hits: Vec<&SpatialEntry> = self
            .tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .filter(|entry| entry.zone.contains(x, y))
            .collect();
        hits.sort_by_key(|entry| entry.order);
        hits
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
