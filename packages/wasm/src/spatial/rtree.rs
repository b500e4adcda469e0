//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Rectangle intersection
//! - Point containment

use std::collections::HashMap;

use rstar::{RTree, RTreeObject, AABB};

use crate::object::{Aabb, ObjectId};

/// An entry in the spatial index: an object id with the bounds it had
/// when it was inserted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedObject {
    /// The object identifier.
    pub id: ObjectId,
    /// Bounds snapshot used as the tree envelope.
    pub aabb: Aabb,
}

impl IndexedObject {
    /// Create a new IndexedObject.
    pub fn new(id: ObjectId, aabb: Aabb) -> Self {
        Self { id, aabb }
    }
}

impl RTreeObject for IndexedObject {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        to_envelope(&self.aabb)
    }
}

fn to_envelope(aabb: &Aabb) -> AABB<[f32; 2]> {
    AABB::from_corners([aabb.min_x, aabb.min_y], [aabb.max_x, aabb.max_y])
}

/// Spatial index for scene objects.
///
/// Uses an R*-tree for efficient spatial queries. The bounds each object
/// was inserted with are remembered, so removal only needs the id even if
/// the object has moved since.
pub struct SpatialIndex {
    tree: RTree<IndexedObject>,
    bounds: HashMap<ObjectId, Aabb>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            bounds: HashMap::new(),
        }
    }

    /// Create a spatial index with expected capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        // RTree has no with_capacity, only the id map is pre-allocated
        Self {
            tree: RTree::new(),
            bounds: HashMap::with_capacity(capacity),
        }
    }

    /// Insert an object into the index.
    ///
    /// An object already present is re-inserted with the new bounds.
    pub fn insert(&mut self, id: ObjectId, aabb: Aabb) {
        if let Some(previous) = self.bounds.insert(id, aabb) {
            self.tree.remove(&IndexedObject::new(id, previous));
        }
        self.tree.insert(IndexedObject::new(id, aabb));
    }

    /// Remove an object from the index.
    ///
    /// Returns the bounds it was indexed with, or None if it was absent.
    pub fn remove(&mut self, id: ObjectId) -> Option<Aabb> {
        let aabb = self.bounds.remove(&id)?;
        if self.tree.remove(&IndexedObject::new(id, aabb)).is_none() {
            log::warn!("{id} was tracked by the spatial index but missing from its tree");
        }
        Some(aabb)
    }

    /// Check whether an object is indexed.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.bounds.contains_key(&id)
    }

    /// Find all objects whose bounds intersect a rectangle.
    pub fn search(&self, area: &Aabb) -> Vec<ObjectId> {
        let mut results = Vec::new();
        self.search_into(area, &mut results);
        results
    }

    /// Find all objects whose bounds intersect a rectangle.
    /// Results are appended to `results`.
    pub fn search_into(&self, area: &Aabb, results: &mut Vec<ObjectId>) {
        results.extend(
            self.tree
                .locate_in_envelope_intersecting(&to_envelope(area))
                .map(|entry| entry.id),
        );
    }

    /// Find all objects whose bounds contain a point.
    pub fn search_point(&self, x: f32, y: f32) -> Vec<ObjectId> {
        self.search(&Aabb::from_point(x, y))
    }

    /// Rebuild the index from a list of (id, bounds) pairs.
    ///
    /// This is more efficient than incremental inserts for bulk updates.
    pub fn rebuild(&mut self, entries: &[(ObjectId, Aabb)]) {
        self.bounds = entries.iter().copied().collect();
        let objects: Vec<_> = self
            .bounds
            .iter()
            .map(|(&id, &aabb)| IndexedObject::new(id, aabb))
            .collect();

        self.tree = RTree::bulk_load(objects);
    }

    /// Iterate over every indexed entry, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedObject> {
        self.tree.iter()
    }

    /// Clear all objects from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.bounds.clear();
    }

    /// Get the number of objects in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
