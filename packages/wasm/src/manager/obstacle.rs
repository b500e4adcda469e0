//! ObstacleIndex - always-indexed objects with deferred updates.
//!
//! Suited to objects that rarely move (platforms, walls): they are never
//! put to sleep, changes are recorded as they happen and applied in one
//! batch before the next query. Objects are grouped by name, one tree per
//! name, and queries only visit the trees of the names they ask for.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::object::{Aabb, ObjectId};
use crate::spatial::SpatialIndex;

/// Tree, indexed and pending counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleCounters {
    /// One tree per object name seen so far.
    pub trees: usize,
    pub indexed: usize,
    pub pending_dirty: usize,
    pub pending_removed: usize,
}

/// Spatial index for objects that are always indexed, grouped by name.
///
/// Call the `mark_*` methods as objects change; the trees are brought up
/// to date by [`ObstacleIndex::update`], which every query runs first.
/// Unlike the object manager, query results are exact at the box level.
#[derive(Default)]
pub struct ObstacleIndex {
    trees: HashMap<String, SpatialIndex>,
    /// Name of the tree each indexed object is in.
    names: HashMap<ObjectId, String>,
    /// Latest name and bounds of objects created or moved since the last
    /// update.
    dirty: HashMap<ObjectId, (String, Aabb)>,
    removed: HashSet<ObjectId>,
}

impl ObstacleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new object.
    ///
    /// An id marked removed since the last update is un-removed, possibly
    /// under another name. Returns false, ignoring the call, if the bounds
    /// are not finite.
    pub fn mark_created(&mut self, id: ObjectId, name: &str, aabb: Aabb) -> bool {
        if !self.mark_dirty(id, name, aabb) {
            return false;
        }
        self.removed.remove(&id);
        true
    }

    /// Record that an object moved or changed size.
    ///
    /// Returns false, ignoring the call, if the bounds are not finite.
    pub fn mark_dirty(&mut self, id: ObjectId, name: &str, aabb: Aabb) -> bool {
        if !aabb.is_finite() {
            log::warn!("{id} has non-finite bounds, ignoring the update");
            return false;
        }
        self.dirty.insert(id, (name.to_string(), aabb));
        true
    }

    /// Record that an object is gone.
    pub fn mark_removed(&mut self, id: ObjectId) {
        self.removed.insert(id);
    }

    /// Apply pending changes to the trees.
    ///
    /// Dirty objects are removed and re-inserted with their latest name
    /// and bounds, then removals are applied. Re-inserting into an empty
    /// tree uses a bulk load.
    pub fn update(&mut self) {
        if self.dirty.is_empty() && self.removed.is_empty() {
            return;
        }

        for id in self.dirty.keys() {
            remove_indexed(&mut self.names, &mut self.trees, *id);
        }

        let mut batches: HashMap<String, Vec<(ObjectId, Aabb)>> = HashMap::new();
        for (id, (name, aabb)) in self.dirty.drain() {
            self.names.insert(id, name.clone());
            batches.entry(name).or_default().push((id, aabb));
        }
        for (name, entries) in batches {
            let tree = self.trees.entry(name).or_default();
            if tree.is_empty() {
                tree.rebuild(&entries);
            } else {
                for (id, aabb) in entries {
                    tree.insert(id, aabb);
                }
            }
        }

        for id in self.removed.drain() {
            remove_indexed(&mut self.names, &mut self.trees, id);
        }

        log::trace!(
            "obstacle index updated, {} indexed in {} trees",
            self.names.len(),
            self.trees.len()
        );
    }

    /// Objects with one of `names` intersecting `area`, after applying
    /// pending changes.
    pub fn search<S: AsRef<str>>(&mut self, names: &[S], area: &Aabb) -> Vec<ObjectId> {
        self.update();

        let mut results = Vec::new();
        for name in names {
            if let Some(tree) = self.trees.get(name.as_ref()) {
                tree.search_into(area, &mut results);
            }
        }
        results
    }

    /// Objects with one of `names` within `distance` of `area`.
    pub fn search_near<S: AsRef<str>>(
        &mut self,
        names: &[S],
        area: &Aabb,
        distance: f32,
    ) -> Vec<ObjectId> {
        self.search(names, &area.expanded(distance))
    }

    /// Objects with one of `names` containing a point.
    pub fn search_point<S: AsRef<str>>(&mut self, names: &[S], x: f32, y: f32) -> Vec<ObjectId> {
        self.search(names, &Aabb::from_point(x, y))
    }

    /// Whether an object is indexed, not counting pending changes.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.names.contains_key(&id)
    }

    /// Name an object is indexed under.
    pub fn name_of(&self, id: ObjectId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Number of indexed objects, not counting pending changes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn counters(&self) -> ObstacleCounters {
        ObstacleCounters {
            trees: self.trees.len(),
            indexed: self.names.len(),
            pending_dirty: self.dirty.len(),
            pending_removed: self.removed.len(),
        }
    }

    pub fn clear(&mut self) {
        self.trees.clear();
        self.names.clear();
        self.dirty.clear();
        self.removed.clear();
    }
}

fn remove_indexed(
    names: &mut HashMap<ObjectId, String>,
    trees: &mut HashMap<String, SpatialIndex>,
    id: ObjectId,
) {
    let Some(name) = names.remove(&id) else {
        return;
    };
    if let Some(tree) = trees.get_mut(&name) {
        tree.remove(id);
    }
}
