//! Scene Index - WASM Module
//!
//! Answers "which objects are near this area?" for a frame-stepped 2D
//! scene, without paying a tree update for every object that moves.
//! Objects that have been idle for a while are parked in an R-tree;
//! active objects stay in a flat list that every query returns.
//!
//! # Architecture
//!
//! - `object`: object identity, bounding boxes and the `SpatialObject` trait
//! - `sleep`: per-object sleep state machine and the per-frame sweep
//! - `spatial`: R-tree spatial index over bounding boxes
//! - `manager`: awake/dormant object manager and the obstacle index

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod object;
pub mod sleep;
pub mod spatial;

pub use config::IndexConfig;
pub use error::IndexError;
pub use manager::{ManagerCounters, ObjectManager, ObstacleCounters, ObstacleIndex};
pub use object::{Aabb, ObjectId, SceneObject, SpatialObject};
pub use sleep::{FrameIndex, SleepState, SleepStatus, WakeListener};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

fn to_raw_ids(ids: Vec<ObjectId>) -> Vec<u32> {
    ids.into_iter().map(u32::from).collect()
}

fn to_raw_listeners(listeners: Vec<WakeListener>) -> Vec<u32> {
    listeners.into_iter().map(WakeListener::raw).collect()
}

/// Object index for one scene.
///
/// Owns the objects and the scene's frame counter. The host calls
/// `stepFrame` once per simulation step, after moving objects and before
/// querying.
#[wasm_bindgen]
pub struct SceneObjectIndex {
    manager: ObjectManager<SceneObject>,
    frame_index: FrameIndex,
}

#[wasm_bindgen]
impl SceneObjectIndex {
    /// Create an empty index with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            manager: ObjectManager::new(),
            frame_index: 0,
        }
    }

    /// Create an index from a configuration object, e.g.
    /// `{ framesBeforeSleep: 30, smallSceneThreshold: 8 }`.
    ///
    /// Missing fields take their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> std::result::Result<SceneObjectIndex, JsError> {
        let config: IndexConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsError::new(&e.to_string()))?;
        let manager = ObjectManager::with_config(config)?;
        Ok(Self {
            manager,
            frame_index: 0,
        })
    }

    /// Create an index with pre-allocated capacity.
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            manager: ObjectManager::with_capacity(capacity),
            frame_index: 0,
        }
    }

    // =========================================================================
    // Object Operations
    // =========================================================================

    /// Start tracking an object. It starts awake.
    ///
    /// Returns false if the id is already tracked or the bounds are not
    /// finite.
    #[wasm_bindgen(js_name = addObject)]
    pub fn add_object(&mut self, id: u32, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> bool {
        let object = SceneObject::new(
            ObjectId(id),
            Aabb::new(min_x, min_y, max_x, max_y),
            self.frame_index,
        );
        match self.manager.add_object(object) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("addObject: {e}");
                false
            }
        }
    }

    /// Add objects in bulk.
    ///
    /// `bounds` is [minX0, minY0, maxX0, maxY0, minX1, ...], four values
    /// per id. Returns the number of objects added. If the lengths
    /// disagree, only complete pairs are added.
    #[wasm_bindgen(js_name = addObjectsFromBounds)]
    pub fn add_objects_from_bounds(&mut self, ids: &[u32], bounds: &[f32]) -> u32 {
        if ids.len() * 4 != bounds.len() {
            log::warn!(
                "addObjectsFromBounds: {} ids but {} bound values, expected {}",
                ids.len(),
                bounds.len(),
                ids.len() * 4
            );
        }

        let mut added = 0;
        for (&id, b) in ids.iter().zip(bounds.chunks_exact(4)) {
            if self.add_object(id, b[0], b[1], b[2], b[3]) {
                added += 1;
            }
        }
        added
    }

    /// Stop tracking an object.
    ///
    /// Returns true if the object existed and was removed.
    #[wasm_bindgen(js_name = deleteObject)]
    pub fn delete_object(&mut self, id: u32) -> bool {
        self.manager.delete_object(ObjectId(id)).is_some()
    }

    /// Move or resize an object, waking it up.
    ///
    /// Returns the secondary listeners that fired, as `wakeUp` does.
    /// Non-finite bounds are ignored.
    #[wasm_bindgen(js_name = setObjectBounds)]
    pub fn set_object_bounds(
        &mut self,
        id: u32,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> Vec<u32> {
        let id = ObjectId(id);
        let aabb = Aabb::new(min_x, min_y, max_x, max_y);
        if !aabb.is_finite() {
            log::warn!("setObjectBounds: {id} got non-finite bounds, ignoring");
            return Vec::new();
        }
        match self.manager.object_mut(id) {
            Some(object) => object.set_aabb(aabb),
            None => return Vec::new(),
        }
        to_raw_listeners(self.manager.wake_up(id, self.frame_index))
    }

    /// Get an object's bounds.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if not tracked.
    #[wasm_bindgen(js_name = getObjectBounds)]
    pub fn get_object_bounds(&self, id: u32) -> Option<Vec<f32>> {
        self.manager.object(ObjectId(id)).map(|object| {
            let aabb = object.aabb();
            vec![aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y]
        })
    }

    /// Get the number of tracked objects.
    #[wasm_bindgen(js_name = objectCount)]
    pub fn object_count(&self) -> u32 {
        self.manager.len() as u32
    }

    // =========================================================================
    // Sleep
    // =========================================================================

    /// Record activity on an object at the current frame.
    ///
    /// Returns the secondary listeners registered with
    /// `registerOnWakingUp` that fired, if the object was asleep.
    #[wasm_bindgen(js_name = wakeUp)]
    pub fn wake_up(&mut self, id: u32) -> Vec<u32> {
        to_raw_listeners(self.manager.wake_up(ObjectId(id), self.frame_index))
    }

    /// Register a listener id for the object's next wake-up.
    ///
    /// Listener 0 is reserved. Returns false if it is used or the object
    /// is not tracked.
    #[wasm_bindgen(js_name = registerOnWakingUp)]
    pub fn register_on_waking_up(&mut self, id: u32, listener: u32) -> bool {
        let listener = WakeListener(listener);
        if listener == WakeListener::OBJECT_MANAGER {
            return false;
        }
        self.manager
            .register_on_waking_up(ObjectId(id), listener)
            .is_ok()
    }

    /// Keep an object awake (e.g. while a timer runs on it).
    ///
    /// Takes effect from the next sweep for an awake object; a dormant
    /// object must also be woken up.
    #[wasm_bindgen(js_name = setNeedsToBeAwake)]
    pub fn set_needs_to_be_awake(&mut self, id: u32, needs_to_be_awake: bool) -> bool {
        match self.manager.object_mut(ObjectId(id)) {
            Some(object) => {
                object.set_needs_to_be_awake(needs_to_be_awake);
                true
            }
            None => false,
        }
    }

    /// Make an object fall asleep on the next frame.
    #[wasm_bindgen(js_name = forceToSleep)]
    pub fn force_to_sleep(&mut self, id: u32) -> bool {
        self.manager.force_to_sleep(ObjectId(id)).is_ok()
    }

    /// Check if an object is awake.
    #[wasm_bindgen(js_name = isAwake)]
    pub fn is_awake(&self, id: u32) -> bool {
        self.manager.is_awake(ObjectId(id))
    }

    /// Advance the frame counter and run the sleep sweep.
    ///
    /// Returns the number of objects that fell asleep this frame.
    #[wasm_bindgen(js_name = stepFrame)]
    pub fn step_frame(&mut self) -> u32 {
        self.frame_index += 1;
        self.manager.update_awake_objects(self.frame_index) as u32
    }

    /// Current frame index.
    #[wasm_bindgen(js_name = frameIndex)]
    pub fn frame_index(&self) -> f64 {
        self.frame_index as f64
    }

    #[wasm_bindgen(js_name = awakeCount)]
    pub fn awake_count(&self) -> u32 {
        self.manager.awake_instances().len() as u32
    }

    #[wasm_bindgen(js_name = dormantCount)]
    pub fn dormant_count(&self) -> u32 {
        self.manager.dormant_count() as u32
    }

    /// Get `{ all, awake, dormant }` counts.
    #[wasm_bindgen(js_name = getCounters)]
    pub fn get_counters(&self) -> std::result::Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.manager.counters())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find candidate objects for a rectangular region.
    ///
    /// Returns a Uint32Array of object IDs: every dormant object in the
    /// region plus every awake object. Filter precisely on the JS side.
    pub fn search(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<u32> {
        to_raw_ids(
            self.manager
                .search(&Aabb::new(min_x, min_y, max_x, max_y)),
        )
    }

    /// Find candidate objects within a distance of a rectangular region.
    #[wasm_bindgen(js_name = searchNear)]
    pub fn search_near(
        &self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
        distance: f32,
    ) -> Vec<u32> {
        to_raw_ids(
            self.manager
                .search_near(&Aabb::new(min_x, min_y, max_x, max_y), distance),
        )
    }

    /// Find candidate objects containing a point.
    #[wasm_bindgen(js_name = searchPoint)]
    pub fn search_point(&self, x: f32, y: f32) -> Vec<u32> {
        to_raw_ids(self.manager.search_point(x, y))
    }

    /// Clear all objects. The frame counter keeps running.
    pub fn clear(&mut self) {
        self.manager.clear();
    }
}

impl Default for SceneObjectIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Always-indexed objects (platforms, walls) with batched updates.
///
/// Objects are grouped by name; queries take the list of names to look in.
#[wasm_bindgen]
pub struct ObstacleIndexWasm {
    index: ObstacleIndex,
}

#[wasm_bindgen]
impl ObstacleIndexWasm {
    /// Create an empty obstacle index.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            index: ObstacleIndex::new(),
        }
    }

    /// Record a new object under `name`.
    ///
    /// Returns false if the bounds are not finite.
    #[wasm_bindgen(js_name = markCreated)]
    pub fn mark_created(
        &mut self,
        id: u32,
        name: &str,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> bool {
        self.index
            .mark_created(ObjectId(id), name, Aabb::new(min_x, min_y, max_x, max_y))
    }

    /// Record that an object moved, changed size or changed name.
    ///
    /// Returns false if the bounds are not finite.
    #[wasm_bindgen(js_name = markDirty)]
    pub fn mark_dirty(
        &mut self,
        id: u32,
        name: &str,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> bool {
        self.index
            .mark_dirty(ObjectId(id), name, Aabb::new(min_x, min_y, max_x, max_y))
    }

    #[wasm_bindgen(js_name = markRemoved)]
    pub fn mark_removed(&mut self, id: u32) {
        self.index.mark_removed(ObjectId(id));
    }

    /// Apply pending changes. Queries do this automatically.
    pub fn update(&mut self) {
        self.index.update();
    }

    /// Find objects with one of `names` intersecting a rectangular region.
    pub fn search(
        &mut self,
        names: Vec<String>,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> Vec<u32> {
        to_raw_ids(
            self.index
                .search(&names, &Aabb::new(min_x, min_y, max_x, max_y)),
        )
    }

    #[wasm_bindgen(js_name = searchNear)]
    pub fn search_near(
        &mut self,
        names: Vec<String>,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
        distance: f32,
    ) -> Vec<u32> {
        to_raw_ids(self.index.search_near(
            &names,
            &Aabb::new(min_x, min_y, max_x, max_y),
            distance,
        ))
    }

    #[wasm_bindgen(js_name = searchPoint)]
    pub fn search_point(&mut self, names: Vec<String>, x: f32, y: f32) -> Vec<u32> {
        to_raw_ids(self.index.search_point(&names, x, y))
    }

    /// Number of indexed objects, not counting pending changes.
    #[wasm_bindgen(js_name = indexedCount)]
    pub fn indexed_count(&self) -> u32 {
        self.index.len() as u32
    }

    /// Get `{ trees, indexed, pendingDirty, pendingRemoved }` counts.
    #[wasm_bindgen(js_name = getCounters)]
    pub fn get_counters(&self) -> std::result::Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.index.counters())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }
}

impl Default for ObstacleIndexWasm {
    fn default() -> Self {
        Self::new()
    }
}
