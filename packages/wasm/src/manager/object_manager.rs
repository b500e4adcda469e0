//! ObjectManager - awake/dormant partition of scene objects.
//!
//! Every tracked object is in exactly one of two containers:
//! - the awake list, swept once per frame and returned by every query
//! - the spatial index, holding objects that have been idle long enough
//!
//! Objects move between the two by value: the sweep moves idle objects
//! into the index, and waking an object moves it back.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::object::{Aabb, ObjectId, SpatialObject};
use crate::sleep::{self, FrameIndex, WakeListener};
use crate::spatial::SpatialIndex;

/// Container sizes, for debugging overlays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ManagerCounters {
    /// All tracked objects.
    pub all: usize,
    /// Objects in the awake list.
    pub awake: usize,
    /// Objects held by the spatial index.
    pub dormant: usize,
}

/// Owns the objects of one scene and answers range queries.
///
/// Single-threaded and frame-stepped: call
/// [`ObjectManager::update_awake_objects`] once per frame after gameplay
/// mutations and before any query that frame. Code that moves or
/// reactivates an object must call [`ObjectManager::wake_up`].
pub struct ObjectManager<T: SpatialObject> {
    config: IndexConfig,

    /// Object storage keyed by id.
    objects: HashMap<ObjectId, T>,

    /// Authoritative membership list, in insertion order.
    all_instances: Vec<ObjectId>,

    /// Objects whose sleep state is not Asleep. Not indexed.
    awake_instances: Vec<ObjectId>,

    /// Dormant objects: exactly `all_instances - awake_instances`.
    index: SpatialIndex,
}

impl<T: SpatialObject> ObjectManager<T> {
    /// Create an empty manager with the default configuration.
    pub fn new() -> Self {
        Self::from_config(IndexConfig::default(), 0)
    }

    /// Create an empty manager with a custom configuration.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config, 0))
    }

    /// Create a manager with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(IndexConfig::default(), capacity)
    }

    fn from_config(config: IndexConfig, capacity: usize) -> Self {
        Self {
            config,
            objects: HashMap::with_capacity(capacity),
            all_instances: Vec::with_capacity(capacity),
            awake_instances: Vec::with_capacity(capacity),
            index: SpatialIndex::with_capacity(capacity),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Start tracking an object. It enters the awake list.
    ///
    /// The manager registers itself on the object's sleep state so that a
    /// later wake-up brings it back into the awake list. Objects whose
    /// bounds cannot be indexed are rejected.
    pub fn add_object(&mut self, mut object: T) -> Result<()> {
        let id = object.id();
        if self.objects.contains_key(&id) {
            return Err(IndexError::DuplicateObject(id));
        }
        if !object.aabb().is_finite() {
            return Err(IndexError::NonFiniteBounds(id));
        }

        object
            .sleep_state_mut()
            .register_on_waking_up(WakeListener::OBJECT_MANAGER);
        self.all_instances.push(id);
        self.awake_instances.push(id);
        self.objects.insert(id, object);
        Ok(())
    }

    /// Stop tracking an object and hand it back.
    ///
    /// The object is removed from the container its sleep state says it
    /// is in, and from that container only.
    pub fn delete_object(&mut self, id: ObjectId) -> Option<T> {
        let object = self.objects.remove(&id)?;

        if let Some(position) = self.all_instances.iter().position(|&other| other == id) {
            self.all_instances.remove(position);
        }

        if object.sleep_state().is_awake() {
            match self.awake_instances.iter().position(|&other| other == id) {
                Some(position) => {
                    self.awake_instances.remove(position);
                }
                None => log::warn!("{id} is awake but was not in the awake set"),
            }
        } else if self.index.remove(id).is_none() {
            log::warn!("{id} is asleep but was not in the spatial index");
        }

        Some(object)
    }

    /// Drop every tracked object.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.all_instances.clear();
        self.awake_instances.clear();
        self.index.clear();
    }

    pub fn object(&self, id: ObjectId) -> Option<&T> {
        self.objects.get(&id)
    }

    /// Mutable access to an object.
    ///
    /// Changing the bounds of an object does not update the index: call
    /// [`ObjectManager::wake_up`] after any mutation that moves it. The
    /// sleep state cannot be woken from here.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.objects.get_mut(&id)
    }

    /// Iterate over all tracked objects, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.objects.values()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Whether a tracked object is awake. False for unknown objects.
    pub fn is_awake(&self, id: ObjectId) -> bool {
        self.objects
            .get(&id)
            .map(|object| object.sleep_state().is_awake())
            .unwrap_or(false)
    }

    /// Number of tracked objects.
    pub fn len(&self) -> usize {
        self.all_instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_instances.is_empty()
    }

    /// All tracked objects, in insertion order.
    pub fn all_instances(&self) -> &[ObjectId] {
        &self.all_instances
    }

    /// Awake objects, in sweep order.
    pub fn awake_instances(&self) -> &[ObjectId] {
        &self.awake_instances
    }

    /// Number of objects held by the spatial index.
    pub fn dormant_count(&self) -> usize {
        self.index.len()
    }

    pub fn counters(&self) -> ManagerCounters {
        ManagerCounters {
            all: self.all_instances.len(),
            awake: self.awake_instances.len(),
            dormant: self.index.len(),
        }
    }

    // =========================================================================
    // Sleep
    // =========================================================================

    /// Record activity on an object, waking it up if it was asleep.
    ///
    /// A dormant object leaves the spatial index and rejoins the awake
    /// list before this returns, so queries later in the same frame see
    /// it. Listeners registered by other consumers are returned in
    /// registration order for the caller to dispatch. Unknown objects
    /// are ignored.
    pub fn wake_up(&mut self, id: ObjectId, frame: FrameIndex) -> Vec<WakeListener> {
        let Some(object) = self.objects.get_mut(&id) else {
            return Vec::new();
        };

        let mut fired = Vec::new();
        if !object
            .sleep_state_mut()
            .wake_up(frame, |listener| fired.push(listener))
        {
            return fired;
        }

        log::debug!("{id} woke up at frame {frame}");
        let mut secondary = Vec::with_capacity(fired.len());
        for listener in fired {
            if listener == WakeListener::OBJECT_MANAGER {
                self.on_waking_up(id);
            } else {
                secondary.push(listener);
            }
        }
        secondary
    }

    /// Register another consumer's listener on an object's next wake-up.
    pub fn register_on_waking_up(&mut self, id: ObjectId, listener: WakeListener) -> Result<()> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(IndexError::UnknownObject(id))?;
        object.sleep_state_mut().register_on_waking_up(listener);
        Ok(())
    }

    /// Make an object fall asleep on the next sweep, whatever its idle
    /// time.
    pub fn force_to_sleep(&mut self, id: ObjectId) -> Result<()> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(IndexError::UnknownObject(id))?;
        object.sleep_state_mut().force_to_sleep();
        Ok(())
    }

    /// The per-frame sweep.
    ///
    /// Moves every awake object that can sleep into the spatial index,
    /// indexed with its current bounds. Returns the number of objects that
    /// fell asleep.
    pub fn update_awake_objects(&mut self, frame: FrameIndex) -> usize {
        let index = &mut self.index;
        let fallen_asleep = sleep::update_awake_objects(
            &mut self.awake_instances,
            &mut self.objects,
            frame,
            u64::from(self.config.frames_before_sleep),
            WakeListener::OBJECT_MANAGER,
            |object| index.insert(object.id(), object.aabb()),
        );

        log::trace!(
            "frame {frame}: {fallen_asleep} fell asleep, {} awake, {} dormant",
            self.awake_instances.len(),
            self.index.len()
        );
        fallen_asleep
    }

    /// Move a woken object from the index back to the awake list.
    fn on_waking_up(&mut self, id: ObjectId) {
        if self.index.remove(id).is_none() {
            log::warn!("{id} woke up but was not in the spatial index");
            if self.awake_instances.contains(&id) {
                return;
            }
        }
        self.awake_instances.push(id);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Candidate objects for a rectangle.
    ///
    /// Returns a superset: every dormant object intersecting `area`, plus
    /// every awake object wherever it is. Callers do their own precise
    /// filtering. In small scenes all objects are returned without
    /// touching the index.
    pub fn search(&self, area: &Aabb) -> Vec<ObjectId> {
        if self.all_instances.len() < self.config.small_scene_threshold {
            return self.all_instances.clone();
        }

        let mut results = Vec::with_capacity(self.awake_instances.len());
        self.index.search_into(area, &mut results);
        results.extend_from_slice(&self.awake_instances);
        results
    }

    /// Candidate objects within `distance` of a rectangle.
    pub fn search_near(&self, area: &Aabb, distance: f32) -> Vec<ObjectId> {
        self.search(&area.expanded(distance))
    }

    /// Candidate objects containing a point.
    pub fn search_point(&self, x: f32, y: f32) -> Vec<ObjectId> {
        self.search(&Aabb::from_point(x, y))
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    /// Check that every tracked object is either awake and listed, or
    /// asleep and indexed, and never both.
    pub fn validate_partition(&self) -> Result<()> {
        let violation = |id: ObjectId, reason: &str| IndexError::PartitionViolation {
            id,
            reason: reason.to_string(),
        };

        let mut awake = HashSet::with_capacity(self.awake_instances.len());
        for &id in &self.awake_instances {
            if !awake.insert(id) {
                return Err(violation(id, "listed twice in the awake set"));
            }
            if self.index.contains(id) {
                return Err(violation(id, "both awake and indexed"));
            }
            match self.objects.get(&id) {
                None => return Err(violation(id, "awake but not tracked")),
                Some(object) if !object.sleep_state().is_awake() => {
                    return Err(violation(id, "in the awake set but asleep"));
                }
                Some(_) => {}
            }
        }

        for entry in self.index.iter() {
            match self.objects.get(&entry.id) {
                None => return Err(violation(entry.id, "indexed but not tracked")),
                Some(object) if object.sleep_state().is_awake() => {
                    return Err(violation(entry.id, "indexed but awake"));
                }
                Some(_) => {}
            }
        }

        for &id in &self.all_instances {
            if !awake.contains(&id) && !self.index.contains(id) {
                return Err(violation(id, "in neither the awake set nor the index"));
            }
        }

        Ok(())
    }
}

impl<T: SpatialObject> Default for ObjectManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SceneObject;
    use crate::sleep::SleepStatus;

    /// Object `i` is a 5x5 square at (10 * i, 0).
    fn square(i: u32) -> Aabb {
        let x = i as f32 * 10.0;
        Aabb::new(x, 0.0, x + 5.0, 5.0)
    }

    fn manager_with(count: u32) -> ObjectManager<SceneObject> {
        let mut manager = ObjectManager::new();
        for i in 0..count {
            manager
                .add_object(SceneObject::new(ObjectId(i), square(i), 0))
                .unwrap();
        }
        manager
    }

    /// Sweep frames `from..=to`, checking the partition after each sweep.
    fn run_frames(manager: &mut ObjectManager<SceneObject>, from: FrameIndex, to: FrameIndex) {
        for frame in from..=to {
            manager.update_awake_objects(frame);
            manager.validate_partition().unwrap();
        }
    }

    fn sorted(mut ids: Vec<ObjectId>) -> Vec<ObjectId> {
        ids.sort();
        ids
    }

    #[test]
    fn test_add_object_starts_awake() {
        let manager = manager_with(3);
        assert_eq!(manager.len(), 3);
        assert_eq!(
            manager.awake_instances(),
            &[ObjectId(0), ObjectId(1), ObjectId(2)]
        );
        assert_eq!(manager.dormant_count(), 0);
        assert!(manager.is_awake(ObjectId(1)));
        assert_eq!(
            manager
                .object(ObjectId(1))
                .unwrap()
                .sleep_state()
                .waking_up_listeners(),
            &[WakeListener::OBJECT_MANAGER]
        );
        manager.validate_partition().unwrap();
    }

    #[test]
    fn test_add_duplicate_is_rejected() {
        let mut manager = manager_with(1);
        let result = manager.add_object(SceneObject::new(ObjectId(0), square(0), 0));
        assert_eq!(result, Err(IndexError::DuplicateObject(ObjectId(0))));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.awake_instances().len(), 1);
    }

    #[test]
    fn test_sleep_after_idle_threshold() {
        let mut manager = manager_with(10);

        run_frames(&mut manager, 1, 59);
        assert_eq!(manager.awake_instances().len(), 10);
        assert_eq!(manager.dormant_count(), 0);

        run_frames(&mut manager, 60, 60);
        assert!(manager.awake_instances().is_empty());
        assert_eq!(manager.dormant_count(), 10);
        assert_eq!(
            manager.object(ObjectId(4)).unwrap().sleep_state().status(),
            SleepStatus::Asleep
        );
    }

    #[test]
    fn test_wake_up_reinserts_immediately() {
        let mut manager = manager_with(10);
        run_frames(&mut manager, 1, 60);

        let secondary = manager.wake_up(ObjectId(3), 61);
        assert!(secondary.is_empty());
        assert_eq!(manager.awake_instances(), &[ObjectId(3)]);
        assert_eq!(manager.dormant_count(), 9);
        assert_eq!(
            manager
                .object(ObjectId(3))
                .unwrap()
                .sleep_state()
                .last_activity_frame(),
            Some(61)
        );
        manager.validate_partition().unwrap();

        // Query covering every object: 9 from the index, 1 awake
        let found = manager.search(&Aabb::new(-10.0, -10.0, 200.0, 200.0));
        assert_eq!(found.len(), 10);
        assert_eq!(sorted(found), (0..10).map(ObjectId).collect::<Vec<_>>());
    }

    #[test]
    fn test_woken_object_sleeps_again() {
        let mut manager = manager_with(10);
        run_frames(&mut manager, 1, 60);
        manager.wake_up(ObjectId(3), 61);

        run_frames(&mut manager, 62, 120);
        assert_eq!(manager.awake_instances(), &[ObjectId(3)]);
        run_frames(&mut manager, 121, 121);
        assert!(manager.awake_instances().is_empty());
        assert_eq!(manager.dormant_count(), 10);

        // Exactly one re-insertion listener is armed for the next cycle
        assert_eq!(
            manager
                .object(ObjectId(3))
                .unwrap()
                .sleep_state()
                .waking_up_listeners(),
            &[WakeListener::OBJECT_MANAGER]
        );
    }

    #[test]
    fn test_double_wake_up_is_idempotent() {
        let mut manager = manager_with(10);
        run_frames(&mut manager, 1, 60);

        manager.wake_up(ObjectId(2), 61);
        manager.wake_up(ObjectId(2), 61);
        manager.wake_up(ObjectId(2), 62);

        assert_eq!(manager.awake_instances(), &[ObjectId(2)]);
        assert_eq!(
            manager
                .object(ObjectId(2))
                .unwrap()
                .sleep_state()
                .last_activity_frame(),
            Some(62)
        );
        manager.validate_partition().unwrap();
    }

    #[test]
    fn test_wake_up_keeps_awake_object_awake() {
        let mut manager = manager_with(1);
        for frame in 1..=200 {
            // Moving every frame
            manager.wake_up(ObjectId(0), frame);
            manager.update_awake_objects(frame);
        }
        assert_eq!(manager.awake_instances(), &[ObjectId(0)]);
    }

    #[test]
    fn test_needed_object_never_sleeps() {
        let mut manager = manager_with(10);
        manager
            .object_mut(ObjectId(5))
            .unwrap()
            .set_needs_to_be_awake(true);

        run_frames(&mut manager, 1, 1000);
        assert_eq!(manager.awake_instances(), &[ObjectId(5)]);
        assert_eq!(manager.dormant_count(), 9);
    }

    #[test]
    fn test_force_to_sleep() {
        let mut manager = manager_with(10);
        manager.force_to_sleep(ObjectId(7)).unwrap();
        assert_eq!(
            manager.force_to_sleep(ObjectId(99)),
            Err(IndexError::UnknownObject(ObjectId(99)))
        );

        run_frames(&mut manager, 1, 1);
        assert!(!manager.is_awake(ObjectId(7)));
        assert_eq!(manager.awake_instances().len(), 9);
        assert_eq!(manager.dormant_count(), 1);
    }

    #[test]
    fn test_small_scene_returns_everything() {
        let mut manager = manager_with(7);
        run_frames(&mut manager, 1, 60);

        // Far away from every object
        let found = manager.search(&Aabb::new(1000.0, 1000.0, 1001.0, 1001.0));
        assert_eq!(sorted(found), (0..7).map(ObjectId).collect::<Vec<_>>());
    }

    #[test]
    fn test_small_scene_threshold_boundary() {
        let far = Aabb::new(1000.0, 1000.0, 1001.0, 1001.0);

        // One object below the threshold: everything is returned
        let mut manager = manager_with(7);
        run_frames(&mut manager, 1, 60);
        assert_eq!(manager.search(&far).len(), 7);

        // At the threshold the index is consulted
        let mut manager = manager_with(8);
        run_frames(&mut manager, 1, 60);
        assert!(manager.search(&far).is_empty());
        assert_eq!(manager.search(&square(7)), vec![ObjectId(7)]);
    }

    #[test]
    fn test_search_has_no_false_negatives() {
        let mut manager = manager_with(20);
        run_frames(&mut manager, 1, 60);
        // A few objects are awake again, one of them moved
        manager.wake_up(ObjectId(1), 61);
        manager.object_mut(ObjectId(15)).unwrap().set_aabb(square(2));
        manager.wake_up(ObjectId(15), 61);

        let area = Aabb::new(16.0, 0.0, 45.0, 5.0);
        let found = manager.search(&area);

        for object in manager.iter() {
            if object.aabb().intersects(&area) {
                assert!(found.contains(&object.id()), "missing {}", object.id());
            }
        }
        // False positives only come from the awake set
        for id in &found {
            let object = manager.object(*id).unwrap();
            assert!(object.aabb().intersects(&area) || manager.is_awake(*id));
        }
        // Object 1 does not intersect but is awake
        assert!(found.contains(&ObjectId(1)));
        // Dormant object 10 is far away
        assert!(!found.contains(&ObjectId(10)));
    }

    #[test]
    fn test_moved_object_is_reindexed_at_new_bounds() {
        let mut manager = manager_with(10);
        run_frames(&mut manager, 1, 60);

        let far = Aabb::new(500.0, 500.0, 505.0, 505.0);
        manager.object_mut(ObjectId(0)).unwrap().set_aabb(far);
        manager.wake_up(ObjectId(0), 61);
        run_frames(&mut manager, 62, 121);
        assert_eq!(manager.dormant_count(), 10);

        assert!(!manager.search(&square(0)).contains(&ObjectId(0)));
        assert_eq!(manager.search(&far), vec![ObjectId(0)]);
    }

    #[test]
    fn test_search_near_and_point() {
        let mut manager = manager_with(10);
        run_frames(&mut manager, 1, 60);

        // Object 2 spans x in [20, 25]; the point is 2 units to its right
        assert!(manager.search_point(27.0, 2.0).is_empty());
        let near = manager.search_near(&Aabb::from_point(27.0, 2.0), 2.5);
        assert_eq!(near, vec![ObjectId(2)]);

        assert_eq!(manager.search_point(22.0, 2.0), vec![ObjectId(2)]);
    }

    #[test]
    fn test_moved_dormant_object_is_found_and_deleted() {
        let mut manager = manager_with(10);
        run_frames(&mut manager, 1, 60);

        let moved = square(3).translated(500.0, 0.0);
        manager.object_mut(ObjectId(3)).unwrap().set_aabb(moved);
        manager.wake_up(ObjectId(3), 61);
        manager.validate_partition().unwrap();
        assert_eq!(manager.search(&moved), vec![ObjectId(3)]);

        manager.delete_object(ObjectId(3)).unwrap();
        assert_eq!(manager.dormant_count(), 9);
        assert!(manager.awake_instances().is_empty());
        manager.validate_partition().unwrap();
        assert!(manager.search(&moved).is_empty());
    }

    #[test]
    fn test_non_finite_bounds_are_rejected() {
        let mut manager = manager_with(10);
        let nan = Aabb::new(f32::NAN, f32::NAN, f32::NAN, f32::NAN);

        assert_eq!(
            manager.add_object(SceneObject::new(ObjectId(99), nan, 0)),
            Err(IndexError::NonFiniteBounds(ObjectId(99)))
        );
        assert!(!manager.contains(ObjectId(99)));

        run_frames(&mut manager, 1, 60);
        assert_eq!(manager.dormant_count(), 10);
    }

    #[test]
    fn test_object_moved_to_non_finite_bounds_stays_awake() {
        let mut manager = manager_with(10);
        manager
            .object_mut(ObjectId(2))
            .unwrap()
            .set_aabb(Aabb::new(0.0, 0.0, f32::INFINITY, 1.0));
        manager.wake_up(ObjectId(2), 0);

        run_frames(&mut manager, 1, 120);
        assert_eq!(manager.awake_instances(), &[ObjectId(2)]);
        assert_eq!(manager.dormant_count(), 9);
        assert!(manager.search(&square(5)).contains(&ObjectId(2)));
    }

    #[test]
    fn test_delete_awake_object() {
        let mut manager = manager_with(10);
        manager.force_to_sleep(ObjectId(0)).unwrap();
        run_frames(&mut manager, 1, 1);
        assert_eq!(manager.dormant_count(), 1);

        let deleted = manager.delete_object(ObjectId(4)).unwrap();
        assert_eq!(deleted.id(), ObjectId(4));
        assert_eq!(manager.len(), 9);
        assert!(!manager.awake_instances().contains(&ObjectId(4)));
        // The index was left alone
        assert_eq!(manager.dormant_count(), 1);
        manager.validate_partition().unwrap();
        assert!(!manager.search(&square(4)).contains(&ObjectId(4)));
    }

    #[test]
    fn test_delete_dormant_object() {
        let mut manager = manager_with(10);
        manager.force_to_sleep(ObjectId(6)).unwrap();
        run_frames(&mut manager, 1, 1);

        let awake_before = manager.awake_instances().to_vec();
        assert!(manager.delete_object(ObjectId(6)).is_some());
        assert_eq!(manager.dormant_count(), 0);
        assert_eq!(manager.awake_instances(), awake_before.as_slice());
        assert!(!manager.all_instances().contains(&ObjectId(6)));
        manager.validate_partition().unwrap();
        assert!(!manager.search(&square(6)).contains(&ObjectId(6)));
    }

    #[test]
    fn test_delete_unknown_object() {
        let mut manager = manager_with(2);
        assert!(manager.delete_object(ObjectId(42)).is_none());
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_deleted_id_can_be_reused() {
        let mut manager = manager_with(10);
        run_frames(&mut manager, 1, 60);
        manager.delete_object(ObjectId(3));

        manager
            .add_object(SceneObject::new(ObjectId(3), square(3), 60))
            .unwrap();
        assert_eq!(manager.awake_instances(), &[ObjectId(3)]);
        assert_eq!(manager.dormant_count(), 9);
        manager.validate_partition().unwrap();
    }

    #[test]
    fn test_secondary_listener_is_returned_once() {
        let mut manager = manager_with(10);
        run_frames(&mut manager, 1, 60);

        let lighting = WakeListener(1);
        manager.register_on_waking_up(ObjectId(8), lighting).unwrap();
        assert_eq!(
            manager.register_on_waking_up(ObjectId(99), lighting),
            Err(IndexError::UnknownObject(ObjectId(99)))
        );

        assert_eq!(manager.wake_up(ObjectId(8), 61), vec![lighting]);
        assert_eq!(manager.awake_instances(), &[ObjectId(8)]);

        // Consumed: the next cycle does not report it again
        run_frames(&mut manager, 62, 121);
        assert!(manager.wake_up(ObjectId(8), 122).is_empty());
        manager.validate_partition().unwrap();
    }

    #[test]
    fn test_listener_registered_while_awake_is_dropped_on_sleep() {
        let mut manager = manager_with(10);
        manager
            .register_on_waking_up(ObjectId(8), WakeListener(1))
            .unwrap();
        run_frames(&mut manager, 1, 60);

        assert!(manager.wake_up(ObjectId(8), 61).is_empty());
        assert_eq!(manager.awake_instances(), &[ObjectId(8)]);
    }

    #[test]
    fn test_wake_up_unknown_object() {
        let mut manager = manager_with(1);
        assert!(manager.wake_up(ObjectId(5), 1).is_empty());
        assert!(!manager.is_awake(ObjectId(5)));
    }

    #[test]
    fn test_custom_frames_before_sleep() {
        let config = IndexConfig {
            frames_before_sleep: 5,
            ..Default::default()
        };
        let mut manager = ObjectManager::with_config(config).unwrap();
        manager
            .add_object(SceneObject::new(ObjectId(0), square(0), 0))
            .unwrap();

        run_frames(&mut manager, 1, 4);
        assert_eq!(manager.awake_instances().len(), 1);
        run_frames(&mut manager, 5, 5);
        assert!(manager.awake_instances().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = IndexConfig {
            frames_before_sleep: 0,
            ..Default::default()
        };
        assert!(ObjectManager::<SceneObject>::with_config(config).is_err());
    }

    #[test]
    fn test_counters_and_clear() {
        let mut manager = manager_with(10);
        manager.force_to_sleep(ObjectId(0)).unwrap();
        manager.force_to_sleep(ObjectId(1)).unwrap();
        run_frames(&mut manager, 1, 1);

        assert_eq!(
            manager.counters(),
            ManagerCounters {
                all: 10,
                awake: 8,
                dormant: 2,
            }
        );

        manager.clear();
        assert!(manager.is_empty());
        assert_eq!(manager.counters(), ManagerCounters::default());
        manager.validate_partition().unwrap();
    }

    #[test]
    fn test_validate_partition_detects_duplicates() {
        let mut manager = manager_with(2);
        manager.awake_instances.push(ObjectId(0));
        assert!(matches!(
            manager.validate_partition(),
            Err(IndexError::PartitionViolation { id: ObjectId(0), .. })
        ));
    }

    #[test]
    fn test_validate_partition_detects_missing_membership() {
        let mut manager = manager_with(2);
        manager.awake_instances.retain(|&id| id != ObjectId(1));
        assert!(manager.validate_partition().is_err());
    }

    #[test]
    fn test_example_scenario() {
        let mut manager = manager_with(10);

        run_frames(&mut manager, 1, 60);
        assert_eq!(manager.awake_instances().len(), 0);

        manager
            .object_mut(ObjectId(3))
            .unwrap()
            .set_aabb(square(3).translated(1.0, 0.0));
        manager.wake_up(ObjectId(3), 61);
        assert_eq!(manager.awake_instances(), &[ObjectId(3)]);

        let found = manager.search(&Aabb::new(0.0, 0.0, 100.0, 5.0));
        assert_eq!(found.len(), 10);
        assert_eq!(found.last(), Some(&ObjectId(3)));
    }
}
