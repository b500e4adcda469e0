//! The trackable-object contract and the concrete object used by the
//! JavaScript facade.

use super::{Aabb, ObjectId};
use crate::sleep::{FrameIndex, SleepState};

/// An object that can be tracked by an [`crate::manager::ObjectManager`].
///
/// Implementors own their [`SleepState`]; the manager reads the bounding
/// box when the object falls asleep and indexes that snapshot.
pub trait SpatialObject {
    /// Stable identity of the object.
    fn id(&self) -> ObjectId;

    /// Current bounding box in scene space.
    fn aabb(&self) -> Aabb;

    fn sleep_state(&self) -> &SleepState;

    fn sleep_state_mut(&mut self) -> &mut SleepState;

    /// Whether the object must stay awake even without moving, e.g.
    /// because a timer or an animation is still running on it.
    fn is_needing_to_be_awake(&self) -> bool {
        false
    }
}

/// A plain object: identity, bounds and a "needs to be awake" flag.
#[derive(Debug, Clone)]
pub struct SceneObject {
    id: ObjectId,
    aabb: Aabb,
    needs_to_be_awake: bool,
    sleep_state: SleepState,
}

impl SceneObject {
    /// Create an awake object whose last activity is `frame`.
    pub fn new(id: ObjectId, aabb: Aabb, frame: FrameIndex) -> Self {
        Self {
            id,
            aabb,
            needs_to_be_awake: false,
            sleep_state: SleepState::new(frame),
        }
    }

    /// Create an object with an explicit initial sleep state.
    pub fn with_sleep_state(id: ObjectId, aabb: Aabb, sleep_state: SleepState) -> Self {
        Self {
            id,
            aabb,
            needs_to_be_awake: false,
            sleep_state,
        }
    }

    /// Replace the bounds.
    ///
    /// This does not wake the object: moving objects must be woken
    /// through their manager so that the index stays consistent.
    pub fn set_aabb(&mut self, aabb: Aabb) {
        self.aabb = aabb;
    }

    pub fn set_needs_to_be_awake(&mut self, needs_to_be_awake: bool) {
        self.needs_to_be_awake = needs_to_be_awake;
    }
}

impl SpatialObject for SceneObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn aabb(&self) -> Aabb {
        self.aabb
    }

    fn sleep_state(&self) -> &SleepState {
        &self.sleep_state
    }

    fn sleep_state_mut(&mut self) -> &mut SleepState {
        &mut self.sleep_state
    }

    fn is_needing_to_be_awake(&self) -> bool {
        self.needs_to_be_awake
    }
}
