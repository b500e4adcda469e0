//! The per-frame sweep over awake objects.

use std::collections::HashMap;

use super::state::{FrameIndex, WakeListener};
use crate::object::{ObjectId, SpatialObject};

/// Sweep the awake set once and park every object that can sleep.
///
/// For each awake object, in order: refresh its activity if it still needs
/// to be awake, then check whether it can sleep. Sleeping objects are
/// dropped from `awake` (read/write compaction, order of the kept objects
/// is preserved), marked Asleep, handed to `on_fallen_asleep`, and armed
/// with `listener` so that the owner hears about the next wake-up.
///
/// Objects with non-finite bounds cannot be indexed and stay awake.
///
/// Listeners left over on an object that is still awake going into sleep
/// are cleared first, so a container that already dropped the object
/// cannot re-insert it twice on the next wake-up.
///
/// Returns the number of objects that fell asleep.
pub fn update_awake_objects<T, F>(
    awake: &mut Vec<ObjectId>,
    objects: &mut HashMap<ObjectId, T>,
    frame: FrameIndex,
    frames_before_sleep: u64,
    listener: WakeListener,
    mut on_fallen_asleep: F,
) -> usize
where
    T: SpatialObject,
    F: FnMut(&T),
{
    let mut write = 0;
    let mut fallen_asleep = 0;

    for read in 0..awake.len() {
        let id = awake[read];
        let Some(object) = objects.get_mut(&id) else {
            log::warn!("{id} is in the awake set but is not tracked, dropping it");
            continue;
        };

        let is_needing_to_be_awake = object.is_needing_to_be_awake();
        let is_indexable = object.aabb().is_finite();
        let state = object.sleep_state_mut();
        state.try_to_sleep(frame, is_needing_to_be_awake);

        let can_sleep = state.can_sleep_within(frame, frames_before_sleep) || !state.is_awake();
        if can_sleep && !is_indexable {
            log::warn!("{id} has non-finite bounds, keeping it awake");
            if !state.is_awake() {
                state.wake_up(frame, |_| {});
            }
            awake[write] = id;
            write += 1;
        } else if can_sleep {
            if state.is_awake() {
                state.clear_waking_up_listeners();
            }
            state.fall_asleep();
            on_fallen_asleep(object);
            object.sleep_state_mut().register_on_waking_up(listener);
            fallen_asleep += 1;
        } else {
            awake[write] = id;
            write += 1;
        }
    }

    awake.truncate(write);
    fallen_asleep
}
