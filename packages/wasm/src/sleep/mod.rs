//! Frame-counted object dormancy.
//!
//! Objects that have not been touched for a number of frames are parked
//! in the spatial index and skipped by the per-frame sweep. Any mutation
//! wakes them up again through a single-shot listener list.

mod state;
mod sweep;

pub use state::{FrameIndex, SleepState, SleepStatus, WakeListener, FRAMES_BEFORE_SLEEP};
pub use sweep::update_awake_objects;
