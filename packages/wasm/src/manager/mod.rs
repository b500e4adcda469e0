//! Object containers answering "which objects are near this area?".
//!
//! - `ObjectManager`: awake objects in a flat list, dormant objects in the
//!   spatial index, queries combine both.
//! - `ObstacleIndex`: always-indexed variant for objects that rarely
//!   change, with deferred updates.

mod object_manager;
mod obstacle;

pub use object_manager::{ManagerCounters, ObjectManager};
pub use obstacle::{ObstacleCounters, ObstacleIndex};
