//! Trackable scene objects.
//!
//! An object is anything with a stable identity, a bounding box and a
//! sleep state. The manager only ever talks to objects through the
//! [`SpatialObject`] trait.

mod aabb;
mod id;
mod scene_object;

pub use aabb::Aabb;
pub use id::ObjectId;
pub use scene_object::{SceneObject, SpatialObject};
