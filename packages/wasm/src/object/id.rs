//! Identity of scene objects.
//!
//! The scene runtime numbers its objects and hands those numbers to the
//! index as is. A number can come back after its object was deleted, so
//! an id names "the object currently tracked under this number", never a
//! slot in one of the manager's containers.

use std::fmt;

/// Runtime-assigned object number, unique among the live objects of one
/// scene.
///
/// Ordered so that query results can be sorted for stable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

impl From<u32> for ObjectId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<ObjectId> for u32 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
