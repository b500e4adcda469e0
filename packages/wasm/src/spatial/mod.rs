//! Spatial indexing for rectangle queries.
//!
//! This module provides an R-tree based index keyed by each object's
//! bounding box. It is the dormant half of the object manager and the
//! whole of the obstacle index.

mod rtree;

pub use rtree::{IndexedObject, SpatialIndex};
