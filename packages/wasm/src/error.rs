//! Error types for the scene index.
//!
//! Hot-path lookups return `Option`/`bool`; these errors cover structural
//! misuse (duplicate ids, bad configuration) and invariant checks.

use thiserror::Error;

use crate::object::ObjectId;

/// Result type for scene index operations.
pub type Result<T, E = IndexError> = std::result::Result<T, E>;

/// Scene index errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// The object is already tracked by this manager.
    #[error("{0} is already tracked")]
    DuplicateObject(ObjectId),

    /// The object is not tracked by this manager.
    #[error("{0} is not tracked")]
    UnknownObject(ObjectId),

    /// The object's bounds have a NaN or infinite coordinate.
    #[error("{0} has non-finite bounds")]
    NonFiniteBounds(ObjectId),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An object is in the wrong container, or in both, or in neither.
    #[error("partition violated for {id}: {reason}")]
    PartitionViolation { id: ObjectId, reason: String },
}
