//! Error types for the relation data layer.

use thiserror::Error;

/// Result type alias for relation-layer operations.
pub type RelationResult<T> = Result<T, RelationError>;

/// Errors that can occur while manipulating relation data.
#[derive(Debug, Error)]
pub enum RelationError {
    #[error("invalid relation id {0:?}: expected \"<endpoint>:<number>\"")]
    InvalidId(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),
}
