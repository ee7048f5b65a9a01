//! State storage error types.
//!
//! Used by every backend; callers decide whether a failed backend call is fatal.

use thiserror::Error;

/// Errors that can occur when using state storage operations.
#[derive(Error, Debug)]
pub enum StateStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, StateStorageError>;
