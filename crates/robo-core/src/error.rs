//! Error types for robo-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid order spec: {0}")]
    InvalidOrderSpec(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
