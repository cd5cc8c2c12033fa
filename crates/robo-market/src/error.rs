//! Marketplace client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    /// Connection, proxy, or timeout failure before any HTTP status arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credential rejected by the marketplace.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response arrived but did not match the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarketError {
    /// Whether a retry at a later wake-up can plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, MarketError::Transport(_))
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
