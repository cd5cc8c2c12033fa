//! Wallet client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    /// Connection or timeout failure before any HTTP status arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// API key rejected by the wallet service.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// GraphQL-level errors returned alongside (or instead of) data.
    #[error("GraphQL error: {0}")]
    Graphql(String),

    /// Response arrived but did not match the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The payment mutation was accepted but the payment itself failed.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WalletError {
    /// Whether a retry can plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, WalletError::Transport(_))
    }
}

pub type WalletResult<T> = Result<T, WalletError>;
