//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] robo_core::CoreError),

    #[error("Marketplace error: {0}")]
    Market(#[from] robo_market::MarketError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] robo_wallet::WalletError),

    #[error("Preflight error: {0}")]
    Preflight(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
