//! RoboSats maker bot.
//!
//! Main application that orchestrates:
//! - Marketplace client over the Tor SOCKS5 tunnel
//! - Wallet client for bond settlement
//! - The time-driven order lifecycle controller

pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::{AppConfig, Secrets};
pub use controller::{BondPolicy, MakerController, TickOutcome};
pub use error::{AppError, AppResult};
