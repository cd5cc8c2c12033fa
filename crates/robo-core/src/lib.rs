//! Core domain types for the robo-maker bot.
//!
//! This crate provides the fundamental pieces shared by the clients and the
//! lifecycle controller:
//! - `OrderSide`, `OrderAmount`, `OrderSpec`, `OrderId`: order domain model
//! - `credential`: marketplace credential derivation (SHA-256 + base-91)
//! - `ScheduleWindow`: daily open/close hour evaluation in a fixed timezone

pub mod credential;
pub mod error;
pub mod order;
pub mod schedule;

pub use credential::{encode_base91, hash_token};
pub use error::{CoreError, Result};
pub use order::{OrderAmount, OrderId, OrderSide, OrderSpec};
pub use schedule::{SchedulePhase, ScheduleWindow};
