//! Marketplace REST client for the robo-maker bot.
//!
//! The marketplace is only reachable as an onion service, so the real client
//! speaks plain HTTP through a local Tor SOCKS5 proxy. The lifecycle
//! controller depends on the `MarketApi` trait, never on the HTTP client
//! directly; `MockMarketApi` substitutes for it in tests.

pub mod client;
pub mod error;
pub mod types;

pub use client::{
    BoxFuture, MarketApi, MarketCall, MarketConfig, MockMarketApi, TorMarketClient, DEFAULT_HOST,
    DEFAULT_PROXY,
};
pub use error::{MarketError, MarketResult};
pub use types::{MakeOrderForm, OrderCreated, OrderDetails};
