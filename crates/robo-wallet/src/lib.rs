//! Wallet client for the robo-maker bot.
//!
//! Talks to a Galoy-style GraphQL wallet API (Blink) to resolve the
//! settlement wallet and pay maker-bond invoices. The lifecycle controller
//! depends on the `WalletApi` trait; `MockWalletApi` substitutes for it in
//! tests.

pub mod client;
pub mod error;
pub mod types;

pub use client::{
    BlinkClient, BoxFuture, MockWalletApi, WalletApi, WalletCall, WalletConfig, DEFAULT_ENDPOINT,
};
pub use error::{WalletError, WalletResult};
pub use types::{find_wallet, PaymentError, PaymentOutcome, WalletInfo};
