//! Order lifecycle controller.
//!
//! Owns the single piece of mutable state, the currently open order, and
//! decides at each wake-up whether to create an order, settle its bond, or
//! cancel it. External failures must never corrupt that state:
//! - the order id is captured only after creation succeeds;
//! - bond settlement failures leave the id in place, since the order exists
//!   on the marketplace regardless;
//! - cancellation clears the id unconditionally, because the marketplace
//!   rejecting an already-terminal order is indistinguishable from the order
//!   never having existed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use robo_core::{OrderId, OrderSpec, SchedulePhase, ScheduleWindow};
use robo_market::MarketApi;
use robo_wallet::WalletApi;

fn default_bond_attempts() -> u32 {
    3
}

fn default_bond_retry_delay_secs() -> u64 {
    5
}

/// Bond settlement retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPolicy {
    /// Attempts of the fetch-invoice + pay sequence per created order.
    #[serde(default = "default_bond_attempts")]
    pub attempts: u32,
    /// Pause between attempts, in seconds.
    #[serde(default = "default_bond_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for BondPolicy {
    fn default() -> Self {
        Self {
            attempts: default_bond_attempts(),
            retry_delay_secs: default_bond_retry_delay_secs(),
        }
    }
}

/// What a single wake-up did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// An order was created. `bond_settled` reports whether the bond payment
    /// went through within the retry budget.
    Opened { id: OrderId, bond_settled: bool },
    /// Order creation failed; nothing was mutated.
    OpenFailed,
    /// The open order was cancelled (best-effort) and forgotten.
    Closed(OrderId),
    /// Nothing to do at this hour.
    Idle,
}

/// The scheduler/state machine driving the maker lifecycle.
///
/// Generic over the client traits so tests run against mocks. The
/// `current_order` guard is the idempotency mechanism: without it, every
/// wake-up inside a matching hour would create or cancel again.
pub struct MakerController<M, W> {
    market: M,
    wallet: W,
    spec: OrderSpec,
    window: ScheduleWindow,
    wallet_id: String,
    bond: BondPolicy,
    current_order: Option<OrderId>,
}

impl<M: MarketApi, W: WalletApi> MakerController<M, W> {
    pub fn new(
        market: M,
        wallet: W,
        spec: OrderSpec,
        window: ScheduleWindow,
        wallet_id: impl Into<String>,
        bond: BondPolicy,
    ) -> Self {
        Self {
            market,
            wallet,
            spec,
            window,
            wallet_id: wallet_id.into(),
            bond,
            current_order: None,
        }
    }

    /// The currently tracked order, if any.
    pub fn current_order(&self) -> Option<OrderId> {
        self.current_order
    }

    /// Run one wake-up against the given instant.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let phase = self.window.phase_at(now);
        debug!(
            hour = self.window.local_hour(now),
            ?phase,
            order = ?self.current_order,
            "Wake-up"
        );

        match (phase, self.current_order) {
            (SchedulePhase::OpenHour, None) => self.open_order().await,
            (SchedulePhase::CloseHour, Some(id)) => self.close_order(id).await,
            _ => TickOutcome::Idle,
        }
    }

    /// Create the daily order and settle its bond.
    async fn open_order(&mut self) -> TickOutcome {
        let created = match self.market.create_order(&self.spec).await {
            Ok(created) => created,
            Err(e) => {
                // State stays clean, so the next matching wake-up retries.
                error!(error = %e, transient = e.is_transient(), "Order creation failed");
                return TickOutcome::OpenFailed;
            }
        };

        let id = OrderId::new(created.id);
        self.current_order = Some(id);
        info!(order_id = %id, "Order opened");

        let bond_settled = self.settle_bond(id).await;
        if !bond_settled {
            // The order exists on the marketplace either way; keep tracking
            // it so the close hour still cancels it.
            warn!(order_id = %id, "Bond not settled; order stays tracked");
        }

        TickOutcome::Opened { id, bond_settled }
    }

    /// Fetch the bond invoice and pay it, retrying the whole sequence up to
    /// the configured budget.
    async fn settle_bond(&self, id: OrderId) -> bool {
        for attempt in 1..=self.bond.attempts {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_secs(self.bond.retry_delay_secs)).await;
            }

            let details = match self.market.fetch_order(id).await {
                Ok(details) => details,
                Err(e) => {
                    warn!(order_id = %id, attempt, error = %e, "Fetching order details failed");
                    continue;
                }
            };

            let invoice = match details.bond_invoice {
                Some(invoice) => invoice,
                None => {
                    warn!(order_id = %id, attempt, "Order details carry no bond invoice");
                    continue;
                }
            };

            match self.wallet.pay_invoice(&invoice, &self.wallet_id).await {
                Ok(outcome) => {
                    info!(order_id = %id, status = ?outcome.status, "Bond settled");
                    return true;
                }
                Err(e) => {
                    warn!(order_id = %id, attempt, error = %e, "Bond payment failed");
                }
            }
        }

        error!(order_id = %id, attempts = self.bond.attempts, "Bond settlement gave up");
        false
    }

    /// Cancel the open order and forget it.
    async fn close_order(&mut self, id: OrderId) -> TickOutcome {
        match self.market.cancel_order(id).await {
            Ok(_) => info!(order_id = %id, "Order cancelled"),
            Err(e) => {
                // Expected for orders that already reached a terminal state.
                warn!(order_id = %id, error = %e, "Cancellation reported an error; assuming the order is already terminal");
            }
        }

        self.current_order = None;
        TickOutcome::Closed(id)
    }
}
