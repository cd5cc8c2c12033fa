//! Main application orchestration.
//!
//! Wires the real clients, validates configuration against the live services
//! at startup (preflight), and drives the controller on the poll interval.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use robo_market::{MarketApi, TorMarketClient};
use robo_wallet::{find_wallet, BlinkClient, WalletApi};

use crate::config::{AppConfig, Secrets};
use crate::controller::{MakerController, TickOutcome};
use crate::error::{AppError, AppResult};

/// Main application.
pub struct Application {
    config: AppConfig,
    market: TorMarketClient,
    wallet: BlinkClient,
    wallet_id: Option<String>,
}

impl Application {
    /// Create the application and its clients.
    ///
    /// Note: the settlement wallet is not resolved yet. Call
    /// `run_preflight()` before `run()`.
    pub fn new(config: AppConfig, secrets: Secrets) -> AppResult<Self> {
        // Validate order and schedule up front so a bad config file fails
        // before any network traffic.
        config.order.to_spec()?;
        config.schedule.to_window()?;

        let market = TorMarketClient::new(&config.market, secrets.robosats_token)?;
        let wallet = BlinkClient::new(&config.wallet, secrets.blink_api_key)?;

        Ok(Self {
            config,
            market,
            wallet,
            wallet_id: None,
        })
    }

    /// Probe both services and resolve the settlement wallet.
    ///
    /// A missing or malformed wallet list is a configuration problem and
    /// must surface here, not mid-loop at the first bond payment.
    pub async fn run_preflight(&mut self) -> AppResult<()> {
        info!(host = %self.config.market.host, "Probing marketplace");
        let info = self.market.info().await?;
        info!(info = %info, "Marketplace info");

        let wallets = self.wallet.wallets().await?;
        let currency = &self.config.wallet.currency;
        let wallet = find_wallet(&wallets, currency).ok_or_else(|| {
            AppError::Preflight(format!(
                "no {currency} wallet in the account's wallet list"
            ))
        })?;

        info!(
            wallet_id = %wallet.id,
            currency = %wallet.currency,
            balance = wallet.balance,
            "Resolved settlement wallet"
        );
        self.wallet_id = Some(wallet.id.clone());

        Ok(())
    }

    /// Run the maker loop until the process is killed.
    pub async fn run(self) -> AppResult<()> {
        let wallet_id = self.wallet_id.ok_or_else(|| {
            AppError::Preflight(
                "settlement wallet not resolved; call run_preflight() first".to_string(),
            )
        })?;

        let spec = self.config.order.to_spec()?;
        let window = self.config.schedule.to_window()?;
        let poll = Duration::from_secs(self.config.schedule.poll_interval_secs);

        info!(
            open_hour = self.config.schedule.open_hour,
            close_hour = self.config.schedule.close_hour,
            timezone = %self.config.schedule.timezone,
            poll_secs = poll.as_secs(),
            "Entering maker loop"
        );

        let mut controller = MakerController::new(
            self.market,
            self.wallet,
            spec,
            window,
            wallet_id,
            self.config.bond.clone(),
        );

        let mut ticker = tokio::time::interval(poll);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match controller.tick(Utc::now()).await {
                        TickOutcome::Opened { id, bond_settled } => {
                            info!(order_id = %id, bond_settled, "Open sequence finished");
                        }
                        TickOutcome::OpenFailed => {
                            warn!("Open sequence failed; retrying on the next matching wake-up");
                        }
                        TickOutcome::Closed(id) => {
                            info!(order_id = %id, "Close sequence finished");
                        }
                        TickOutcome::Idle => {}
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Shutting down");
        Ok(())
    }
}
