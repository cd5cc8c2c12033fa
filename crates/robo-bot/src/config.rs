//! Application configuration.
//!
//! Everything except the two secrets lives in a TOML file; the marketplace
//! token and the wallet API key come from the environment so the file can be
//! committed.

use robo_core::{OrderAmount, OrderSide, OrderSpec, ScheduleWindow};
use robo_market::MarketConfig;
use robo_wallet::WalletConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::controller::BondPolicy;
use crate::error::{AppError, AppResult};

/// Environment variable carrying the marketplace account token.
pub const TOKEN_ENV: &str = "ROBOSATS_TOKEN";

/// Environment variable carrying the wallet API key.
pub const API_KEY_ENV: &str = "BLINK_API_KEY";

fn default_open_hour() -> u32 {
    6
}

fn default_close_hour() -> u32 {
    23
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

fn default_poll_interval_secs() -> u64 {
    60
}

/// Daily schedule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Hour of day at which to create the order.
    #[serde(default = "default_open_hour")]
    pub open_hour: u32,
    /// Hour of day at which to cancel it.
    #[serde(default = "default_close_hour")]
    pub close_hour: u32,
    /// IANA timezone the hours are evaluated in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Seconds between wake-ups.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
            timezone: default_timezone(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl ScheduleConfig {
    /// Build the validated schedule window.
    pub fn to_window(&self) -> AppResult<ScheduleWindow> {
        let tz: chrono_tz::Tz = self
            .timezone
            .parse()
            .map_err(|_| AppError::Config(format!("Unknown timezone: {}", self.timezone)))?;
        Ok(ScheduleWindow::new(self.open_hour, self.close_hour, tz)?)
    }
}

fn default_public_duration_secs() -> u32 {
    54_000 // 15 hours
}

fn default_escrow_duration_secs() -> u32 {
    10_800 // 3 hours
}

fn default_bond_size() -> Decimal {
    Decimal::new(30, 1) // 3.0
}

/// Maker order configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// "buy" or "sell".
    pub side: OrderSide,
    /// Numeric marketplace currency code (1 = USD, 2 = EUR, ...).
    pub currency: u16,
    /// Fixed fiat amount. Mutually exclusive with `min_amount`/`max_amount`.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Lower bound of a published amount range.
    #[serde(default)]
    pub min_amount: Option<Decimal>,
    /// Upper bound of a published amount range.
    #[serde(default)]
    pub max_amount: Option<Decimal>,
    /// Payment method label shown to takers.
    pub payment_method: String,
    /// Premium over the market rate, percent. May be negative.
    pub premium: Decimal,
    #[serde(default = "default_public_duration_secs")]
    pub public_duration_secs: u32,
    #[serde(default = "default_escrow_duration_secs")]
    pub escrow_duration_secs: u32,
    /// Bond size, percent of the trade amount.
    #[serde(default = "default_bond_size")]
    pub bond_size: Decimal,
}

impl OrderConfig {
    /// Build the validated order spec.
    pub fn to_spec(&self) -> AppResult<OrderSpec> {
        let amount = match (self.amount, self.min_amount, self.max_amount) {
            (Some(v), None, None) => OrderAmount::Fixed(v),
            (None, Some(min), Some(max)) => OrderAmount::Range { min, max },
            (Some(_), _, _) => {
                return Err(AppError::Config(
                    "amount and min_amount/max_amount are mutually exclusive".to_string(),
                ))
            }
            _ => {
                return Err(AppError::Config(
                    "either amount or both min_amount and max_amount must be set".to_string(),
                ))
            }
        };

        let spec = OrderSpec {
            side: self.side,
            currency: self.currency,
            amount,
            payment_method: self.payment_method.clone(),
            premium: self.premium,
            public_duration_secs: self.public_duration_secs,
            escrow_duration_secs: self.escrow_duration_secs,
            bond_size: self.bond_size,
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Marketplace client configuration.
    #[serde(default)]
    pub market: MarketConfig,
    /// Wallet client configuration.
    #[serde(default)]
    pub wallet: WalletConfig,
    /// Daily schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Maker order parameters.
    pub order: OrderConfig,
    /// Bond settlement retry policy.
    #[serde(default)]
    pub bond: BondPolicy,
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}

/// Secrets loaded from the environment.
#[derive(Clone)]
pub struct Secrets {
    /// Raw marketplace account token. Only the derived credential is ever
    /// transmitted or logged.
    pub robosats_token: String,
    /// Wallet service API key.
    pub blink_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets").finish_non_exhaustive()
    }
}

impl Secrets {
    pub fn from_env() -> AppResult<Self> {
        let robosats_token = std::env::var(TOKEN_ENV)
            .map_err(|_| AppError::Config(format!("{TOKEN_ENV} is not set")))?;
        let blink_api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AppError::Config(format!("{API_KEY_ENV} is not set")))?;

        Ok(Self {
            robosats_token,
            blink_api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
        [order]
        side = "sell"
        currency = 2
        amount = "100"
        payment_method = "Instant SEPA"
        premium = "3.5"
    "#;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.schedule.open_hour, 6);
        assert_eq!(config.schedule.close_hour, 23);
        assert_eq!(config.schedule.timezone, "America/Sao_Paulo");
        assert_eq!(config.schedule.poll_interval_secs, 60);
        assert_eq!(config.market.host, robo_market::DEFAULT_HOST);
        assert_eq!(config.wallet.currency, "BTC");
        assert_eq!(config.bond.attempts, 3);
        assert_eq!(config.order.public_duration_secs, 54_000);
        assert_eq!(config.order.escrow_duration_secs, 10_800);
        assert_eq!(config.order.bond_size, dec!(3.0));
    }

    #[test]
    fn test_fixed_amount_spec() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        let spec = config.order.to_spec().unwrap();

        assert_eq!(spec.amount, OrderAmount::Fixed(dec!(100)));
        assert_eq!(spec.side, OrderSide::Sell);
    }

    #[test]
    fn test_range_amount_spec() {
        let toml_str = r#"
            [order]
            side = "buy"
            currency = 1
            min_amount = "50"
            max_amount = "200"
            payment_method = "Zelle"
            premium = "-0.5"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        let spec = config.order.to_spec().unwrap();

        assert_eq!(
            spec.amount,
            OrderAmount::Range {
                min: dec!(50),
                max: dec!(200),
            }
        );
        assert_eq!(spec.premium, dec!(-0.5));
    }

    #[test]
    fn test_amount_and_range_are_mutually_exclusive() {
        let toml_str = r#"
            [order]
            side = "buy"
            currency = 1
            amount = "100"
            min_amount = "50"
            max_amount = "200"
            payment_method = "Zelle"
            premium = "1"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.order.to_spec().is_err());
    }

    #[test]
    fn test_partial_range_is_rejected() {
        let toml_str = r#"
            [order]
            side = "buy"
            currency = 1
            min_amount = "50"
            payment_method = "Zelle"
            premium = "1"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.order.to_spec().is_err());
    }

    #[test]
    fn test_schedule_window_construction() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        let window = config.schedule.to_window().unwrap();
        assert_eq!(window.timezone(), chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let mut config: AppConfig = toml::from_str(SAMPLE).unwrap();
        config.schedule.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.schedule.to_window().is_err());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        let serialized = toml::to_string(&config).unwrap();
        let reparsed: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(reparsed.schedule.open_hour, config.schedule.open_hour);
        assert_eq!(reparsed.order.payment_method, config.order.payment_method);
    }

    #[test]
    fn test_secrets_debug_redacts() {
        let secrets = Secrets {
            robosats_token: "super-secret".to_string(),
            blink_api_key: "also-secret".to_string(),
        };
        let debug = format!("{secrets:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("also-secret"));
    }
}
