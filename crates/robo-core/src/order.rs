//! Order domain types.
//!
//! Provides the order side, amount, spec, and identifier types shared by the
//! marketplace client and the lifecycle controller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Order side: buy or sell, from the maker's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Marketplace wire code: 0 for buy, 1 for sell.
    pub fn wire_code(&self) -> u8 {
        match self {
            Self::Buy => 0,
            Self::Sell => 1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Fiat amount of an order: a single value or a published min/max range.
///
/// The marketplace treats these as mutually exclusive; modelling them as an
/// enum makes the exclusivity structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderAmount {
    Fixed(Decimal),
    Range { min: Decimal, max: Decimal },
}

impl OrderAmount {
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. })
    }
}

/// Parameters for a maker order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub side: OrderSide,
    /// Numeric fiat currency code as published by the marketplace
    /// (1 = USD, 2 = EUR, ...). Passed through, not validated.
    pub currency: u16,
    pub amount: OrderAmount,
    /// Free-form payment method label shown to takers.
    pub payment_method: String,
    /// Premium over the market exchange rate, in percent. May be negative.
    pub premium: Decimal,
    /// How long the order stays public, in seconds.
    pub public_duration_secs: u32,
    /// Escrow lifetime once the order is taken, in seconds.
    pub escrow_duration_secs: u32,
    /// Bond size as a percentage of the trade amount.
    pub bond_size: Decimal,
}

impl OrderSpec {
    /// Validate cross-field invariants.
    pub fn validate(&self) -> Result<()> {
        if let OrderAmount::Range { min, max } = &self.amount {
            if min > max {
                return Err(CoreError::InvalidOrderSpec(format!(
                    "range minimum {min} exceeds maximum {max}"
                )));
            }
        }
        if self.payment_method.is_empty() {
            return Err(CoreError::InvalidOrderSpec(
                "payment method must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Marketplace-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(i64);

impl OrderId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
