//! Wire types for the marketplace REST API.
//!
//! Only the fields the controller needs are typed; unknown response fields
//! are ignored.

use robo_core::{OrderAmount, OrderSpec};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Form body for the create-order endpoint.
///
/// Field names and encodings mirror the marketplace's form contract. Absent
/// optional fields are omitted from the body entirely rather than sent empty.
#[derive(Debug, Serialize)]
pub struct MakeOrderForm {
    /// 0: buy, 1: sell.
    #[serde(rename = "type")]
    pub order_type: u8,
    pub currency: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub payment_method: String,
    /// Amounts are fiat-denominated, never explicit satoshis.
    pub is_explicit: bool,
    pub premium: Decimal,
    pub public_duration: u32,
    pub escrow_duration: u32,
    pub bond_size: Decimal,
    pub has_range: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
}

impl MakeOrderForm {
    pub fn from_spec(spec: &OrderSpec) -> Self {
        let (amount, min_amount, max_amount, has_range) = match &spec.amount {
            OrderAmount::Fixed(v) => (Some(*v), None, None, false),
            OrderAmount::Range { min, max } => (None, Some(*min), Some(*max), true),
        };

        Self {
            order_type: spec.side.wire_code(),
            currency: spec.currency,
            amount,
            payment_method: spec.payment_method.clone(),
            is_explicit: false,
            premium: spec.premium,
            public_duration: spec.public_duration_secs,
            escrow_duration: spec.escrow_duration_secs,
            bond_size: spec.bond_size,
            has_range,
            min_amount,
            max_amount,
        }
    }
}

/// Response of a successful create-order call.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreated {
    pub id: i64,
}

/// Order detail document.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDetails {
    #[serde(default)]
    pub id: Option<i64>,
    /// Marketplace status code of the order.
    #[serde(default)]
    pub status: Option<i64>,
    /// Lightning invoice for the maker bond. Present while the marketplace
    /// waits for the bond to be locked; absent once settled or expired.
    #[serde(default)]
    pub bond_invoice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use robo_core::OrderSide;
    use rust_decimal_macros::dec;

    fn spec(amount: OrderAmount) -> OrderSpec {
        OrderSpec {
            side: OrderSide::Sell,
            currency: 2,
            amount,
            payment_method: "Instant SEPA".to_string(),
            premium: dec!(3.5),
            public_duration_secs: 54_000,
            escrow_duration_secs: 10_800,
            bond_size: dec!(3.0),
        }
    }

    #[test]
    fn test_fixed_amount_form_omits_range_fields() {
        let form = MakeOrderForm::from_spec(&spec(OrderAmount::Fixed(dec!(100))));
        let json = serde_json::to_value(&form).unwrap();

        assert_eq!(json["type"], 1);
        assert_eq!(json["currency"], 2);
        assert_eq!(json["amount"], "100");
        assert_eq!(json["has_range"], false);
        assert_eq!(json["is_explicit"], false);
        assert!(json.get("min_amount").is_none());
        assert!(json.get("max_amount").is_none());
    }

    #[test]
    fn test_range_amount_form_omits_fixed_amount() {
        let form = MakeOrderForm::from_spec(&spec(OrderAmount::Range {
            min: dec!(50),
            max: dec!(200),
        }));
        let json = serde_json::to_value(&form).unwrap();

        assert_eq!(json["has_range"], true);
        assert_eq!(json["min_amount"], "50");
        assert_eq!(json["max_amount"], "200");
        assert!(json.get("amount").is_none());
    }

    #[test]
    fn test_order_details_tolerates_missing_fields() {
        let details: OrderDetails = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(details.id, Some(42));
        assert_eq!(details.status, None);
        assert_eq!(details.bond_invoice, None);
    }

    #[test]
    fn test_order_details_carries_bond_invoice() {
        let details: OrderDetails = serde_json::from_str(
            r#"{"id": 42, "status": 0, "bond_invoice": "lnbc123", "maker": 7}"#,
        )
        .unwrap();
        assert_eq!(details.bond_invoice.as_deref(), Some("lnbc123"));
    }
}
