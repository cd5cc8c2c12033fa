//! Wire types for the wallet GraphQL API.

use serde::{Deserialize, Serialize};

/// GraphQL request envelope.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<V: Serialize> {
    pub query: &'static str,
    pub variables: V,
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlErrorEntry>,
}

/// Top-level GraphQL error entry.
#[derive(Debug, Deserialize)]
pub struct GraphqlErrorEntry {
    #[serde(default)]
    pub message: String,
}

/// Payload of the wallet-list query.
#[derive(Debug, Deserialize)]
pub struct MeData {
    #[serde(default)]
    pub me: Option<Me>,
}

#[derive(Debug, Deserialize)]
pub struct Me {
    #[serde(rename = "defaultAccount", default)]
    pub default_account: Option<DefaultAccount>,
}

#[derive(Debug, Deserialize)]
pub struct DefaultAccount {
    #[serde(default)]
    pub wallets: Vec<WalletInfo>,
}

/// One wallet of the account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalletInfo {
    pub id: String,
    #[serde(rename = "walletCurrency")]
    pub currency: String,
    /// Balance in the wallet's minor unit (satoshis for BTC wallets).
    #[serde(default)]
    pub balance: i64,
}

/// Select the first wallet denominated in `currency`.
pub fn find_wallet<'a>(wallets: &'a [WalletInfo], currency: &str) -> Option<&'a WalletInfo> {
    wallets.iter().find(|w| w.currency == currency)
}

/// Payload of the invoice-payment mutation.
#[derive(Debug, Deserialize)]
pub struct PaymentData {
    #[serde(rename = "lnInvoicePaymentSend", default)]
    pub ln_invoice_payment_send: Option<PaymentOutcome>,
}

/// Result of an invoice payment attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOutcome {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Vec<PaymentError>,
}

impl PaymentOutcome {
    /// Failure description, if the wallet reported one. `None` means the
    /// payment settled or is still in flight, both of which count as success
    /// for bond settlement.
    pub fn failure_message(&self) -> Option<String> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self
                .errors
                .iter()
                .filter_map(|e| e.message.as_deref())
                .collect();
            return Some(messages.join("; "));
        }
        if self.status.as_deref() == Some("FAILURE") {
            return Some("payment status FAILURE".to_string());
        }
        None
    }
}

/// Structured error of a payment attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<serde_json::Value>,
    #[serde(default)]
    pub code: Option<String>,
}
