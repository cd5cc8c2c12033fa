//! Wallet client: wallet lookup and invoice payment over GraphQL.
//!
//! Provides a trait-based abstraction over the two wallet operations so the
//! controller can be tested against `MockWalletApi`; `BlinkClient` is the
//! real implementation, authenticated with a static API key header.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{WalletError, WalletResult};
use crate::types::{
    GraphqlRequest, GraphqlResponse, MeData, PaymentData, PaymentOutcome, WalletInfo,
};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Public GraphQL endpoint of the Blink wallet service.
pub const DEFAULT_ENDPOINT: &str = "https://api.blink.sv/graphql";

/// Wallet-list query. Response shape: `me.defaultAccount.wallets[]`.
const WALLET_QUERY: &str =
    "query me { me { defaultAccount { wallets { id walletCurrency balance }}}}";

/// Invoice-payment mutation.
const PAY_INVOICE_MUTATION: &str = "mutation LnInvoicePaymentSend($input: LnInvoicePaymentInput!) {\n  lnInvoicePaymentSend(input: $input) {\n    status\n    errors {\n      message\n      path\n      code\n    }\n  }\n}";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_currency() -> String {
    "BTC".to_string()
}

/// Wallet client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// GraphQL endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Currency tag of the wallet used to settle bonds.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            currency: default_currency(),
        }
    }
}

/// The two wallet operations the lifecycle controller needs.
pub trait WalletApi: Send + Sync {
    /// List the wallets of the account.
    fn wallets(&self) -> BoxFuture<'_, WalletResult<Vec<WalletInfo>>>;

    /// Pay a Lightning invoice from the given wallet.
    fn pay_invoice<'a>(
        &'a self,
        invoice: &'a str,
        wallet_id: &'a str,
    ) -> BoxFuture<'a, WalletResult<PaymentOutcome>>;
}

/// Real client for the Blink GraphQL API.
pub struct BlinkClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl BlinkClient {
    pub fn new(config: &WalletConfig, api_key: impl Into<String>) -> WalletResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WalletError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.into(),
        })
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: Value,
    ) -> WalletResult<T> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| WalletError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::AuthRejected(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| WalletError::Malformed(format!("Failed to parse GraphQL response: {e}")))?;

        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(WalletError::Graphql(messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| WalletError::Malformed("GraphQL response without data".to_string()))
    }

    async fn fetch_wallets(&self) -> WalletResult<Vec<WalletInfo>> {
        debug!("Fetching wallet list");
        let data: MeData = self.graphql(WALLET_QUERY, serde_json::json!({})).await?;

        let wallets = data
            .me
            .ok_or_else(|| WalletError::Malformed("wallet response missing `me`".to_string()))?
            .default_account
            .ok_or_else(|| {
                WalletError::Malformed("wallet response missing `defaultAccount`".to_string())
            })?
            .wallets;

        info!(wallet_count = wallets.len(), "Fetched wallet list");
        Ok(wallets)
    }

    async fn send_payment(&self, invoice: &str, wallet_id: &str) -> WalletResult<PaymentOutcome> {
        info!(wallet_id = %wallet_id, "Paying invoice");
        let variables = serde_json::json!({
            "input": { "paymentRequest": invoice, "walletId": wallet_id }
        });

        let data: PaymentData = self.graphql(PAY_INVOICE_MUTATION, variables).await?;
        let outcome = data.ln_invoice_payment_send.ok_or_else(|| {
            WalletError::Malformed("payment response missing `lnInvoicePaymentSend`".to_string())
        })?;

        if let Some(message) = outcome.failure_message() {
            return Err(WalletError::PaymentFailed(message));
        }

        info!(status = ?outcome.status, "Invoice payment accepted");
        Ok(outcome)
    }
}

impl WalletApi for BlinkClient {
    fn wallets(&self) -> BoxFuture<'_, WalletResult<Vec<WalletInfo>>> {
        Box::pin(self.fetch_wallets())
    }

    fn pay_invoice<'a>(
        &'a self,
        invoice: &'a str,
        wallet_id: &'a str,
    ) -> BoxFuture<'a, WalletResult<PaymentOutcome>> {
        Box::pin(self.send_payment(invoice, wallet_id))
    }
}

impl<T: WalletApi + ?Sized> WalletApi for std::sync::Arc<T> {
    fn wallets(&self) -> BoxFuture<'_, WalletResult<Vec<WalletInfo>>> {
        (**self).wallets()
    }

    fn pay_invoice<'a>(
        &'a self,
        invoice: &'a str,
        wallet_id: &'a str,
    ) -> BoxFuture<'a, WalletResult<PaymentOutcome>> {
        (**self).pay_invoice(invoice, wallet_id)
    }
}

/// A call recorded by `MockWalletApi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCall {
    Wallets,
    Pay { invoice: String, wallet_id: String },
}

/// Mock wallet for controller tests. Scripted like `MockMarketApi`: queued
/// results per operation, benign defaults when the queue is empty.
#[derive(Default)]
pub struct MockWalletApi {
    calls: Mutex<Vec<WalletCall>>,
    wallets_results: Mutex<VecDeque<WalletResult<Vec<WalletInfo>>>>,
    pay_results: Mutex<VecDeque<WalletResult<PaymentOutcome>>>,
}

impl MockWalletApi {
    /// Wallet id returned when no wallet-list result is scripted.
    pub const DEFAULT_WALLET_ID: &'static str = "btc-wallet-1";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_wallets(&self, result: WalletResult<Vec<WalletInfo>>) {
        self.wallets_results.lock().push_back(result);
    }

    pub fn push_pay(&self, result: WalletResult<PaymentOutcome>) {
        self.pay_results.lock().push_back(result);
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<WalletCall> {
        self.calls.lock().clone()
    }

    pub fn pay_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, WalletCall::Pay { .. }))
            .count()
    }

    fn record(&self, call: WalletCall) {
        self.calls.lock().push(call);
    }
}

impl WalletApi for MockWalletApi {
    fn wallets(&self) -> BoxFuture<'_, WalletResult<Vec<WalletInfo>>> {
        Box::pin(async move {
            self.record(WalletCall::Wallets);
            self.wallets_results.lock().pop_front().unwrap_or_else(|| {
                Ok(vec![WalletInfo {
                    id: Self::DEFAULT_WALLET_ID.to_string(),
                    currency: "BTC".to_string(),
                    balance: 150_000,
                }])
            })
        })
    }

    fn pay_invoice<'a>(
        &'a self,
        invoice: &'a str,
        wallet_id: &'a str,
    ) -> BoxFuture<'a, WalletResult<PaymentOutcome>> {
        Box::pin(async move {
            self.record(WalletCall::Pay {
                invoice: invoice.to_string(),
                wallet_id: wallet_id.to_string(),
            });
            self.pay_results.lock().pop_front().unwrap_or_else(|| {
                Ok(PaymentOutcome {
                    status: Some("SUCCESS".to_string()),
                    errors: vec![],
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_config_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.currency, "BTC");
    }

    #[test]
    fn test_graphql_request_serialization() {
        let request = GraphqlRequest {
            query: WALLET_QUERY,
            variables: serde_json::json!({}),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["query"]
            .as_str()
            .unwrap()
            .contains("defaultAccount { wallets"));
        assert_eq!(json["variables"], serde_json::json!({}));
    }

    #[test]
    fn test_pay_mutation_names_the_operation() {
        assert!(PAY_INVOICE_MUTATION.contains("lnInvoicePaymentSend"));
        assert!(PAY_INVOICE_MUTATION.contains("LnInvoicePaymentInput"));
    }

    #[tokio::test]
    async fn test_mock_records_pay_arguments() {
        let mock = MockWalletApi::new();

        mock.wallets().await.unwrap();
        mock.pay_invoice("lnbc42", "w-btc").await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                WalletCall::Wallets,
                WalletCall::Pay {
                    invoice: "lnbc42".to_string(),
                    wallet_id: "w-btc".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_returns_scripted_failure_then_default() {
        let mock = MockWalletApi::new();
        mock.push_pay(Err(WalletError::Transport("offline".to_string())));

        assert!(mock.pay_invoice("lnbc42", "w-btc").await.is_err());
        assert!(mock.pay_invoice("lnbc42", "w-btc").await.is_ok());
        assert_eq!(mock.pay_calls(), 2);
    }
}
