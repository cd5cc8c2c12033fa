//! Marketplace client: the four REST operations over a Tor SOCKS5 tunnel.
//!
//! Provides a trait-based abstraction over the marketplace calls. This allows
//! for:
//! - Dependency injection for controller testing
//! - Separation of the lifecycle logic from the HTTP transport

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::{Client, Proxy, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use robo_core::{credential, OrderId, OrderSpec};

use crate::error::{MarketError, MarketResult};
use crate::types::{MakeOrderForm, OrderCreated, OrderDetails};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Onion host of the public mainnet marketplace.
pub const DEFAULT_HOST: &str =
    "robosats6tkf3eva7x2voqso3a5wcorsnw34jveyxfqi2fu7oyheasid.onion";

/// Local SOCKS5 proxy of a stock Tor daemon. The `socks5h` scheme keeps DNS
/// resolution inside the tunnel, which onion hosts require.
pub const DEFAULT_PROXY: &str = "socks5h://127.0.0.1:9050";

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_proxy() -> String {
    DEFAULT_PROXY.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Marketplace client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Marketplace host (an onion address, reached over plain HTTP).
    #[serde(default = "default_host")]
    pub host: String,
    /// SOCKS5 proxy URL.
    #[serde(default = "default_proxy")]
    pub proxy: String,
    /// Per-request timeout in seconds. Onion round-trips are slow.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            proxy: default_proxy(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// The four marketplace operations the lifecycle controller needs.
pub trait MarketApi: Send + Sync {
    /// Fetch the marketplace info document (health/metadata probe).
    fn info(&self) -> BoxFuture<'_, MarketResult<Value>>;

    /// Submit a new maker order.
    fn create_order<'a>(
        &'a self,
        spec: &'a OrderSpec,
    ) -> BoxFuture<'a, MarketResult<OrderCreated>>;

    /// Fetch the detail document of an order.
    fn fetch_order(&self, id: OrderId) -> BoxFuture<'_, MarketResult<OrderDetails>>;

    /// Ask the marketplace to cancel an order.
    fn cancel_order(&self, id: OrderId) -> BoxFuture<'_, MarketResult<Value>>;
}

/// Real client: plain HTTP to the onion host through the SOCKS5 proxy, with
/// the token-derived credential attached to every request.
pub struct TorMarketClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TorMarketClient {
    pub fn new(config: &MarketConfig, token: impl Into<String>) -> MarketResult<Self> {
        let proxy = Proxy::all(&config.proxy)
            .map_err(|e| MarketError::Transport(format!("Invalid proxy {}: {e}", config.proxy)))?;

        let client = Client::builder()
            .proxy(proxy)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MarketError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: format!("http://{}/api", config.host),
            token: token.into(),
        })
    }

    /// Authorization header value: fixed scheme token plus the credential
    /// derived from the account token. Derivation is pure and cheap, so the
    /// credential is recomputed per request instead of cached.
    fn auth_header(&self) -> String {
        format!("Token {}", credential::hash_token(self.token.as_bytes()))
    }

    async fn check(response: Response) -> MarketResult<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::AuthRejected(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_info(&self) -> MarketResult<Value> {
        let url = format!("{}/info/", self.base_url);
        debug!(url = %url, "Fetching marketplace info");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| MarketError::Transport(format!("HTTP request failed: {e}")))?;

        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| MarketError::Malformed(format!("Failed to parse info response: {e}")))
    }

    async fn post_make(&self, spec: &OrderSpec) -> MarketResult<OrderCreated> {
        let url = format!("{}/make/", self.base_url);
        let form = MakeOrderForm::from_spec(spec);
        info!(side = %spec.side, currency = spec.currency, "Submitting maker order");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .form(&form)
            .send()
            .await
            .map_err(|e| MarketError::Transport(format!("HTTP request failed: {e}")))?;

        let response = Self::check(response).await?;
        let created: OrderCreated = response
            .json()
            .await
            .map_err(|e| MarketError::Malformed(format!("Failed to parse make response: {e}")))?;

        info!(order_id = created.id, "Maker order accepted");
        Ok(created)
    }

    async fn get_order(&self, id: OrderId) -> MarketResult<OrderDetails> {
        let url = format!("{}/order/", self.base_url);
        debug!(order_id = %id, "Fetching order details");

        let response = self
            .client
            .get(&url)
            .query(&[("order_id", id.value())])
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| MarketError::Transport(format!("HTTP request failed: {e}")))?;

        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| MarketError::Malformed(format!("Failed to parse order response: {e}")))
    }

    async fn post_cancel(&self, id: OrderId) -> MarketResult<Value> {
        let url = format!("{}/order/", self.base_url);
        info!(order_id = %id, "Requesting order cancellation");

        let response = self
            .client
            .post(&url)
            .query(&[("order_id", id.value())])
            .header("Authorization", self.auth_header())
            .form(&[("action", "cancel")])
            .send()
            .await
            .map_err(|e| MarketError::Transport(format!("HTTP request failed: {e}")))?;

        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| MarketError::Malformed(format!("Failed to parse cancel response: {e}")))
    }
}

impl MarketApi for TorMarketClient {
    fn info(&self) -> BoxFuture<'_, MarketResult<Value>> {
        Box::pin(self.get_info())
    }

    fn create_order<'a>(
        &'a self,
        spec: &'a OrderSpec,
    ) -> BoxFuture<'a, MarketResult<OrderCreated>> {
        Box::pin(self.post_make(spec))
    }

    fn fetch_order(&self, id: OrderId) -> BoxFuture<'_, MarketResult<OrderDetails>> {
        Box::pin(self.get_order(id))
    }

    fn cancel_order(&self, id: OrderId) -> BoxFuture<'_, MarketResult<Value>> {
        Box::pin(self.post_cancel(id))
    }
}

impl<T: MarketApi + ?Sized> MarketApi for std::sync::Arc<T> {
    fn info(&self) -> BoxFuture<'_, MarketResult<Value>> {
        (**self).info()
    }

    fn create_order<'a>(
        &'a self,
        spec: &'a OrderSpec,
    ) -> BoxFuture<'a, MarketResult<OrderCreated>> {
        (**self).create_order(spec)
    }

    fn fetch_order(&self, id: OrderId) -> BoxFuture<'_, MarketResult<OrderDetails>> {
        (**self).fetch_order(id)
    }

    fn cancel_order(&self, id: OrderId) -> BoxFuture<'_, MarketResult<Value>> {
        (**self).cancel_order(id)
    }
}

/// A call recorded by `MockMarketApi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketCall {
    Info,
    Create,
    Fetch(OrderId),
    Cancel(OrderId),
}

/// Mock marketplace for controller tests.
///
/// Results are scripted per operation as a queue; an empty queue yields a
/// benign success so tests only script the calls they care about.
#[derive(Default)]
pub struct MockMarketApi {
    calls: Mutex<Vec<MarketCall>>,
    create_results: Mutex<VecDeque<MarketResult<OrderCreated>>>,
    fetch_results: Mutex<VecDeque<MarketResult<OrderDetails>>>,
    cancel_results: Mutex<VecDeque<MarketResult<Value>>>,
}

impl MockMarketApi {
    /// Order id returned when no create result is scripted.
    pub const DEFAULT_ORDER_ID: i64 = 1001;

    /// Bond invoice returned when no fetch result is scripted.
    pub const DEFAULT_BOND_INVOICE: &'static str = "lnbc1mockbond";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, result: MarketResult<OrderCreated>) {
        self.create_results.lock().push_back(result);
    }

    pub fn push_fetch(&self, result: MarketResult<OrderDetails>) {
        self.fetch_results.lock().push_back(result);
    }

    pub fn push_cancel(&self, result: MarketResult<Value>) {
        self.cancel_results.lock().push_back(result);
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<MarketCall> {
        self.calls.lock().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.count(|c| matches!(c, MarketCall::Create))
    }

    pub fn fetch_calls(&self) -> usize {
        self.count(|c| matches!(c, MarketCall::Fetch(_)))
    }

    pub fn cancel_calls(&self) -> usize {
        self.count(|c| matches!(c, MarketCall::Cancel(_)))
    }

    fn count(&self, pred: impl Fn(&MarketCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: MarketCall) {
        self.calls.lock().push(call);
    }
}

impl MarketApi for MockMarketApi {
    fn info(&self) -> BoxFuture<'_, MarketResult<Value>> {
        Box::pin(async move {
            self.record(MarketCall::Info);
            Ok(serde_json::json!({}))
        })
    }

    fn create_order<'a>(
        &'a self,
        _spec: &'a OrderSpec,
    ) -> BoxFuture<'a, MarketResult<OrderCreated>> {
        Box::pin(async move {
            self.record(MarketCall::Create);
            self.create_results.lock().pop_front().unwrap_or(Ok(OrderCreated {
                id: Self::DEFAULT_ORDER_ID,
            }))
        })
    }

    fn fetch_order(&self, id: OrderId) -> BoxFuture<'_, MarketResult<OrderDetails>> {
        Box::pin(async move {
            self.record(MarketCall::Fetch(id));
            self.fetch_results.lock().pop_front().unwrap_or(Ok(OrderDetails {
                id: Some(id.value()),
                status: Some(0),
                bond_invoice: Some(Self::DEFAULT_BOND_INVOICE.to_string()),
            }))
        })
    }

    fn cancel_order(&self, id: OrderId) -> BoxFuture<'_, MarketResult<Value>> {
        Box::pin(async move {
            self.record(MarketCall::Cancel(id));
            self.cancel_results.lock().pop_front().unwrap_or(Ok(serde_json::json!({})))
        })
    }
}
