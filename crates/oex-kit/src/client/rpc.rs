//! Low-level JSON-RPC client for OEX nodes.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer, de::DeserializeOwned};

use crate::error::RpcError;
use crate::types::{AccountName, CallMessage, ChainConfig, bytes_to_hex};

/// Default local node endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Retry configuration for RPC calls.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Initial delay in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        let backoff = self
            .initial_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(backoff.min(self.max_delay_ms))
    }
}

/// Block at which a read-only call is evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockNumber {
    /// The current head. Sent as `-1`.
    #[default]
    Latest,
    Number(u64),
}

impl Serialize for BlockNumber {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockNumber::Latest => s.serialize_i64(-1),
            BlockNumber::Number(n) => s.serialize_u64(*n),
        }
    }
}

impl From<u64> for BlockNumber {
    fn from(n: u64) -> Self {
        BlockNumber::Number(n)
    }
}

/// JSON-RPC request structure.
#[derive(Serialize)]
struct JsonRpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

/// JSON-RPC response structure.
#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl From<JsonRpcError> for RpcError {
    fn from(error: JsonRpcError) -> Self {
        RpcError::Rpc {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

/// Low-level JSON-RPC client for an OEX node.
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
    retry_config: RetryConfig,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create a new RPC client with the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_retry_config(url, RetryConfig::default())
    }

    /// Create a new RPC client with custom retry configuration.
    pub fn with_retry_config(url: impl Into<String>, retry_config: RetryConfig) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            retry_config,
            request_id: AtomicU64::new(0),
        }
    }

    /// Get the RPC URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make a raw RPC call with retries.
    ///
    /// Only transport failures are retried. An `error` object in the response
    /// is returned at once as [`RpcError::Rpc`].
    pub async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        let total_attempts = self.retry_config.max_retries + 1;

        for attempt in 0..total_attempts {
            let request_id = self.request_id.fetch_add(1, Ordering::Relaxed);

            let request = JsonRpcRequest {
                jsonrpc: "2.0",
                id: request_id,
                method,
                params: &params,
            };

            tracing::trace!(method, id = request_id, attempt, "sending rpc request");

            match self.try_call::<R>(&request).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < total_attempts - 1 => {
                    let delay = self.retry_config.delay(attempt);
                    tracing::warn!(
                        method,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "rpc request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => {
                    tracing::debug!(method, error = %e, "rpc request failed");
                    return Err(e);
                }
            }
        }

        Err(RpcError::Timeout(total_attempts))
    }

    /// Single attempt to make an RPC call.
    async fn try_call<R: DeserializeOwned>(
        &self,
        request: &JsonRpcRequest<'_, impl Serialize>,
    ) -> Result<R, RpcError> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let retryable = is_retryable_status(status.as_u16());
            return Err(RpcError::network(
                format!("HTTP {}: {}", status, body),
                Some(status.as_u16()),
                retryable,
            ));
        }

        let rpc_response: JsonRpcResponse<R> = serde_json::from_str(&body)?;

        if let Some(error) = rpc_response.error {
            return Err(error.into());
        }

        rpc_response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("Missing result in response".to_string()))
    }

    // ========================================================================
    // High-level RPC methods
    // ========================================================================

    /// Fetch the chain parameters.
    pub async fn get_chain_config(&self) -> Result<ChainConfig, RpcError> {
        self.call("oex_getChainConfig", serde_json::json!([])).await
    }

    /// Fetch the next nonce of an account.
    pub async fn get_nonce(&self, account: &AccountName) -> Result<u64, RpcError> {
        self.call("account_getNonce", [account]).await
    }

    /// Submit a signed raw transaction. Returns the transaction hash.
    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, RpcError> {
        self.call("oex_sendRawTransaction", [bytes_to_hex(raw_tx)])
            .await
    }

    /// Evaluate a read-only call. Returns the node's output (hex text).
    pub async fn call_contract(
        &self,
        message: &CallMessage,
        block: BlockNumber,
    ) -> Result<String, RpcError> {
        self.call("oex_call", (message, block)).await
    }
}

impl Clone for RpcClient {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            client: self.client.clone(),
            retry_config: self.retry_config.clone(),
            request_id: AtomicU64::new(0),
        }
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("url", &self.url)
            .field("retry_config", &self.retry_config)
            .finish()
    }
}

// ============================================================================
// Submitter
// ============================================================================

/// Future returned by [`Submitter::submit`].
pub type SubmitFuture<'a> = Pin<Box<dyn Future<Output = Result<String, RpcError>> + Send + 'a>>;

/// Delivers signed transactions to the ledger.
///
/// [`RpcClient`] submits over JSON-RPC; tests and embedders can provide their
/// own transport.
pub trait Submitter: Send + Sync {
    /// Submit a signed raw transaction, returning its hash.
    fn submit<'a>(&'a self, raw_tx: &'a [u8]) -> SubmitFuture<'a>;
}

impl Submitter for RpcClient {
    fn submit<'a>(&'a self, raw_tx: &'a [u8]) -> SubmitFuture<'a> {
        Box::pin(self.send_raw_transaction(raw_tx))
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if an HTTP status code is retryable.
fn is_retryable_status(status: u16) -> bool {
    // 408 Request Timeout, 429 Too Many Requests, and 5xx server errors
    status == 408 || status == 429 || (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // RetryConfig tests
    // ========================================================================

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay_ms, 500);
        assert_eq!(config.max_delay_ms, 5000);
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let config = RetryConfig::default();
        assert_eq!(config.delay(0), Duration::from_millis(500));
        assert_eq!(config.delay(1), Duration::from_millis(1000));
        assert_eq!(config.delay(3), Duration::from_millis(4000));
        assert_eq!(config.delay(4), Duration::from_millis(5000));
        assert_eq!(config.delay(60), Duration::from_millis(5000));
    }

    #[test]
    fn test_retry_config_none() {
        assert_eq!(RetryConfig::none().max_retries, 0);
    }

    // ========================================================================
    // Wire format tests
    // ========================================================================

    #[test]
    fn test_request_shape() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 4,
            method: "account_getNonce",
            params: ["alice"],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"jsonrpc":"2.0","id":4,"method":"account_getNonce","params":["alice"]})
        );
    }

    #[test]
    fn test_block_number_serialization() {
        assert_eq!(serde_json::to_string(&BlockNumber::Latest).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&BlockNumber::from(42)).unwrap(), "42");
    }

    #[test]
    fn test_error_response_maps_to_rpc_error() {
        let response: JsonRpcResponse<u64> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"account not exist"}}"#,
        )
        .unwrap();
        let err: RpcError = response.error.unwrap().into();
        assert_eq!(err.node_message(), Some("account not exist"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_without_code() {
        let response: JsonRpcResponse<u64> =
            serde_json::from_str(r#"{"error":{"message":"boom"}}"#).unwrap();
        assert!(matches!(
            RpcError::from(response.error.unwrap()),
            RpcError::Rpc { code: 0, .. }
        ));
    }

    #[test]
    fn test_retryable_status() {
        assert!(is_retryable_status(408));
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(502));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(404));
    }

    // ========================================================================
    // RpcClient tests
    // ========================================================================

    #[test]
    fn test_rpc_client_debug_hides_client() {
        let client = RpcClient::new(DEFAULT_RPC_URL);
        let debug = format!("{:?}", client);
        assert!(debug.contains("127.0.0.1:8545"));
        assert!(debug.contains("retry_config"));
    }

    #[test]
    fn test_rpc_client_clone_keeps_config() {
        let client = RpcClient::with_retry_config("http://node:8545", RetryConfig::none());
        let cloned = client.clone();
        assert_eq!(cloned.url(), "http://node:8545");
        assert_eq!(cloned.retry_config.max_retries, 0);
    }
}
