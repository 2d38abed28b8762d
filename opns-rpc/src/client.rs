//! HTTP JSON-RPC client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256, U64};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use opns_core::constants::{DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_RPC_URL, RPC_CODE_EXECUTION_REVERTED};
use opns_core::error::{OpnsError, Result};
use opns_core::traits::ChainClient;
use opns_core::types::{LogFilter, RawLog};
use opns_core::OpnsConfig;

/// RPC client configuration.
#[derive(Clone, Debug)]
pub struct RpcConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.into(),
            timeout_seconds: DEFAULT_RPC_TIMEOUT_SECS,
        }
    }
}

impl RpcConfig {
    /// Creates a new configuration with the given RPC URL.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }
}

impl From<&OpnsConfig> for RpcConfig {
    fn from(config: &OpnsConfig) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            timeout_seconds: config.timeout_seconds,
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl From<JsonRpcError> for OpnsError {
    fn from(err: JsonRpcError) -> Self {
        let reverted = err.code == RPC_CODE_EXECUTION_REVERTED
            || err.message.to_lowercase().contains("execution reverted");

        if !reverted {
            return OpnsError::RpcError {
                code: err.code,
                message: err.message,
            };
        }

        match err.data {
            Some(serde_json::Value::String(data)) if !data.is_empty() => {
                OpnsError::ContractReverted(format!("{} ({})", err.message, data))
            }
            _ => OpnsError::ContractReverted(err.message),
        }
    }
}

/// JSON-RPC client for an Ethereum-compatible node.
pub struct RpcClient {
    config: RpcConfig,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Creates a new client for the given RPC URL.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(RpcConfig::new(rpc_url))
    }

    /// Creates a new client with custom configuration.
    pub fn with_config(config: RpcConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| OpnsError::HttpError(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Returns the endpoint this client talks to.
    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    /// Makes a JSON-RPC call and deserializes its `result`.
    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let response = self
            .http_client
            .post(&self.config.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OpnsError::HttpError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OpnsError::HttpError(e.to_string()))?;

        let parsed: JsonRpcResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(OpnsError::HttpError(format!("HTTP {}: {}", status, body)));
            }
            Err(e) => return Err(OpnsError::MalformedResponse(e.to_string())),
        };

        if let Some(error) = parsed.error {
            debug!(method, code = error.code, message = %error.message, "RPC error");
            return Err(error.into());
        }

        let result = parsed
            .result
            .ok_or_else(|| OpnsError::MalformedResponse(format!("{} returned no result", method)))?;

        serde_json::from_value(result)
            .map_err(|e| OpnsError::MalformedResponse(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    #[instrument(skip(self), fields(rpc_url = %self.config.rpc_url))]
    async fn is_connected(&self) -> bool {
        match self.request::<U64>("eth_chainId", serde_json::json!([])).await {
            Ok(chain_id) => {
                debug!(chain_id = %chain_id, "Connected");
                true
            }
            Err(e) => {
                warn!(error = %e, "Connectivity check failed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    async fn block_number(&self) -> Result<u64> {
        let block: U64 = self.request("eth_blockNumber", serde_json::json!([])).await?;
        Ok(block.to::<u64>())
    }

    #[instrument(skip(self, data), fields(data_len = data.len()))]
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.request(
            "eth_call",
            serde_json::json!([{ "to": to, "data": data }, "latest"]),
        )
        .await
    }

    #[instrument(skip(self, filter), fields(range = %filter.range))]
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>> {
        let logs: Vec<RawLog> = self
            .request(
                "eth_getLogs",
                serde_json::json!([{
                    "address": filter.address,
                    "fromBlock": format!("{:#x}", filter.range.from),
                    "toBlock": format!("{:#x}", filter.range.to),
                    "topics": filter.topics,
                }]),
            )
            .await?;

        debug!(count = logs.len(), "Fetched logs");
        Ok(logs)
    }

    #[instrument(skip(self))]
    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.request("eth_getBalance", serde_json::json!([address, "latest"]))
            .await
    }
}
