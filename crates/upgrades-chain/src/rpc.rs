//! JSON-RPC provider over blocking HTTP.
//!
//! Requests go through a shared `ureq::Agent` with request and connect
//! timeouts. Each call runs on the blocking pool so the async engine is never
//! stalled by a slow node.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};
use upgrades_types::env_utils::{env_string_or, env_var_or};

use crate::provider::ChainProvider;

/// Connection settings for [`JsonRpcProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl RpcConfig {
    /// Default endpoint (local development node).
    pub const DEFAULT_URL: &'static str = "http://127.0.0.1:8545";
    /// Default request timeout in seconds (can be overridden by env).
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Build a config from `UPGRADES_RPC_URL`, `UPGRADES_RPC_TIMEOUT_SECS` and
    /// `UPGRADES_RPC_CONNECT_TIMEOUT_SECS`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self {
            url: env_string_or("UPGRADES_RPC_URL", Self::DEFAULT_URL),
            timeout_secs: env_var_or("UPGRADES_RPC_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS),
            connect_timeout_secs: env_var_or(
                "UPGRADES_RPC_CONNECT_TIMEOUT_SECS",
                Self::DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: Self::DEFAULT_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: Self::DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Outcome of a single JSON-RPC exchange.
enum RpcReply {
    Result(Value),
    /// The node answered with an `error` object.
    Error { code: i64, message: String },
}

struct Inner {
    endpoint: String,
    agent: ureq::Agent,
    next_id: AtomicU64,
}

/// [`ChainProvider`] backed by an Ethereum JSON-RPC endpoint.
#[derive(Clone)]
pub struct JsonRpcProvider {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for JsonRpcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcProvider")
            .field("endpoint", &self.inner.endpoint)
            .finish()
    }
}

impl JsonRpcProvider {
    /// Create a provider for `endpoint` with timeouts taken from the environment.
    pub fn new(endpoint: &str) -> Self {
        Self::with_config(&RpcConfig::from_env().with_url(endpoint))
    }

    /// Create a provider entirely from environment configuration.
    pub fn from_env() -> Self {
        Self::with_config(&RpcConfig::from_env())
    }

    pub fn with_config(config: &RpcConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .timeout_connect(Duration::from_secs(config.connect_timeout_secs))
            .build();
        Self {
            inner: Arc::new(Inner {
                endpoint: config.url.clone(),
                agent,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Send one request on the blocking pool.
    async fn request(&self, method: &'static str, params: Value) -> Result<RpcReply> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.send(method, params))
            .await
            .context("JSON-RPC task panicked")?
    }

    /// Send a request whose error reply is always a failure.
    async fn request_ok(&self, method: &'static str, params: Value) -> Result<Value> {
        match self.request(method, params).await? {
            RpcReply::Result(value) => Ok(value),
            RpcReply::Error { code, message } => {
                Err(anyhow!("{} failed ({}): {}", method, code, message))
            }
        }
    }
}

impl Inner {
    fn send(&self, method: &str, params: Value) -> Result<RpcReply> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(method, id, "json-rpc request");

        let response: Value = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| anyhow!("JSON-RPC request {} failed: {}", method, e))?
            .into_json()
            .map_err(|e| anyhow!("Failed to parse JSON-RPC response for {}: {}", method, e))?;

        if let Some(error) = response.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Ok(RpcReply::Error { code, message });
        }

        response
            .get("result")
            .cloned()
            .map(RpcReply::Result)
            .ok_or_else(|| anyhow!("No result in JSON-RPC response for {}", method))
    }
}

fn hex_field(value: &Value, method: &str) -> Result<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| anyhow!("{} returned a non-string result: {}", method, value))?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() % 2 == 1 {
        return hex::decode(format!("0{digits}"))
            .map_err(|e| anyhow!("{} returned invalid hex: {}", method, e));
    }
    hex::decode(digits).map_err(|e| anyhow!("{} returned invalid hex: {}", method, e))
}

fn parse_word(bytes: &[u8], method: &str) -> Result<B256> {
    if bytes.len() > 32 {
        return Err(anyhow!(
            "{} returned {} bytes, expected at most 32",
            method,
            bytes.len()
        ));
    }
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(B256::from(word))
}

fn quantity(value: &Value, method: &str) -> Result<u64> {
    let s = value
        .as_str()
        .ok_or_else(|| anyhow!("{} returned a non-string result: {}", method, value))?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| anyhow!("{} returned invalid quantity: {}", method, e))
}

/// Whether an `eth_call` error reply is the call failing on chain rather than
/// the node failing to answer.
fn is_execution_revert(code: i64, message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    code == 3 || message.contains("revert") || message.contains("invalid opcode")
}

#[async_trait::async_trait]
impl ChainProvider for JsonRpcProvider {
    async fn chain_id(&self) -> Result<u64> {
        let value = self.request_ok("eth_chainId", json!([])).await?;
        quantity(&value, "eth_chainId")
    }

    async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256> {
        let value = self
            .request_ok(
                "eth_getStorageAt",
                json!([address.to_string(), slot.to_string(), "latest"]),
            )
            .await?;
        parse_word(&hex_field(&value, "eth_getStorageAt")?, "eth_getStorageAt")
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Option<Bytes>> {
        let params = json!([{ "to": to.to_string(), "data": data.to_string() }, "latest"]);
        match self.request("eth_call", params).await? {
            RpcReply::Result(value) => Ok(Some(Bytes::from(hex_field(&value, "eth_call")?))),
            RpcReply::Error { code, message } if is_execution_revert(code, &message) => {
                debug!(%to, code, %message, "eth_call reverted");
                Ok(None)
            }
            RpcReply::Error { code, message } => {
                Err(anyhow!("eth_call failed ({}): {}", code, message))
            }
        }
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        let value = self
            .request_ok("eth_getCode", json!([address.to_string(), "latest"]))
            .await?;
        Ok(Bytes::from(hex_field(&value, "eth_getCode")?))
    }
}
