//! JSON-RPC access to the monitored node.

use crate::models::Block;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} returned HTTP {status}")]
    HttpStatus { method: String, status: u16 },
    #[error("{method} returned JSON-RPC error {code}: {message}")]
    JsonRpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error("{method} response missing result")]
    MissingResult { method: String },
    #[error("{method} result decode error: {source}")]
    Decode {
        method: String,
        source: serde_json::Error,
    },
    #[error("invalid quantity in {field}: {value:?}")]
    InvalidQuantity { field: String, value: String },
}

/// Node queries the checks depend on.
#[async_trait::async_trait]
pub trait EthRpc: Send + Sync {
    /// Endpoint used in status messages.
    fn url(&self) -> &str;

    async fn net_peer_count(&self) -> Result<u64, RpcError>;

    async fn latest_block(&self) -> Result<Block, RpcError>;

    async fn block_by_number(&self, number: u64) -> Result<Block, RpcError>;
}

#[derive(Debug, Clone)]
pub struct HttpEthClient {
    client: Client,
    rpc_url: String,
}

impl HttpEthClient {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
        }
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(rpc_url: String, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, rpc_url })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        debug!(method, "sending rpc request");

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::HttpStatus {
                method: method.to_owned(),
                status: status.as_u16(),
            });
        }

        let envelope = response.json::<RpcResponse>().await?;
        if let Some(error) = envelope.error {
            return Err(RpcError::JsonRpc {
                method: method.to_owned(),
                code: error.code,
                message: error.message,
            });
        }

        envelope.result.ok_or_else(|| RpcError::MissingResult {
            method: method.to_owned(),
        })
    }

    async fn get_block(&self, tag: String) -> Result<Block, RpcError> {
        const METHOD: &str = "eth_getBlockByNumber";

        let result = self.call(METHOD, json!([tag, false])).await?;
        let block = serde_json::from_value::<RpcBlock>(result).map_err(|source| RpcError::Decode {
            method: METHOD.to_owned(),
            source,
        })?;

        Block::try_from(block)
    }
}

#[async_trait::async_trait]
impl EthRpc for HttpEthClient {
    fn url(&self) -> &str {
        &self.rpc_url
    }

    async fn net_peer_count(&self) -> Result<u64, RpcError> {
        let result = self.call("net_peerCount", json!([])).await?;
        quantity_from_value("net_peerCount", &result)
    }

    async fn latest_block(&self) -> Result<Block, RpcError> {
        self.get_block("latest".to_owned()).await
    }

    async fn block_by_number(&self, number: u64) -> Result<Block, RpcError> {
        self.get_block(format!("0x{number:x}")).await
    }
}

/// Decodes a quantity given either as a `0x`-prefixed hex string or in decimal.
pub fn parse_quantity(field: &str, raw: &str) -> Result<u64, RpcError> {
    let trimmed = raw.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };

    parsed.map_err(|_| RpcError::InvalidQuantity {
        field: field.to_owned(),
        value: raw.to_owned(),
    })
}

fn quantity_from_value(field: &str, value: &Value) -> Result<u64, RpcError> {
    match value {
        Value::String(raw) => parse_quantity(field, raw),
        Value::Number(number) => number.as_u64().ok_or_else(|| RpcError::InvalidQuantity {
            field: field.to_owned(),
            value: number.to_string(),
        }),
        other => Err(RpcError::InvalidQuantity {
            field: field.to_owned(),
            value: other.to_string(),
        }),
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcBlock {
    number: Value,
    miner: String,
    timestamp: Value,
}

impl TryFrom<RpcBlock> for Block {
    type Error = RpcError;

    fn try_from(block: RpcBlock) -> Result<Self, Self::Error> {
        Ok(Block {
            number: quantity_from_value("number", &block.number)?,
            miner: block.miner,
            timestamp: quantity_from_value("timestamp", &block.timestamp)?,
        })
    }
}
