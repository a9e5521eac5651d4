#![allow(dead_code)]

use axum::{Json, Router, extract::State, routing::post};
use ethereum_check::{
    client::{EthRpc, RpcError},
    models::Block,
};
use serde_json::{Value, json};
use std::{
    collections::HashSet,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

pub const MINER: &str = "0x00a329c0648769a73afac7f9381e08fb43dbea72";
pub const OTHER_MINER: &str = "0x8945a1288dc78a6d8952a92c77aee6730b414778";

/// Chain of blocks `0..=head`, all mined by `OTHER_MINER` unless overridden.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    pub fn new(head: u64, block_timestamp: u64) -> Self {
        let blocks = (0..=head)
            .map(|number| Block {
                number,
                miner: OTHER_MINER.to_owned(),
                timestamp: block_timestamp,
            })
            .collect();
        Self { blocks }
    }

    pub fn empty() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn with_miner_at(mut self, number: u64, miner: &str, timestamp: u64) -> Self {
        if let Some(block) = self.blocks.iter_mut().find(|block| block.number == number) {
            block.miner = miner.to_owned();
            block.timestamp = timestamp;
        }
        self
    }

    pub fn head(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn get(&self, number: u64) -> Option<&Block> {
        self.blocks.iter().find(|block| block.number == number)
    }
}

/// In-memory `EthRpc` that records which blocks were requested.
pub struct MockNode {
    pub peers: Option<u64>,
    pub chain: Chain,
    pub failing_blocks: HashSet<u64>,
    pub latest_fails: bool,
    pub requested: Mutex<Vec<u64>>,
    pub latest_calls: Mutex<usize>,
}

impl MockNode {
    pub fn new(peers: Option<u64>, chain: Chain) -> Self {
        Self {
            peers,
            chain,
            failing_blocks: HashSet::new(),
            latest_fails: false,
            requested: Mutex::new(Vec::new()),
            latest_calls: Mutex::new(0),
        }
    }

    pub fn failing_at(mut self, number: u64) -> Self {
        self.failing_blocks.insert(number);
        self
    }

    pub fn failing_latest(mut self) -> Self {
        self.latest_fails = true;
        self
    }

    pub fn requested_blocks(&self) -> Vec<u64> {
        match self.requested.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => Vec::new(),
        }
    }

    pub fn latest_block_calls(&self) -> usize {
        match self.latest_calls.lock() {
            Ok(guard) => *guard,
            Err(_) => 0,
        }
    }
}

fn missing(method: &str) -> RpcError {
    RpcError::MissingResult {
        method: method.to_owned(),
    }
}

#[async_trait::async_trait]
impl EthRpc for MockNode {
    fn url(&self) -> &str {
        "http://mock-node:8545"
    }

    async fn net_peer_count(&self) -> Result<u64, RpcError> {
        self.peers.ok_or_else(|| missing("net_peerCount"))
    }

    async fn latest_block(&self) -> Result<Block, RpcError> {
        if let Ok(mut guard) = self.latest_calls.lock() {
            *guard += 1;
        }
        if self.latest_fails {
            return Err(RpcError::InvalidQuantity {
                field: "number".to_owned(),
                value: "0xzz".to_owned(),
            });
        }
        self.chain
            .head()
            .cloned()
            .ok_or_else(|| missing("eth_getBlockByNumber"))
    }

    async fn block_by_number(&self, number: u64) -> Result<Block, RpcError> {
        if let Ok(mut guard) = self.requested.lock() {
            guard.push(number);
        }
        if self.failing_blocks.contains(&number) {
            return Err(RpcError::JsonRpc {
                method: "eth_getBlockByNumber".to_owned(),
                code: -32000,
                message: "header not found".to_owned(),
            });
        }
        self.chain
            .get(number)
            .cloned()
            .ok_or_else(|| missing("eth_getBlockByNumber"))
    }
}

/// Shared state behind the JSON-RPC stub server.
#[derive(Debug, Clone)]
pub struct StubState {
    pub peers: Option<u64>,
    pub chain: Chain,
    /// Replaces the `number` field of the `latest` block when set.
    pub latest_number: Option<String>,
}

impl StubState {
    pub fn new(peers: Option<u64>, chain: Chain) -> Self {
        Self {
            peers,
            chain,
            latest_number: None,
        }
    }
}

fn quantity(value: u64) -> String {
    format!("0x{value:x}")
}

fn block_json(block: &Block) -> Value {
    json!({
        "number": quantity(block.number),
        "miner": block.miner,
        "timestamp": quantity(block.timestamp),
        "hash": format!("0x{:064x}", block.number),
    })
}

async fn handle_rpc(State(state): State<Arc<StubState>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or_default();
    let params = request.get("params").cloned().unwrap_or_else(|| json!([]));

    let result = match method {
        "net_peerCount" => state.peers.map(|peers| json!(quantity(peers))),
        "eth_getBlockByNumber" => {
            let tag = params.get(0).and_then(Value::as_str).unwrap_or_default();
            let block = if tag == "latest" {
                state.chain.head().map(|head| {
                    let mut head = block_json(head);
                    if let (Some(number), Some(fields)) = (&state.latest_number, head.as_object_mut()) {
                        fields.insert("number".to_owned(), json!(number));
                    }
                    head
                })
            } else {
                tag.strip_prefix("0x")
                    .and_then(|hex| u64::from_str_radix(hex, 16).ok())
                    .and_then(|number| state.chain.get(number))
                    .map(block_json)
            };
            Some(block.unwrap_or(Value::Null))
        }
        _ => None,
    };

    match result {
        Some(result) => Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })),
        None => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": format!("method {method} not available") }
        })),
    }
}

/// Serves the stub on an ephemeral localhost port for the rest of the test.
pub async fn spawn_stub_node(state: StubState) -> std::io::Result<SocketAddr> {
    let app = Router::new()
        .route("/", post(handle_rpc))
        .with_state(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(addr)
}

/// An address nothing is listening on.
pub fn closed_port_url() -> std::io::Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
