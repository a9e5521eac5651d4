use crate::{
    client::{EthRpc, RpcError},
    config::{LivenessConfig, Thresholds},
    models::{CheckOutcome, ServiceState},
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to fetch latest block: {0}")]
    LatestBlock(#[source] RpcError),
    #[error("failed to fetch block {number}: {source}")]
    Block { number: u64, source: RpcError },
}

/// Outcome of the peer check, plus whether the node answered at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCheck {
    pub outcome: CheckOutcome,
    pub node_answered: bool,
}

/// Queries `net_peerCount`. A node that does not answer is reported as
/// critical rather than returned as an error.
pub async fn check_peers(client: &impl EthRpc, thresholds: &Thresholds<i64>) -> PeerCheck {
    match client.net_peer_count().await {
        Ok(peers) => {
            info!(peers, "peer count received");
            PeerCheck {
                outcome: evaluate_peers(peers, thresholds),
                node_answered: true,
            }
        }
        Err(error) => {
            warn!(error = %error, "peer count query failed");
            PeerCheck {
                outcome: CheckOutcome::critical(format!(
                    "CRITICAL: {} not answering to RPC requests",
                    client.url()
                )),
                node_answered: false,
            }
        }
    }
}

/// Lower is worse: the critical bound is checked first. Negative thresholds
/// never trigger, which disables that tier.
pub fn evaluate_peers(peers: u64, thresholds: &Thresholds<i64>) -> CheckOutcome {
    let count = i64::try_from(peers).unwrap_or(i64::MAX);
    if count <= thresholds.critical {
        CheckOutcome::critical(format!("CRITICAL: {peers} peers"))
    } else if count <= thresholds.warning {
        CheckOutcome::warning(format!("WARNING: {peers} peers"))
    } else {
        CheckOutcome::ok(format!("{peers} peers"))
    }
}

/// Walks back from the chain head, one block at a time, looking for the most
/// recent block mined by `config.miner_address`. At most `config.max_blocks`
/// blocks are fetched; the scan also ends after the genesis block.
pub async fn check_block_liveness(
    client: &impl EthRpc,
    config: &LivenessConfig,
    now: SystemTime,
) -> Result<CheckOutcome, CheckError> {
    let latest = client.latest_block().await.map_err(CheckError::LatestBlock)?;
    debug!(head = latest.number, "scanning back from chain head");

    let mut number = latest.number;
    let mut scanned = 0;
    while scanned < config.max_blocks {
        let block = client
            .block_by_number(number)
            .await
            .map_err(|source| CheckError::Block { number, source })?;

        if block.mined_by(&config.miner_address) {
            let minutes = minutes_since(block.timestamp, now);
            info!(block = block.number, scanned, minutes, "found block from miner");
            return Ok(evaluate_block_age(minutes, &config.minutes_without_block));
        }

        scanned += 1;
        let Some(previous) = number.checked_sub(1) else {
            break;
        };
        number = previous;
    }

    info!(scanned, miner = %config.miner_address, "no block from miner in scan window");
    Ok(CheckOutcome::critical(format!(
        "No block seen in last {} blocks",
        config.max_blocks
    )))
}

/// Higher is worse: the critical bound is checked first.
pub fn evaluate_block_age(minutes: f64, thresholds: &Thresholds<f64>) -> CheckOutcome {
    let state = if minutes > thresholds.critical {
        ServiceState::Critical
    } else if minutes > thresholds.warning {
        ServiceState::Warning
    } else {
        ServiceState::Ok
    };

    match state {
        ServiceState::Ok => CheckOutcome::ok(format!("Last block seen {minutes:.6} minutes ago")),
        _ => CheckOutcome::new(state, format!("No new block seen since {minutes:.6} minutes")),
    }
}

/// Minutes elapsed between a block timestamp and `now`; negative when the
/// block claims to be from the future. Works on offsets from the epoch so any
/// `u64` timestamp a node sends is representable.
pub fn minutes_since(timestamp: u64, now: SystemTime) -> f64 {
    let now = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    let block_time = Duration::from_secs(timestamp);
    match now.checked_sub(block_time) {
        Some(elapsed) => elapsed.as_secs_f64() / 60.0,
        None => -block_time.saturating_sub(now).as_secs_f64() / 60.0,
    }
}
