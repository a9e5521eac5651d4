use crate::{
    checks::{check_block_liveness, check_peers},
    client::EthRpc,
    config::CheckConfig,
    models::CheckOutcome,
    report::Report,
};
use std::time::SystemTime;
use tracing::{info, warn};

/// Runs the peer check and, when a miner address is configured, the block
/// liveness check. Failures become critical outcomes, so the report always
/// holds at least one line.
pub async fn run_checks(client: &impl EthRpc, config: &CheckConfig, now: SystemTime) -> Report {
    let peers = check_peers(client, &config.peers).await;
    let mut report = Report::from(peers.outcome);

    let Some(liveness) = &config.liveness else {
        return report;
    };

    if !peers.node_answered {
        info!("node unresponsive, skipping block liveness check");
        return report;
    }

    match check_block_liveness(client, liveness, now).await {
        Ok(outcome) => report.push(outcome),
        Err(error) => {
            warn!(error = %error, "block liveness check failed");
            report.push(CheckOutcome::critical(format!(
                "CRITICAL: block liveness check failed: {error}"
            )));
        }
    }

    report
}
