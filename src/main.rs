use std::sync::Arc;
use std::time::Duration;

use swapin_operator::bridge::Bridge;
use swapin_operator::config::Config;
use swapin_operator::gateway::HttpGateway;
use swapin_operator::identity::{self, EthNetworks, FsnNetworks, NetworkIdentity, RetryPolicy};
use swapin_operator::registry::{AddressRegistry, EvmAddressRules, FileRegistry};
use swapin_operator::scan;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    tracing::info!("starting swap-in operator");

    let config = Config::load()?;
    tracing::info!(
        blockchain = %config.chain.blockchain,
        net_id = %config.chain.net_id,
        pairs = config.tokens.len(),
        "configuration loaded"
    );

    let gateway = Arc::new(HttpGateway::new(&config.gateway.all_api_addresses())?);
    tracing::info!(api_address = gateway.api_address(), "gateway ready");

    let registry: Arc<dyn AddressRegistry> = match &config.registered_address_file {
        Some(path) => {
            let registry = FileRegistry::from_file(path)?;
            tracing::info!(path, addresses = registry.len(), "address registry loaded");
            Arc::new(registry)
        }
        None => Arc::new(FileRegistry::new()),
    };

    let bridge = Arc::new(Bridge::new(
        &config,
        gateway,
        registry,
        Arc::new(EvmAddressRules),
        network_table(&config.chain.blockchain),
    ));

    // Nothing may verify or sign until the chain identity is committed.
    let policy = RetryPolicy {
        interval: Duration::from_millis(config.gateway.retry_interval_ms),
        max_attempts: None,
    };
    if let Err(err) = identity::verify_signer_chain_id(&bridge, &policy).await {
        tracing::error!(%err, "chain identity verification failed");
        std::process::exit(1);
    }

    let handles = scan::start_scan_jobs(Some(bridge), config.server.is_swap_server);
    tracing::info!(jobs = handles.len(), "scan jobs started");

    wait_for_shutdown_signal().await;
    for handle in &handles {
        handle.abort();
    }

    tracing::info!("swap-in operator stopped");
    Ok(())
}

/// Pick the network identity table for the configured chain family.
fn network_table(blockchain: &str) -> Box<dyn NetworkIdentity> {
    if blockchain.eq_ignore_ascii_case("fusion") {
        Box::new(FsnNetworks)
    } else {
        Box::new(EthNetworks)
    }
}

/// Initialize tracing/logging with structured output.
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,swapin_operator=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(filter)
        .init();
}

/// Wait for shutdown signals (SIGINT/SIGTERM).
async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating shutdown");
        }
    }
}
