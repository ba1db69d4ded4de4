//! # Rum Node
//!
//! Entry point for a Rum ledger node.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`RUM_CONFIG` file, then `RUM_*` environment)
//! 2. Initialize tracing
//! 3. Open the stores and build the node components
//! 4. Re-register every stored group with the exchange
//! 5. Start the inbound serve loop and the maintenance tick
//! 6. Wait for Ctrl+C, then shut down
//!
//! The stream transport is the in-process network until a real peer-to-peer
//! transport is plugged in behind `StreamTransport`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, RumNode};
use rum_03_exchange::MemoryNetwork;
use rum_telemetry::init_tracing;
use shared_types::PeerId;

fn config_path() -> Option<PathBuf> {
    std::env::var("RUM_CONFIG").ok().map(PathBuf::from)
}

#[tokio::main]
async fn main() -> Result<()> {
    let path = config_path();
    let config = NodeConfig::load(path.as_deref()).context("loading node configuration")?;

    init_tracing(&config.telemetry).context("initializing tracing")?;
    tracing::info!(
        "[node] starting {} on network {}",
        config.telemetry.full_service_name(),
        config.exchange.network_name
    );

    // TODO: replace with a libp2p-backed StreamTransport once one exists.
    let network = MemoryNetwork::new();
    let transport = network.transport(PeerId::new(config.peer_id.clone()));

    let node = RumNode::new(config, transport).context("building node")?;
    node.resume_groups().context("resuming stored groups")?;
    node.start().context("starting node")?;

    tracing::info!("[node] running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")?;

    node.shutdown().await.context("shutting down")?;
    Ok(())
}
