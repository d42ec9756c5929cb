//! OpsGate Node Binary
//!
//! Deploys or restores a gate from configuration, replays scripted votes and
//! emits the final state snapshot as JSON.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use opsgate_common::VERSION;
use opsgate_node::{audit_logger, deploy, replay_votes, save_snapshot, NodeConfig};

fn main() -> Result<()> {
    // Load configuration
    let config = NodeConfig::load()?;

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("Starting OpsGate node v{}", VERSION);
    info!("Loaded configuration: {:?}", config);

    let audit = Arc::new(audit_logger(&config));
    let ops = deploy(&config, audit.clone())?;
    let report = replay_votes(&ops, &config.votes);
    info!("Replay report: {:?}", report);

    match &config.snapshot_path {
        Some(path) => save_snapshot(&ops, path)?,
        None => println!("{}", ops.snapshot().to_json()?),
    }

    audit.flush();
    Ok(())
}
