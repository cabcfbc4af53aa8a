//! chain-reaction-relay: HTTP relay between the Chain Reaction client and
//! the external move engine
//!
//! Usage: `chain-reaction-relay [CONFIG.toml]`. Without an argument the
//! relay looks for `relay.toml` in the working directory and falls back to
//! defaults when it is absent.

use anyhow::Result;
use relay_server::{RelayServer, ServerConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "relay.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => ServerConfig::load(&PathBuf::from(path))?,
        None => ServerConfig::load_or_default(&PathBuf::from(DEFAULT_CONFIG))?,
    };

    info!(
        "Starting chain-reaction-relay on {}, engine {:?}",
        config.bind_address, config.engine.program
    );

    RelayServer::from_config(config).run().await?;

    info!("Relay stopped");
    Ok(())
}
