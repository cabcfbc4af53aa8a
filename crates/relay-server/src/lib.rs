//! # relay-server
//!
//! HTTP move service for the Chain Reaction engine relay.
//!
//! This crate provides:
//! - `MoveService`, the single-flight encode → engine → diff cycle
//! - axum routes (`POST /ai-move`, `GET /health`)
//! - `ServerConfig`, loadable from TOML

pub mod config;
pub mod routes;
pub mod service;

pub use config::ServerConfig;
pub use routes::{MoveRequest, router};
pub use service::MoveService;

use relay_core::{RelayError, Result};
use relay_engine::{Engine, ExchangeFile, ProcessEngine};
use tokio::net::TcpListener;
use tracing::info;

/// Chain Reaction relay HTTP server
pub struct RelayServer<E: Engine> {
    /// Move service shared by all requests
    service: MoveService<E>,
    /// Server configuration
    config: ServerConfig,
}

impl RelayServer<ProcessEngine> {
    /// Create a server that runs the configured engine executable
    pub fn from_config(config: ServerConfig) -> Self {
        let engine = ProcessEngine::new(config.engine.clone());
        Self::new(engine, config)
    }
}

impl<E: Engine> RelayServer<E> {
    /// Create a new server with the given engine
    pub fn new(engine: E, config: ServerConfig) -> Self {
        let exchange = ExchangeFile::new(config.exchange_path.clone());
        let service = MoveService::new(engine, exchange, config.header_label.clone());
        Self { service, config }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RelayError::Config(format!("failed to bind {}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!("Chain Reaction relay listening at http://{}", addr);
        }
        info!(
            "Exchange file: {:?}, engine: {:?}",
            self.config.exchange_path, self.config.engine.program
        );

        axum::serve(listener, router(self.service))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| RelayError::Internal(format!("server error: {}", e)))
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
