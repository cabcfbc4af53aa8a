//! Server configuration, loadable from TOML

use relay_core::{DEFAULT_LABEL, RelayError, Result};
use relay_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Top-level relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// Shared exchange file read and written by the engine
    pub exchange_path: PathBuf,
    /// Label written on the exchange file's header line
    pub header_label: String,
    /// Engine subprocess settings
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            exchange_path: PathBuf::from("gameState.txt"),
            header_label: DEFAULT_LABEL.to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| RelayError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("Config file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.exchange_path.as_os_str().is_empty() {
            return Err(RelayError::Config("exchange_path must not be empty".into()));
        }
        if self.header_label.contains(['\n', '\r']) {
            return Err(RelayError::Config(
                "header_label must be a single line".into(),
            ));
        }
        if self.engine.program.as_os_str().is_empty() {
            return Err(RelayError::Config("engine.program must not be empty".into()));
        }
        if self.engine.timeout_ms == 0 {
            return Err(RelayError::Config("engine.timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address.parse().map_err(|e| {
            RelayError::Config(format!("invalid bind_address {:?}: {}", self.bind_address, e))
        })
    }
}
