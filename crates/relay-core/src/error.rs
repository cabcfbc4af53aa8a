//! Error types for the relay

use std::time::Duration;
use thiserror::Error;

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Relay error types
#[derive(Debug, Error)]
pub enum RelayError {
    /// Board submitted by the client is malformed
    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    /// Exchange file could not be written
    #[error("Failed to write exchange file: {0}")]
    EncodeWrite(String),

    /// Engine failed to start or exited unsuccessfully
    #[error("Engine execution failed: {0}")]
    EngineLaunch(String),

    /// Engine did not exit before its deadline
    #[error("Engine timed out after {0:?}")]
    EngineTimeout(Duration),

    /// Exchange file missing, unreadable or malformed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Relay-internal failure (task panicked or was aborted)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Stable code reported to HTTP clients
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::InvalidBoard(_) => error_codes::INVALID_BOARD,
            RelayError::EncodeWrite(_) => error_codes::ENCODE_WRITE,
            RelayError::EngineLaunch(_) => error_codes::ENGINE_LAUNCH,
            RelayError::EngineTimeout(_) => error_codes::ENGINE_TIMEOUT,
            RelayError::Decode(_) => error_codes::DECODE,
            RelayError::Config(_) | RelayError::Internal(_) => error_codes::INTERNAL,
        }
    }
}

/// Error codes carried in HTTP error bodies
pub mod error_codes {
    pub const INVALID_BOARD: &str = "invalid_board";
    pub const ENCODE_WRITE: &str = "encode_write";
    pub const ENGINE_LAUNCH: &str = "engine_launch";
    pub const ENGINE_TIMEOUT: &str = "engine_timeout";
    pub const DECODE: &str = "decode";
    pub const MOVE_NOT_FOUND: &str = "move_not_found";
    pub const INTERNAL: &str = "internal";
}
