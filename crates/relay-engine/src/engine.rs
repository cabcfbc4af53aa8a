//! Engine trait

use async_trait::async_trait;
use relay_core::Result;

/// Output captured from a successful engine run
#[derive(Debug, Clone, Default)]
pub struct EngineReport {
    /// Text the engine wrote to stdout
    pub stdout: String,
    /// Advisory diagnostics the engine wrote to stderr
    pub stderr: String,
}

/// Something that computes a move by rewriting the exchange file
///
/// `invoke` returns only after the engine is done with the file. An `Err`
/// means the file contents are undefined and must not be read.
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    /// Run the engine once against the current exchange file
    async fn invoke(&self) -> Result<EngineReport>;
}
