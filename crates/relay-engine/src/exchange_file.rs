//! Shared exchange file
//!
//! One file location is used for every request. Writes replace the whole
//! file; reads fail loudly when the file is missing because a missing file
//! after an engine run means the engine did not produce a record.

use relay_core::{RelayError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Handle to the exchange file location
#[derive(Debug, Clone)]
pub struct ExchangeFile {
    path: PathBuf,
}

impl ExchangeFile {
    /// Create a handle for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file contents with `text`
    pub async fn write(&self, text: &str) -> Result<()> {
        fs::write(&self.path, text).await.map_err(|e| {
            RelayError::EncodeWrite(format!("{}: {}", self.path.display(), e))
        })?;
        debug!("Wrote {} bytes to {:?}", text.len(), self.path);
        Ok(())
    }

    /// Read the full file contents
    pub async fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => {
                debug!("Read {} bytes from {:?}", content.len(), self.path);
                Ok(content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RelayError::Decode(
                format!("exchange file {} does not exist", self.path.display()),
            )),
            Err(e) => Err(RelayError::Decode(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
