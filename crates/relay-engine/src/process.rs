//! Subprocess engine
//!
//! Launches the engine executable, waits for it with a deadline and
//! classifies the result. Exit code 0 is success regardless of what the
//! engine prints on stderr.
//!
//! The deadline covers the engine's own exit only. On unix the engine runs in
//! its own process group, and the group is killed once the engine exits or
//! times out, so no helper it forked can touch the exchange file afterwards.
//! Output pipes that stay open past exit get a short grace period and are
//! then abandoned.

use crate::engine::{Engine, EngineReport};
use async_trait::async_trait;
use relay_core::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long stdout/stderr may stay open after the engine exits
const PIPE_GRACE: Duration = Duration::from_millis(500);

/// Configuration for the engine subprocess
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable
    pub program: PathBuf,
    /// Arguments passed to the executable (the stock engine takes none)
    pub args: Vec<String>,
    /// Working directory for the engine, the relay's own when unset
    pub working_dir: Option<PathBuf>,
    /// Deadline for the engine to exit, in milliseconds
    pub timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./main"),
            args: Vec::new(),
            working_dir: None,
            timeout_ms: 30_000,
        }
    }
}

impl EngineConfig {
    /// Config for a program with default settings
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Engine deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Engine backed by an external executable
pub struct ProcessEngine {
    config: EngineConfig,
}

impl ProcessEngine {
    /// Create an engine with custom configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

async fn drain<R: tokio::io::AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<String> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Wait up to [`PIPE_GRACE`] for a drained pipe, empty on failure
async fn collect(
    program: &str,
    stream: &str,
    mut task: JoinHandle<std::io::Result<String>>,
) -> String {
    match tokio::time::timeout(PIPE_GRACE, &mut task).await {
        Ok(Ok(Ok(text))) => text,
        Ok(Ok(Err(e))) => {
            warn!("Failed reading {} of engine {}: {}", stream, program, e);
            String::new()
        }
        Ok(Err(e)) => {
            warn!("Reader for {} of engine {} failed: {}", stream, program, e);
            String::new()
        }
        Err(_) => {
            task.abort();
            warn!("Engine {} exited but its {} stayed open, ignoring it", program, stream);
            String::new()
        }
    }
}

/// SIGKILL everything left in the engine's process group
#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: killpg takes no pointers; the group was created for this run.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        // ESRCH: nothing left in the group
        debug!("killpg({}): {}", pgid, std::io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

#[async_trait]
impl Engine for ProcessEngine {
    async fn invoke(&self) -> Result<EngineReport> {
        let program = self.config.program.display().to_string();
        let timeout = self.config.timeout();
        info!("Launching engine {}", program);

        let mut child = self
            .command()
            .spawn()
            .map_err(|e| RelayError::EngineLaunch(format!("failed to start {}: {}", program, e)))?;
        let pid = child.id();

        let stdout = tokio::spawn(drain(child.stdout.take()));
        let stderr = tokio::spawn(drain(child.stderr.take()));

        let outcome = tokio::time::timeout(timeout, child.wait()).await;
        kill_group(pid);
        let status = match outcome {
            Ok(result) => result.map_err(|e| {
                RelayError::EngineLaunch(format!("failed waiting for {}: {}", program, e))
            })?,
            Err(_) => {
                warn!("Engine {} exceeded {:?}, killing it", program, timeout);
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill engine {}: {}", program, e);
                }
                stdout.abort();
                stderr.abort();
                return Err(RelayError::EngineTimeout(timeout));
            }
        };

        let stdout = collect(&program, "stdout", stdout).await;
        let stderr = collect(&program, "stderr", stderr).await;

        if !stdout.trim().is_empty() {
            let preview: String = stdout.chars().take(200).collect();
            debug!("Engine stdout: {}", preview.trim_end());
        }
        if !stderr.trim().is_empty() {
            warn!("Engine stderr: {}", stderr.trim_end());
        }

        if !status.success() {
            return Err(RelayError::EngineLaunch(format!(
                "{} exited with {}: {}",
                program,
                status,
                stderr.trim()
            )));
        }

        info!("Engine {} finished", program);
        Ok(EngineReport { stdout, stderr })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> EngineConfig {
        EngineConfig {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.program, PathBuf::from("./main"));
        assert!(config.args.is_empty());
        assert!(config.working_dir.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_stderr_does_not_fail_successful_run() {
        let engine = ProcessEngine::new(shell("echo 'depth reduced' >&2; echo 7 2 3; exit 0"));

        let report = engine.invoke().await.unwrap();
        assert!(report.stderr.contains("depth reduced"));
        assert_eq!(report.stdout.trim(), "7 2 3");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_launch_error() {
        let engine = ProcessEngine::new(shell("echo 'Error opening file.' >&2; exit 1"));

        match engine.invoke().await {
            Err(RelayError::EngineLaunch(msg)) => assert!(msg.contains("Error opening file.")),
            other => panic!("expected launch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let engine = ProcessEngine::new(EngineConfig::with_program("/nonexistent/engine"));

        assert!(matches!(
            engine.invoke().await,
            Err(RelayError::EngineLaunch(_))
        ));
    }

    #[tokio::test]
    async fn test_hung_engine_times_out() {
        let mut config = shell("sleep 10");
        config.timeout_ms = 100;
        let engine = ProcessEngine::new(config);

        let start = std::time::Instant::now();
        assert!(matches!(
            engine.invoke().await,
            Err(RelayError::EngineTimeout(_))
        ));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_background_child_does_not_hold_engine_open() {
        // The forked sleep inherits stdout; exit of the engine itself is what counts
        let mut config = shell("sleep 3 & echo done; exit 0");
        config.timeout_ms = 1000;
        let engine = ProcessEngine::new(config);

        let start = std::time::Instant::now();
        let report = engine.invoke().await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(report.stdout.trim(), "done");
    }

    #[tokio::test]
    async fn test_timeout_kills_forked_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = shell("(sleep 1; echo late > late.txt) & sleep 10");
        config.working_dir = Some(dir.path().to_path_buf());
        config.timeout_ms = 200;
        let engine = ProcessEngine::new(config);

        assert!(matches!(
            engine.invoke().await,
            Err(RelayError::EngineTimeout(_))
        ));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("late.txt").exists());
    }

    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gameState.txt"), "Human Move:\n0 0\n0 0\n").unwrap();

        let mut config = shell("test -f gameState.txt && echo '1B 0' > row.txt");
        config.working_dir = Some(dir.path().to_path_buf());
        let engine = ProcessEngine::new(config);

        engine.invoke().await.unwrap();
        let written = std::fs::read_to_string(dir.path().join("row.txt")).unwrap();
        assert_eq!(written.trim(), "1B 0");
        assert!(engine.config().working_dir.is_some());
    }
}
