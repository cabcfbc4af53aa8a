//! Move service: encode, run the engine, diff the result
//!
//! Every request shares one exchange file, so the whole
//! encode → invoke → decode cycle runs under a single lock. The cycle runs on
//! its own task holding the lock guard: if the caller goes away mid-cycle the
//! engine still finishes and the next request sees a settled file.

use relay_core::{Board, Move, RelayError, Result, encode, extract_move};
use relay_engine::{Engine, ExchangeFile};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

struct Inner<E> {
    engine: E,
    exchange: ExchangeFile,
    label: String,
}

/// Relays boards to the engine one at a time
pub struct MoveService<E: Engine> {
    inner: Arc<Inner<E>>,
    cycle_lock: Arc<Mutex<()>>,
}

impl<E: Engine> Clone for MoveService<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cycle_lock: Arc::clone(&self.cycle_lock),
        }
    }
}

impl<E: Engine> MoveService<E> {
    /// Create a service driving `engine` through `exchange`
    pub fn new(engine: E, exchange: ExchangeFile, label: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine,
                exchange,
                label: label.into(),
            }),
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Exchange file used by this service
    pub fn exchange(&self) -> &ExchangeFile {
        &self.inner.exchange
    }

    /// Ask the engine for its move on `board`
    ///
    /// `Ok(None)` means the engine ran but no changed cell was found.
    pub async fn compute_move(&self, board: Board) -> Result<Option<Move>> {
        board.validate()?;

        let guard = Arc::clone(&self.cycle_lock).lock_owned().await;
        let inner = Arc::clone(&self.inner);
        let cycle = tokio::spawn(async move { inner.run_cycle(board, guard).await });

        cycle
            .await
            .map_err(|e| RelayError::Internal(format!("move cycle task failed: {}", e)))?
    }
}

impl<E: Engine> Inner<E> {
    async fn run_cycle(&self, board: Board, _guard: OwnedMutexGuard<()>) -> Result<Option<Move>> {
        info!(
            "Relaying {}x{} board via {:?}",
            board.num_rows(),
            board.num_cols(),
            self.exchange.path()
        );

        let record = encode(&board, &self.label);
        self.exchange.write(&record).await?;

        let report = self.engine.invoke().await?;
        debug!("Engine produced {} bytes of stdout", report.stdout.len());

        let rewritten = self.exchange.read().await?;
        let found = extract_move(&board, &rewritten)?;

        match found {
            Some(mv) => info!("Engine move is {}", mv),
            None => info!("Engine left the board unchanged"),
        }
        Ok(found)
    }
}
