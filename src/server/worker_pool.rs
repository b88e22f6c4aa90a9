//! Bounded execution of CPU-bound jobs on tokio's blocking pool.

use super::metrics::WORKER_POOL_BUSY;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Keeps the busy gauge balanced even when a job panics.
struct BusyGuard;

impl BusyGuard {
    fn enter() -> Self {
        WORKER_POOL_BUSY.inc();
        BusyGuard
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        WORKER_POOL_BUSY.dec();
    }
}

pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `job` on the blocking pool once a permit is free.
    /// Callers wait (asynchronously) while all permits are taken.
    pub async fn run<F, R>(&self, job: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| anyhow!("Worker pool is closed"))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _busy = BusyGuard::enter();
            job()
        })
        .await
        .map_err(|e| anyhow!("Worker task failed: {}", e))
    }
}
