//! Mock time handler with parked sleepers.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use xulstore_core::effects::time::{TimeEffects, TimeError};

/// Time handler whose sleepers wait until the test releases them.
///
/// Every `sleep_ms` call is recorded, then parks on a release channel. A
/// test can therefore assert exactly how many one-shot timers were armed
/// (`sleep_count`) before letting them fire with `release_sleepers`. The
/// `immediate` variant completes sleeps instantly for tests that do not
/// care about scheduling.
#[derive(Debug, Clone)]
pub struct MockTimeHandler {
    sleeps: Arc<Mutex<Vec<u64>>>,
    release_tx: Arc<watch::Sender<u64>>,
    immediate: bool,
}

impl MockTimeHandler {
    /// Create a handler whose sleepers park until released.
    pub fn new() -> Self {
        let (release_tx, _rx) = watch::channel(0);
        Self {
            sleeps: Arc::new(Mutex::new(Vec::new())),
            release_tx: Arc::new(release_tx),
            immediate: false,
        }
    }

    /// Create a handler whose sleeps complete immediately.
    pub fn immediate() -> Self {
        let mut handler = Self::new();
        handler.immediate = true;
        handler
    }

    /// Number of sleeps requested so far.
    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().len()
    }

    /// Delays requested so far, in order.
    pub fn sleeps(&self) -> Vec<u64> {
        self.sleeps.lock().clone()
    }

    /// Wake every sleeper parked at this point.
    pub fn release_sleepers(&self) {
        self.release_tx.send_modify(|generation| *generation += 1);
    }

    /// Yield until at least `n` sleepers have been recorded.
    ///
    /// Lets a test deterministically wait for a spawned timer task to reach
    /// its sleep before releasing it.
    pub async fn wait_for_sleepers(&self, n: usize) {
        while self.sleep_count() < n {
            tokio::task::yield_now().await;
        }
    }
}

impl Default for MockTimeHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimeEffects for MockTimeHandler {
    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        self.sleeps.lock().push(ms);
        if self.immediate {
            return Ok(());
        }

        let mut rx = self.release_tx.subscribe();
        let parked_at = *rx.borrow();
        loop {
            rx.changed().await.map_err(|_| TimeError::Interrupted {
                reason: "mock time handler dropped".into(),
            })?;
            if *rx.borrow() > parked_at {
                return Ok(());
            }
        }
    }
}
