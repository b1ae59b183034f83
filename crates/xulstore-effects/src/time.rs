//! Wall-clock time handler.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time;
use xulstore_core::effects::time::{TimeEffects, TimeError};

/// Time handler that sleeps on the runtime clock.
#[derive(Debug, Clone, Default)]
pub struct SystemTimeHandler;

impl SystemTimeHandler {
    /// Create a new system time handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeEffects for SystemTimeHandler {
    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }
}
