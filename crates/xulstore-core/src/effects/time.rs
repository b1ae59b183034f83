//! Time effect trait.
//!
//! The store's only use of time is the one-shot write-delay timer, so the
//! trait is a single delayed-wakeup primitive. The production handler
//! sleeps on the runtime clock; the testkit handler parks sleepers until
//! the test releases them, which makes timer arming observable.

use async_trait::async_trait;
use std::sync::Arc;

/// Error type for time operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TimeError {
    /// The sleep was interrupted before the requested delay elapsed.
    #[error("sleep interrupted: {reason}")]
    Interrupted {
        /// Why the sleeper was woken early
        reason: String,
    },
}

/// Delayed-wakeup operations consumed by the store's flush scheduler.
#[async_trait]
pub trait TimeEffects: Send + Sync {
    /// Complete after `ms` milliseconds have elapsed.
    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError>;
}

#[async_trait]
impl<T: TimeEffects + ?Sized> TimeEffects for Arc<T> {
    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        (**self).sleep_ms(ms).await
    }
}
