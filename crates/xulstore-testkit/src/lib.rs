//! Mock effect handlers for testing the store without a filesystem or a
//! real clock.
//!
//! `MemoryStorageHandler` keeps files in a shared map and counts writes;
//! `FailingStorageHandler` wraps it with switchable failure injection;
//! `MockTimeHandler` parks sleepers until the test releases them, which
//! makes write-timer arming directly observable.

pub mod storage;
pub mod time;

pub use storage::{FailingStorageHandler, MemoryStorageHandler};
pub use time::MockTimeHandler;

/// Install a fmt tracing subscriber honoring `RUST_LOG`, for test debugging.
///
/// Safe to call from multiple tests; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
