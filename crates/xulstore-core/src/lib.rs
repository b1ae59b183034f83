//! Shared vocabulary for the XULStore workspace.
//!
//! This crate defines the error taxonomy and the effect traits through which
//! the store reaches the outside world (file I/O, time). Production handlers
//! live in `xulstore-effects`; mock handlers for tests live in
//! `xulstore-testkit`. The store itself (`xulstore`) depends only on the
//! traits here, so every external interaction can be substituted in tests.

pub mod effects;
pub mod error;

pub use effects::storage::{StorageEffects, StorageError};
pub use effects::time::{TimeEffects, TimeError};
pub use error::StoreError;
