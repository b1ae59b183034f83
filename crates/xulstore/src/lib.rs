//! Persistent per-document element-attribute store.
//!
//! `XulStore` records string-valued UI state keyed by
//! (document URI, element id, attribute name), such as window geometry or
//! sidebar toggle state, and persists it across restarts as a single JSON
//! file (`xulstore.json` by default) in the host's profile directory.
//!
//! Mutations are synchronous and cheap; disk writes are deferred onto a
//! one-shot delay timer so bursts of mutations coalesce into one atomic
//! write. On the host's shutdown signal the store flushes any pending
//! state immediately and becomes read-only for the rest of the process
//! lifetime.
//!
//! The store reaches the filesystem and the clock only through the effect
//! traits in `xulstore-core`; production handlers live in
//! `xulstore-effects`. The async flush path requires a Tokio runtime.
//!
//! ```no_run
//! # async fn demo() {
//! use std::sync::Arc;
//! use xulstore::{XulStore, XulStoreConfig};
//! use xulstore_effects::{FilesystemStorageHandler, SystemTimeHandler};
//!
//! let config = XulStoreConfig::new("/path/to/profile");
//! let store = XulStore::load(
//!     config,
//!     Arc::new(FilesystemStorageHandler::new()),
//!     Arc::new(SystemTimeHandler::new()),
//! )
//! .await;
//!
//! store
//!     .set_value("chrome://browser/content/browser.xhtml", "main-window", "width", "1904")
//!     .unwrap();
//! // ... on the process-lifecycle "shutting down" signal:
//! store.shutdown().await;
//! # }
//! ```

pub mod config;
pub mod data;
pub mod store;

pub use config::{XulStoreConfig, STORE_FILENAME};
pub use data::StoreData;
pub use store::{StoreStats, XulStore, MAX_KEY_LEN, MAX_VALUE_LEN};
pub use xulstore_core::StoreError;
