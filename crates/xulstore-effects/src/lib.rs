//! Production effect handlers for the XULStore workspace.
//!
//! `FilesystemStorageHandler` performs real file I/O with atomic
//! temp-file-then-rename writes; `SystemTimeHandler` sleeps on the runtime
//! clock. Both implement the traits from `xulstore-core`, so they can be
//! swapped for the deterministic handlers in `xulstore-testkit`.

pub mod storage;
pub mod time;

pub use storage::FilesystemStorageHandler;
pub use time::SystemTimeHandler;
