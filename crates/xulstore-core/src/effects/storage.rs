//! File storage effect trait.
//!
//! Two primitives are all the store needs: a UTF-8 file read that
//! distinguishes "missing" from "unreadable", and an atomic whole-file
//! write. The production handler in `xulstore-effects` implements the
//! write as temp-file-then-rename so a concurrent reader (or a crash
//! mid-write) never observes a partially written file.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Error type for storage operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// The file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// Path that was requested
        path: String,
    },

    /// The file exists but could not be read or decoded as UTF-8.
    #[error("read failed: {reason}")]
    ReadFailed {
        /// What went wrong
        reason: String,
    },

    /// The file could not be written.
    #[error("write failed: {reason}")]
    WriteFailed {
        /// What went wrong
        reason: String,
    },
}

/// File storage operations consumed by the store.
#[async_trait]
pub trait StorageEffects: Send + Sync {
    /// Read the file at `path` as UTF-8.
    ///
    /// Returns `StorageError::NotFound` when the file does not exist, so
    /// callers can treat a missing backing file differently from a broken
    /// one.
    async fn read_utf8(&self, path: &Path) -> Result<String, StorageError>;

    /// Atomically replace the file at `path` with `contents`.
    ///
    /// The destination must never be observable in a partially written
    /// state: implementations write a sibling temp file and rename it over
    /// the destination. The parent directory is created if needed.
    async fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: StorageEffects + ?Sized> StorageEffects for Arc<T> {
    async fn read_utf8(&self, path: &Path) -> Result<String, StorageError> {
        (**self).read_utf8(path).await
    }

    async fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        (**self).write_atomic(path, contents).await
    }
}
