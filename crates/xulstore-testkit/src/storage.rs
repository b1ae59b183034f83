//! Mock storage handlers.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use xulstore_core::effects::storage::{StorageEffects, StorageError};

/// In-memory storage handler for tests.
///
/// Files live in a shared path → contents map; writes are counted so tests
/// can assert how often the store actually hit "disk".
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageHandler {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    write_count: Arc<AtomicUsize>,
}

impl MemoryStorageHandler {
    /// Create an empty in-memory storage handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handler with one pre-existing file.
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let handler = Self::new();
        handler
            .files
            .lock()
            .insert(path.into(), contents.into());
        handler
    }

    /// Current contents of `path`, if any.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().get(path).cloned()
    }

    /// Number of writes performed so far.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    /// Whether no files are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageEffects for MemoryStorageHandler {
    async fn read_utf8(&self, path: &Path) -> Result<String, StorageError> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: path.display().to_string(),
            })
    }

    async fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        self.files
            .lock()
            .insert(path.to_path_buf(), contents.to_string());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Storage handler with switchable failure injection.
///
/// Delegates to an inner `MemoryStorageHandler` unless reads or writes have
/// been set to fail.
#[derive(Debug, Clone, Default)]
pub struct FailingStorageHandler {
    inner: MemoryStorageHandler,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    write_attempts: Arc<AtomicUsize>,
}

impl FailingStorageHandler {
    /// Create a handler that succeeds until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The wrapped in-memory handler, for inspection.
    pub fn inner(&self) -> &MemoryStorageHandler {
        &self.inner
    }

    /// Number of write attempts so far, including failed ones.
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageEffects for FailingStorageHandler {
    async fn read_utf8(&self, path: &Path) -> Result<String, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::ReadFailed {
                reason: "injected read failure".into(),
            });
        }
        self.inner.read_utf8(path).await
    }

    async fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed {
                reason: "injected write failure".into(),
            });
        }
        self.inner.write_atomic(path, contents).await
    }
}
