//! Filesystem storage handler with atomic writes.

use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use xulstore_core::effects::storage::{StorageEffects, StorageError};

/// Storage handler backed by the real filesystem.
///
/// Writes go to a sibling `<name>.tmp` file which is fsynced and then
/// renamed over the destination, so the destination file is never observed
/// in a partially written state.
#[derive(Debug, Clone, Default)]
pub struct FilesystemStorageHandler;

impl FilesystemStorageHandler {
    /// Create a new filesystem storage handler.
    pub fn new() -> Self {
        Self
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl StorageEffects for FilesystemStorageHandler {
    async fn read_utf8(&self, path: &Path) -> Result<String, StorageError> {
        match fs::read_to_string(path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound {
                path: path.display().to_string(),
            }),
            Err(e) => Err(StorageError::ReadFailed {
                reason: format!("{}: {e}", path.display()),
            }),
        }
    }

    async fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| StorageError::WriteFailed {
                reason: format!("failed to create {}: {e}", parent.display()),
            })?;
        }

        let temp_path = Self::temp_path(path);
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| StorageError::WriteFailed {
                reason: format!("failed to create temp file: {e}"),
            })?;

        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| StorageError::WriteFailed {
                reason: format!("failed to write data: {e}"),
            })?;

        file.sync_all().await.map_err(|e| StorageError::WriteFailed {
            reason: format!("failed to sync: {e}"),
        })?;
        drop(file);

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| StorageError::WriteFailed {
                reason: format!("failed to rename temp file: {e}"),
            })?;

        debug!("wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}
