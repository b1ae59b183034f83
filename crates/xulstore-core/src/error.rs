//! Store-level error taxonomy.
//!
//! Mutations that arrive after shutdown are deliberately NOT represented
//! here: they are dropped with a logged warning so teardown never throws.

use crate::effects::storage::StorageError;

/// Error type for store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// An element id or attribute name was empty or exceeded the length cap.
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// What was wrong with the key
        reason: String,
    },

    /// The backing file could not be read or parsed.
    ///
    /// `load` recovers from this internally by starting empty; it only
    /// surfaces from the explicit parse API.
    #[error("failed to load store: {reason}")]
    LoadFailure {
        /// What went wrong while reading or parsing
        reason: String,
    },

    /// Flushing the store to disk failed. The in-memory state stays dirty.
    #[error("failed to write store: {reason}")]
    WriteFailure {
        /// What went wrong while writing
        reason: String,
    },
}

impl StoreError {
    /// Create an invalid-key error.
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }

    /// Create a load-failure error.
    pub fn load_failure(reason: impl Into<String>) -> Self {
        Self::LoadFailure {
            reason: reason.into(),
        }
    }

    /// Create a write-failure error.
    pub fn write_failure(reason: impl Into<String>) -> Self {
        Self::WriteFailure {
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { path } => Self::LoadFailure {
                reason: format!("file not found: {path}"),
            },
            StorageError::ReadFailed { reason } => Self::LoadFailure { reason },
            StorageError::WriteFailed { reason } => Self::WriteFailure { reason },
        }
    }
}
