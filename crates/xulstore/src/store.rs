//! The store component: load, mutate, debounce, flush, shutdown.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};
use xulstore_core::effects::storage::{StorageEffects, StorageError};
use xulstore_core::effects::time::TimeEffects;
use xulstore_core::StoreError;

use crate::config::XulStoreConfig;
use crate::data::StoreData;

/// Maximum length of an element id or attribute name, in characters.
///
/// Over-long keys are rejected, never truncated.
pub const MAX_KEY_LEN: usize = 512;

/// Maximum stored value length, in characters.
///
/// Longer values are silently truncated on write.
pub const MAX_VALUE_LEN: usize = 4096;

/// Point-in-time summary of the store's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of documents with at least one persisted attribute.
    pub documents: usize,
    /// Number of elements across all documents.
    pub elements: usize,
    /// Number of persisted attributes across all elements.
    pub attributes: usize,
    /// Whether in-memory state has not yet been written to disk.
    pub dirty: bool,
}

#[derive(Debug)]
struct Inner {
    data: StoreData,
    dirty: bool,
    timer_armed: bool,
    save_allowed: bool,
}

/// Durable, crash-tolerant storage of small string-valued UI state keyed by
/// (document URI, element id, attribute name), with bounded write frequency.
///
/// One instance per process, owned by the host and passed by reference.
/// Mutations and lookups are synchronous; the only asynchronous operation
/// is the deferred flush. At most one write timer is pending at a time, and
/// every mutation made while it is pending coalesces into its write. A
/// crash inside the delay window loses at most that window's mutations.
///
/// [`XulStore::shutdown`] is the hook for the host's "about to terminate
/// persistent state" signal: it cancels any pending timer, flushes dirty
/// state inline, and permanently disables writes. Later mutations are
/// dropped with a logged warning rather than an error, so teardown paths
/// never throw.
pub struct XulStore<S, T> {
    inner: Arc<Mutex<Inner>>,
    storage: Arc<S>,
    time: Arc<T>,
    config: XulStoreConfig,
    shutdown_tx: watch::Sender<bool>,
}

impl<S, T> XulStore<S, T>
where
    S: StorageEffects + 'static,
    T: TimeEffects + 'static,
{
    /// Load a store from its backing file.
    ///
    /// A missing, unreadable, or unparsable file yields an empty store;
    /// construction never fails, the problem is logged instead. Requires a
    /// running Tokio runtime for the deferred flush path.
    pub async fn load(config: XulStoreConfig, storage: Arc<S>, time: Arc<T>) -> Self {
        let data = read_data(storage.as_ref(), &config.path).await;
        let (shutdown_tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                data,
                dirty: false,
                timer_armed: false,
                save_allowed: true,
            })),
            storage,
            time,
            config,
            shutdown_tx,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Store `value` for `attr` on element `id` in `doc_uri`.
    ///
    /// Values longer than [`MAX_VALUE_LEN`] characters are truncated with a
    /// logged warning. Setting the already-stored value is a pure no-op:
    /// the store is not dirtied and no write is scheduled. After shutdown
    /// the mutation is dropped with a warning and `Ok` is returned.
    pub fn set_value(
        &self,
        doc_uri: &str,
        id: &str,
        attr: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        trace!("set {attr} for id={id}, doc={doc_uri}");

        let mut inner = self.inner.lock();
        if !inner.save_allowed {
            warn!("set_value after shutdown is ignored (doc={doc_uri}, id={id}, attr={attr})");
            return Ok(());
        }

        if doc_uri.is_empty() {
            return Err(StoreError::invalid_key("document URI must not be empty"));
        }
        validate_key("element id", id)?;
        validate_key("attribute name", attr)?;

        let value = clamp_value(id, attr, value);
        if inner.data.set(doc_uri, id, attr, &value) {
            self.mark_dirty(&mut inner);
        }
        Ok(())
    }

    /// Whether a value is stored for `attr` on element `id` in `doc_uri`.
    pub fn has_value(&self, doc_uri: &str, id: &str, attr: &str) -> bool {
        trace!("has {attr} for id={id}, doc={doc_uri}");
        self.inner.lock().data.has(doc_uri, id, attr)
    }

    /// The stored value, or `""` when any path segment is absent.
    ///
    /// An attribute explicitly stored as the empty string is
    /// indistinguishable from a missing one here; use
    /// [`XulStore::has_value`] to tell them apart.
    pub fn get_value(&self, doc_uri: &str, id: &str, attr: &str) -> String {
        trace!("get {attr} for id={id}, doc={doc_uri}");
        self.inner
            .lock()
            .data
            .get(doc_uri, id, attr)
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Remove the value for `attr` on element `id` in `doc_uri`.
    ///
    /// Emptied elements and documents are pruned. The store is dirtied only
    /// when a value was actually present. After shutdown the call is
    /// dropped with a warning.
    pub fn remove_value(&self, doc_uri: &str, id: &str, attr: &str) {
        trace!("remove {attr} for id={id}, doc={doc_uri}");

        let mut inner = self.inner.lock();
        if !inner.save_allowed {
            warn!("remove_value after shutdown is ignored (doc={doc_uri}, id={id}, attr={attr})");
            return;
        }
        if inner.data.remove(doc_uri, id, attr) {
            self.mark_dirty(&mut inner);
        }
    }

    /// Remove every value stored for `doc_uri`.
    pub fn remove_document(&self, doc_uri: &str) {
        trace!("remove values for doc={doc_uri}");

        let mut inner = self.inner.lock();
        if !inner.save_allowed {
            warn!("remove_document after shutdown is ignored (doc={doc_uri})");
            return;
        }
        if inner.data.remove_document(doc_uri) {
            self.mark_dirty(&mut inner);
        }
    }

    /// Snapshot of the element ids stored for `doc_uri`.
    pub fn list_ids(&self, doc_uri: &str) -> Vec<String> {
        self.inner.lock().data.ids(doc_uri)
    }

    /// Snapshot of the attribute names stored for element `id` in `doc_uri`.
    pub fn list_attributes(&self, doc_uri: &str, id: &str) -> Vec<String> {
        self.inner.lock().data.attrs(doc_uri, id)
    }

    /// Snapshot of the known document URIs.
    pub fn documents(&self) -> Vec<String> {
        self.inner.lock().data.documents()
    }

    /// Whether in-memory state has not yet been written to disk.
    pub fn is_dirty(&self) -> bool {
        self.inner.lock().dirty
    }

    /// Point-in-time summary of the store's contents.
    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.lock();
        StoreStats {
            documents: inner.data.document_count(),
            elements: inner.data.element_count(),
            attributes: inner.data.attribute_count(),
            dirty: inner.dirty,
        }
    }

    /// Write pending state to disk now, without waiting for the timer.
    ///
    /// No-op when the store is clean or already shut down. On failure the
    /// store stays dirty; the error is logged and returned.
    pub async fn flush(&self) -> Result<(), StoreError> {
        if !self.inner.lock().save_allowed {
            warn!("flush after shutdown is ignored");
            return Ok(());
        }
        flush_data(&self.inner, self.storage.as_ref(), &self.config.path).await
    }

    /// Replace in-memory state with the current backing-file contents,
    /// discarding unsaved changes.
    ///
    /// Unlike [`XulStore::load`], failures are surfaced: in-memory state is
    /// left untouched when the file cannot be read or parsed.
    pub async fn reload(&self) -> Result<(), StoreError> {
        if !self.inner.lock().save_allowed {
            warn!("reload after shutdown is ignored");
            return Ok(());
        }

        let contents = self
            .storage
            .read_utf8(&self.config.path)
            .await
            .map_err(StoreError::from)?;
        let data = StoreData::from_json(&contents)?;

        let mut inner = self.inner.lock();
        inner.data = data;
        inner.dirty = false;
        Ok(())
    }

    /// Handle the process-lifecycle "shutting down" signal.
    ///
    /// Cancels any pending write timer, flushes dirty state inline, and
    /// permanently disables writes: the store stays readable in memory but
    /// every later mutation is dropped with a logged warning. Idempotent.
    pub async fn shutdown(&self) {
        let was_allowed = {
            let mut inner = self.inner.lock();
            std::mem::replace(&mut inner.save_allowed, false)
        };
        if !was_allowed {
            return;
        }

        let _ = self.shutdown_tx.send(true);
        // Flush failure is already logged inside; teardown must not fail.
        let _ = flush_data(&self.inner, self.storage.as_ref(), &self.config.path).await;
        info!("store shut down; further mutations will be ignored");
    }

    fn mark_dirty(&self, inner: &mut Inner) {
        inner.dirty = true;
        if inner.timer_armed {
            return;
        }
        inner.timer_armed = true;
        self.arm_write_timer();
    }

    /// Arm the one-shot write-delay timer.
    ///
    /// Armed at most once per pending-write window: mutations made while a
    /// timer is pending coalesce into its write. A mutation after a failed
    /// flush finds the store dirty but no timer pending, and re-arms.
    fn arm_write_timer(&self) {
        let inner = Arc::clone(&self.inner);
        let storage = Arc::clone(&self.storage);
        let time = Arc::clone(&self.time);
        let path = self.config.path.clone();
        let delay = self.config.write_delay_ms;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            tokio::select! {
                // Fires on the shutdown signal, or when the store is dropped.
                _ = shutdown_rx.changed() => {
                    inner.lock().timer_armed = false;
                    debug!("write timer cancelled");
                }
                slept = time.sleep_ms(delay) => {
                    inner.lock().timer_armed = false;
                    if slept.is_ok() {
                        // Failure is logged inside; the store stays dirty and
                        // the next mutation re-arms the timer.
                        let _ = flush_data(&inner, storage.as_ref(), &path).await;
                    }
                }
            }
        });
    }
}

impl<S, T> std::fmt::Debug for XulStore<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("XulStore")
            .field("path", &self.config.path)
            .field("documents", &inner.data.document_count())
            .field("dirty", &inner.dirty)
            .field("save_allowed", &inner.save_allowed)
            .finish_non_exhaustive()
    }
}

async fn read_data<S: StorageEffects>(storage: &S, path: &Path) -> StoreData {
    match storage.read_utf8(path).await {
        Ok(contents) => match StoreData::from_json(&contents) {
            Ok(data) => {
                debug!(
                    "loaded {} documents from {}",
                    data.document_count(),
                    path.display()
                );
                data
            }
            Err(e) => {
                warn!("{}: {e}; starting with an empty store", path.display());
                StoreData::new()
            }
        },
        Err(StorageError::NotFound { .. }) => {
            debug!("{} not found; starting with an empty store", path.display());
            StoreData::new()
        }
        Err(e) => {
            warn!(
                "failed to read {}: {e}; starting with an empty store",
                path.display()
            );
            StoreData::new()
        }
    }
}

async fn flush_data<S: StorageEffects>(
    inner: &Mutex<Inner>,
    storage: &S,
    path: &Path,
) -> Result<(), StoreError> {
    let json = {
        let mut guard = inner.lock();
        if !guard.dirty {
            return Ok(());
        }
        match guard.data.to_json() {
            Ok(json) => {
                guard.dirty = false;
                json
            }
            Err(e) => {
                warn!("failed to serialize store: {e}");
                return Err(e);
            }
        }
    };

    match storage.write_atomic(path, &json).await {
        Ok(()) => {
            debug!("flushed store to {}", path.display());
            Ok(())
        }
        Err(e) => {
            inner.lock().dirty = true;
            let err = StoreError::from(e);
            warn!("failed to write {}: {err}", path.display());
            Err(err)
        }
    }
}

fn validate_key(kind: &str, key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::invalid_key(format!("{kind} must not be empty")));
    }
    let len = key.chars().count();
    if len > MAX_KEY_LEN {
        return Err(StoreError::invalid_key(format!(
            "{kind} too long ({len} > {MAX_KEY_LEN})"
        )));
    }
    Ok(())
}

fn clamp_value(id: &str, attr: &str, value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_LEN {
        return value.to_string();
    }
    warn!("truncating long value for id={id}, attr={attr}");
    value.chars().take(MAX_VALUE_LEN).collect()
}
