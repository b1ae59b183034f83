//! Debounce and flush scheduling, observed through the mock time handler.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use xulstore::{StoreError, XulStore, XulStoreConfig};
use xulstore_testkit::{FailingStorageHandler, MemoryStorageHandler, MockTimeHandler};

const DOC: &str = "chrome://browser/content/browser.xhtml";

fn store_path() -> PathBuf {
    PathBuf::from("/profile/xulstore.json")
}

async fn gated_store() -> (
    XulStore<MemoryStorageHandler, MockTimeHandler>,
    Arc<MemoryStorageHandler>,
    Arc<MockTimeHandler>,
) {
    let storage = Arc::new(MemoryStorageHandler::new());
    let time = Arc::new(MockTimeHandler::new());
    let store = XulStore::load(
        XulStoreConfig::with_path(store_path()),
        Arc::clone(&storage),
        Arc::clone(&time),
    )
    .await;
    (store, storage, time)
}

/// Yield until `cond` holds, failing the test after two seconds.
async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn first_mutation_arms_the_timer_with_configured_delay() {
    let (store, _storage, time) = gated_store().await;
    store.set_value(DOC, "main-window", "width", "1904").unwrap();

    time.wait_for_sleepers(1).await;
    assert_eq!(time.sleeps(), vec![30_000]);
}

#[tokio::test]
async fn identical_set_does_not_rearm_timer() {
    let (store, _storage, time) = gated_store().await;
    store.set_value(DOC, "main-window", "width", "1904").unwrap();
    store.set_value(DOC, "main-window", "width", "1904").unwrap();

    time.wait_for_sleepers(1).await;
    assert_eq!(time.sleep_count(), 1);
}

#[tokio::test]
async fn mutations_during_dirty_window_coalesce() {
    let (store, storage, time) = gated_store().await;
    store.set_value(DOC, "main-window", "width", "1904").unwrap();
    store.set_value(DOC, "main-window", "height", "1612").unwrap();
    store.set_value(DOC, "sidebar", "collapsed", "true").unwrap();

    time.wait_for_sleepers(1).await;
    assert_eq!(time.sleep_count(), 1);
    assert_eq!(storage.write_count(), 0);

    time.release_sleepers();
    wait_until(|| storage.write_count() == 1).await;

    let contents = storage.contents(&store_path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value[DOC]["main-window"]["width"], "1904");
    assert_eq!(value[DOC]["main-window"]["height"], "1612");
    assert_eq!(value[DOC]["sidebar"]["collapsed"], "true");
    assert!(!store.is_dirty());
}

#[tokio::test]
async fn mutation_after_flush_arms_a_new_timer() {
    let (store, storage, time) = gated_store().await;
    store.set_value(DOC, "main-window", "width", "1904").unwrap();

    time.wait_for_sleepers(1).await;
    time.release_sleepers();
    wait_until(|| storage.write_count() == 1).await;

    store.set_value(DOC, "main-window", "width", "1905").unwrap();
    time.wait_for_sleepers(2).await;
    assert_eq!(time.sleep_count(), 2);
}

#[tokio::test]
async fn explicit_flush_writes_without_waiting_for_timer() {
    let (store, storage, time) = gated_store().await;
    store.set_value(DOC, "main-window", "width", "1904").unwrap();

    store.flush().await.unwrap();
    assert_eq!(storage.write_count(), 1);
    assert!(!store.is_dirty());

    // The parked timer fires later and finds nothing to write.
    time.wait_for_sleepers(1).await;
    time.release_sleepers();
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(storage.write_count(), 1);
}

#[tokio::test]
async fn flush_on_clean_store_is_a_no_op() {
    let (store, storage, _time) = gated_store().await;
    store.flush().await.unwrap();
    assert_eq!(storage.write_count(), 0);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn immediate_timer_persists_without_explicit_flush() {
    let storage = Arc::new(MemoryStorageHandler::new());
    let time = Arc::new(MockTimeHandler::immediate());
    let store = XulStore::load(
        XulStoreConfig::with_path(store_path()),
        Arc::clone(&storage),
        Arc::clone(&time),
    )
    .await;

    store.set_value(DOC, "main-window", "width", "1904").unwrap();
    wait_until(|| storage.write_count() == 1).await;
    assert_eq!(storage.len(), 1);
    assert!(!store.is_dirty());
}

#[tokio::test]
async fn failed_write_leaves_store_dirty() {
    let storage = Arc::new(FailingStorageHandler::new());
    let time = Arc::new(MockTimeHandler::new());
    let store = XulStore::load(
        XulStoreConfig::with_path(store_path()),
        Arc::clone(&storage),
        Arc::clone(&time),
    )
    .await;

    storage.set_fail_writes(true);
    store.set_value(DOC, "main-window", "width", "1904").unwrap();

    let err = store.flush().await;
    assert!(matches!(err, Err(StoreError::WriteFailure { .. })));
    assert!(store.is_dirty());

    // In-memory state is intact and a later flush persists it.
    storage.set_fail_writes(false);
    store.flush().await.unwrap();
    assert!(!store.is_dirty());
    assert!(storage
        .inner()
        .contents(&store_path())
        .unwrap()
        .contains("1904"));
}

#[tokio::test]
async fn mutation_after_failed_deferred_write_rearms_timer() {
    let storage = Arc::new(FailingStorageHandler::new());
    let time = Arc::new(MockTimeHandler::new());
    let store = XulStore::load(
        XulStoreConfig::with_path(store_path()),
        Arc::clone(&storage),
        Arc::clone(&time),
    )
    .await;

    storage.set_fail_writes(true);
    store.set_value(DOC, "main-window", "width", "1904").unwrap();
    time.wait_for_sleepers(1).await;
    time.release_sleepers();
    wait_until(|| storage.write_attempts() == 1).await;
    assert!(store.is_dirty());

    // The store is still dirty; the next mutation arms a fresh timer and
    // the retried write carries both values.
    storage.set_fail_writes(false);
    store.set_value(DOC, "main-window", "height", "1612").unwrap();
    time.wait_for_sleepers(2).await;
    time.release_sleepers();
    wait_until(|| storage.inner().write_count() == 1).await;

    let contents = storage.inner().contents(&store_path()).unwrap();
    assert!(contents.contains("1904"));
    assert!(contents.contains("1612"));
    assert!(!store.is_dirty());
}

#[tokio::test]
async fn shutdown_cancels_pending_timer_and_flushes_inline() {
    let (store, storage, time) = gated_store().await;
    store.set_value(DOC, "main-window", "width", "1904").unwrap();
    time.wait_for_sleepers(1).await;

    store.shutdown().await;
    assert_eq!(storage.write_count(), 1);
    assert!(!store.is_dirty());

    // Releasing the (cancelled) sleeper must not produce a second write.
    time.release_sleepers();
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(storage.write_count(), 1);
}
