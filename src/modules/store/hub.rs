use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{watch, Mutex, RwLock};

use super::document::{Document, Snapshot};
use super::error::StoreError;

/// Fan-out point for collection snapshots.
///
/// Each tracked collection owns one `watch` channel holding its latest
/// snapshot. Backends publish into the hub after every change; consumers
/// only ever see immutable snapshots and never touch backend state.
///
/// Loads that go through [`SnapshotHub::refresh_with`] or
/// [`SnapshotHub::subscribe_with`] hold a per-collection lock from read to
/// publish, so a later read is never overwritten by an earlier one.
pub struct SnapshotHub {
    channels: RwLock<HashMap<String, watch::Sender<Arc<Snapshot>>>>,
    load_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
    last_version: AtomicU64,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            load_locks: StdMutex::new(HashMap::new()),
            last_version: AtomicU64::new(0),
        }
    }

    fn load_lock(&self, collection: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .load_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(collection.to_string()).or_default())
    }

    fn next_snapshot(&self, documents: Vec<Document>) -> Arc<Snapshot> {
        let version = self.last_version.fetch_add(1, Ordering::SeqCst) + 1;
        Arc::new(Snapshot { version, documents })
    }

    /// Publish a new snapshot of `collection`, returning its version.
    pub async fn publish(&self, collection: &str, documents: Vec<Document>) -> u64 {
        let snapshot = self.next_snapshot(documents);
        let version = snapshot.version;

        let mut channels = self.channels.write().await;
        match channels.get(collection) {
            Some(sender) => {
                sender.send_replace(snapshot);
            }
            None => {
                let (sender, _) = watch::channel(snapshot);
                channels.insert(collection.to_string(), sender);
            }
        }

        tracing::debug!(collection, version, "Published collection snapshot");
        version
    }

    /// Reload `collection` with `load` and publish the result, if anyone is
    /// subscribed to it. Returns the published version.
    ///
    /// Waits for any load of the same collection already in flight,
    /// including a first subscription, so the read always happens after it.
    pub async fn refresh_with<F, Fut>(
        &self,
        collection: &str,
        load: F,
    ) -> Result<Option<u64>, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Document>, StoreError>>,
    {
        let lock = self.load_lock(collection);
        let _guard = lock.lock().await;

        if !self.is_tracked(collection).await {
            return Ok(None);
        }

        let documents = load().await?;
        Ok(Some(self.publish(collection, documents).await))
    }

    /// Whether a snapshot channel exists for `collection`.
    pub async fn is_tracked(&self, collection: &str) -> bool {
        self.channels.read().await.contains_key(collection)
    }

    pub async fn tracked_collections(&self) -> Vec<String> {
        self.channels.read().await.keys().cloned().collect()
    }

    /// Subscribe to `collection`, loading its first snapshot with `load` if
    /// nobody has published it yet.
    pub async fn subscribe_with<F, Fut>(
        &self,
        collection: &str,
        load: F,
    ) -> Result<Subscription, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Document>, StoreError>>,
    {
        if let Some(sender) = self.channels.read().await.get(collection) {
            return Ok(Subscription::new(sender.subscribe()));
        }

        let lock = self.load_lock(collection);
        let _guard = lock.lock().await;

        if let Some(sender) = self.channels.read().await.get(collection) {
            return Ok(Subscription::new(sender.subscribe()));
        }

        let documents = load().await?;

        let mut channels = self.channels.write().await;
        // A plain publish may have landed while we were loading
        if let Some(sender) = channels.get(collection) {
            return Ok(Subscription::new(sender.subscribe()));
        }

        let (sender, receiver) = watch::channel(self.next_snapshot(documents));
        channels.insert(collection.to_string(), sender);
        Ok(Subscription::new(receiver))
    }
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to one collection.
///
/// Holds only a receiver: dropping it is the whole teardown.
#[derive(Debug, Clone)]
pub struct Subscription {
    receiver: watch::Receiver<Arc<Snapshot>>,
}

impl Subscription {
    fn new(receiver: watch::Receiver<Arc<Snapshot>>) -> Self {
        Self { receiver }
    }

    /// The latest snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.receiver.borrow().clone()
    }

    /// Whether the publisher is gone
    pub fn is_closed(&self) -> bool {
        self.receiver.has_changed().is_err()
    }

    /// Wait for the next snapshot. Returns `None` once the publisher is gone.
    pub async fn changed(&mut self) -> Option<Arc<Snapshot>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}
