use std::sync::Arc;

use tokio::sync::RwLock;

use crate::features::catalog::memo::Memo;
use crate::features::catalog::session::{CatalogSession, CatalogSnapshot};
use crate::features::catalog::state::{derive_categories, filter_entries, CatalogFilter};
use crate::features::entries::models::Entry;
use crate::modules::store::{Collection, Snapshot, Subscription};

/// Shown when the entry collection can't be read
pub const CATALOG_UNAVAILABLE_NOTICE: &str =
    "The catalog is unavailable right now. Showing no entries; please try again later.";

/// Result of a one-off catalog query
pub struct CatalogView {
    pub version: u64,
    pub categories: Arc<Vec<String>>,
    pub entries: Arc<Vec<Entry>>,
    pub filter: CatalogFilter,
    pub notice: Option<String>,
}

/// A catalog session bound to the live snapshot feed
pub struct LiveCatalog {
    pub session: CatalogSession,
    /// `None` when the store could not be subscribed to
    pub subscription: Option<Subscription>,
    pub notice: Option<String>,
}

/// Serves catalog views from a live subscription to the entry collection.
///
/// Store failures never fail a catalog read: the view degrades to an empty
/// snapshot and carries a notice for the page to show.
///
/// The memos here are shared by every caller, so they are keyed by version
/// only. Filtered views are memoized per live session instead.
pub struct CatalogService {
    entries: Collection<Entry>,
    subscription: RwLock<Option<Subscription>>,
    decoded: Memo<u64, Arc<CatalogSnapshot>>,
    categories: Memo<u64, Arc<Vec<String>>>,
    /// Entries of the unfiltered view, the one most requests ask for
    unfiltered: Memo<u64, Arc<Vec<Entry>>>,
}

impl CatalogService {
    pub fn new(entries: Collection<Entry>) -> Self {
        Self {
            entries,
            subscription: RwLock::new(None),
            decoded: Memo::new(),
            categories: Memo::new(),
            unfiltered: Memo::new(),
        }
    }

    /// The shared subscription, opened on first use and kept while its feed is open
    async fn subscription(&self) -> Option<Subscription> {
        if let Some(subscription) = self.subscription.read().await.as_ref() {
            if !subscription.is_closed() {
                return Some(subscription.clone());
            }
        }

        let mut slot = self.subscription.write().await;
        if let Some(subscription) = slot.as_ref().filter(|s| !s.is_closed()) {
            return Some(subscription.clone());
        }

        match self.entries.subscribe().await {
            Ok(subscription) => {
                tracing::info!("Subscribed to collection '{}'", self.entries.name());
                *slot = Some(subscription.clone());
                Some(subscription)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to subscribe to collection '{}': {}",
                    self.entries.name(),
                    e
                );
                None
            }
        }
    }

    /// Decode a store snapshot, reusing the last result for the same version
    pub fn decode(&self, snapshot: &Snapshot) -> Arc<CatalogSnapshot> {
        self.decoded.get_or_compute(snapshot.version, || {
            Arc::new(CatalogSnapshot::new(
                snapshot.version,
                self.entries.decode_all(&snapshot.documents),
            ))
        })
    }

    /// Latest decoded snapshot, or an empty one plus a notice
    pub async fn current(&self) -> (Arc<CatalogSnapshot>, Option<String>) {
        match self.subscription().await {
            Some(subscription) => (self.decode(&subscription.current()), None),
            None => (
                Arc::new(CatalogSnapshot::default()),
                Some(CATALOG_UNAVAILABLE_NOTICE.to_string()),
            ),
        }
    }

    pub async fn query(&self, filter: CatalogFilter) -> CatalogView {
        let (snapshot, notice) = self.current().await;
        let version = snapshot.version;

        let categories = self
            .categories
            .get_or_compute(version, || Arc::new(derive_categories(&snapshot.entries)));
        let entries = if filter.is_unrestricted() {
            self.unfiltered
                .get_or_compute(version, || Arc::new(filter_entries(&snapshot.entries, &filter)))
        } else {
            Arc::new(filter_entries(&snapshot.entries, &filter))
        };

        CatalogView {
            version,
            categories,
            entries,
            filter,
            notice,
        }
    }

    /// Find one entry in the current snapshot
    pub async fn find(&self, id: &str) -> (Option<Entry>, Option<String>) {
        let (snapshot, notice) = self.current().await;
        let entry = snapshot.entries.iter().find(|e| e.id == id).cloned();
        (entry, notice)
    }

    /// Start a live session that follows the snapshot feed
    pub async fn open_live(&self, filter: CatalogFilter) -> LiveCatalog {
        let subscription = self.subscription().await;
        let (snapshot, notice) = match &subscription {
            Some(subscription) => (self.decode(&subscription.current()), None),
            None => (
                Arc::new(CatalogSnapshot::default()),
                Some(CATALOG_UNAVAILABLE_NOTICE.to_string()),
            ),
        };

        LiveCatalog {
            session: CatalogSession::new(snapshot).with_filter(filter),
            subscription,
            notice,
        }
    }

    /// Retry the feed for a live session that started without one.
    /// Returns the subscription and its decoded snapshot once the store answers.
    pub async fn reconnect_live(&self) -> Option<(Subscription, Arc<CatalogSnapshot>)> {
        let subscription = self.subscription().await?;
        let snapshot = self.decode(&subscription.current());
        Some((subscription, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::state::Selection;
    use crate::modules::store::{Document, DocumentStore, MemoryDocumentStore, StoreError};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        fn backend(&self) -> &'static str {
            "broken"
        }

        async fn read_all(&self, _collection: &str) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn read(&self, _c: &str, _id: &str) -> Result<Option<Document>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn create(&self, _c: &str, _id: &str, _d: Value) -> Result<Document, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn update(&self, _c: &str, _id: &str, _d: Value) -> Result<Document, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn delete(&self, _c: &str, _id: &str) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn subscribe(&self, _c: &str) -> Result<Subscription, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
    }

    /// Memory store whose reads fail until it is switched on
    struct FlakyStore {
        inner: MemoryDocumentStore,
        available: AtomicBool,
    }

    impl FlakyStore {
        fn check(&self) -> Result<(), StoreError> {
            if self.available.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(StoreError::Database(sqlx::Error::PoolClosed))
            }
        }
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        fn backend(&self) -> &'static str {
            "flaky"
        }

        async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
            self.check()?;
            self.inner.read_all(collection).await
        }

        async fn read(&self, c: &str, id: &str) -> Result<Option<Document>, StoreError> {
            self.check()?;
            self.inner.read(c, id).await
        }

        async fn create(&self, c: &str, id: &str, d: Value) -> Result<Document, StoreError> {
            self.inner.create(c, id, d).await
        }

        async fn update(&self, c: &str, id: &str, d: Value) -> Result<Document, StoreError> {
            self.inner.update(c, id, d).await
        }

        async fn delete(&self, c: &str, id: &str) -> Result<(), StoreError> {
            self.inner.delete(c, id).await
        }

        async fn subscribe(&self, c: &str) -> Result<Subscription, StoreError> {
            self.check()?;
            self.inner.subscribe(c).await
        }
    }

    fn tool(name: &str, category: &str) -> Value {
        json!({
            "name": name,
            "description": format!("{} is a useful tool", name),
            "category": category,
            "tags": ["oss"],
            "link": "https://example.com"
        })
    }

    async fn seeded() -> (Arc<MemoryDocumentStore>, CatalogService) {
        let store = Arc::new(MemoryDocumentStore::new());
        store.create("tools", "b", tool("Postman Clone", "API Tools")).await.unwrap();
        store.create("tools", "a", tool("Hoppscotch", "API Tools")).await.unwrap();
        store.create("tools", "r", tool("Ripgrep", "CLI")).await.unwrap();
        store.create("tools", "bad", json!({"description": "no name"})).await.unwrap();

        let service = CatalogService::new(Collection::new(
            store.clone() as Arc<dyn DocumentStore>,
            "tools",
        ));
        (store, service)
    }

    #[tokio::test]
    async fn test_query_filters_and_skips_malformed() {
        let (_, service) = seeded().await;

        let view = service.query(CatalogFilter::default()).await;
        let ids: Vec<&str> = view.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["r", "a", "b"]);
        assert_eq!(*view.categories, vec!["all", "API Tools", "CLI"]);
        assert!(view.notice.is_none());

        let view = service
            .query(CatalogFilter::new("hopp", Selection::All, Selection::All))
            .await;
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].id, "a");
    }

    #[tokio::test]
    async fn test_query_follows_writes() {
        let (store, service) = seeded().await;
        let before = service.query(CatalogFilter::default()).await;

        store.delete("tools", "r").await.unwrap();

        let after = service.query(CatalogFilter::default()).await;
        assert!(after.version > before.version);
        assert_eq!(after.entries.len(), 2);
        assert_eq!(*after.categories, vec!["all", "API Tools"]);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_with_notice() {
        let service = CatalogService::new(Collection::new(
            Arc::new(BrokenStore) as Arc<dyn DocumentStore>,
            "tools",
        ));

        let view = service.query(CatalogFilter::default()).await;
        assert!(view.entries.is_empty());
        assert_eq!(*view.categories, vec!["all"]);
        assert_eq!(view.notice.as_deref(), Some(CATALOG_UNAVAILABLE_NOTICE));

        let live = service.open_live(CatalogFilter::default()).await;
        assert!(live.subscription.is_none());
        assert!(live.notice.is_some());
    }

    #[tokio::test]
    async fn test_live_session_receives_new_snapshot() {
        let (store, service) = seeded().await;
        let mut live = service.open_live(CatalogFilter::default()).await;
        assert_eq!(live.session.visible_entries().len(), 3);

        store
            .create("tools", "k", tool("K9s", "CLI"))
            .await
            .unwrap();

        let subscription = live.subscription.as_mut().unwrap();
        let snapshot = subscription.changed().await.unwrap();
        live.session.replace_snapshot(service.decode(&snapshot));

        assert_eq!(live.session.visible_entries()[0].id, "k");
    }

    #[tokio::test]
    async fn test_live_session_reconnects_after_store_recovers() {
        let store = Arc::new(FlakyStore {
            inner: MemoryDocumentStore::new(),
            available: AtomicBool::new(false),
        });
        store
            .create("tools", "a", tool("Hoppscotch", "API Tools"))
            .await
            .unwrap();
        let service = CatalogService::new(Collection::new(
            store.clone() as Arc<dyn DocumentStore>,
            "tools",
        ));

        let mut live = service.open_live(CatalogFilter::default()).await;
        assert!(live.subscription.is_none());
        assert!(service.reconnect_live().await.is_none());

        store.available.store(true, Ordering::SeqCst);

        let (subscription, snapshot) = service.reconnect_live().await.unwrap();
        live.session.replace_snapshot(snapshot);
        assert_eq!(live.session.visible_entries().len(), 1);
        assert_eq!(subscription.current().documents.len(), 1);
        assert!(service.query(CatalogFilter::default()).await.notice.is_none());
    }

    #[tokio::test]
    async fn test_filtered_queries_keep_unfiltered_view_cached() {
        let (_, service) = seeded().await;

        let first = service.query(CatalogFilter::default()).await;
        let filtered = service
            .query(CatalogFilter::new("", Selection::parse("CLI"), Selection::All))
            .await;
        let second = service.query(CatalogFilter::default()).await;

        assert_eq!(filtered.entries.len(), 1);
        assert!(Arc::ptr_eq(&first.entries, &second.entries));
        assert!(Arc::ptr_eq(&first.categories, &filtered.categories));
    }

    #[tokio::test]
    async fn test_find() {
        let (_, service) = seeded().await;
        assert_eq!(service.find("a").await.0.unwrap().name, "Hoppscotch");
        assert!(service.find("missing").await.0.is_none());
    }
}
