use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::document::Document;
use super::error::StoreError;
use super::hub::{SnapshotHub, Subscription};
use super::DocumentStore;

struct Row {
    seq: u64,
    data: Value,
}

type Rows = HashMap<String, Row>;

/// Process-local document store.
///
/// Writes publish a fresh snapshot while still holding the write lock, so
/// subscribers observe changes in the order they were applied.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Rows>>,
    next_seq: AtomicU64,
    hub: SnapshotHub,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            hub: SnapshotHub::new(),
        }
    }

    fn ordered(rows: Option<&Rows>) -> Vec<Document> {
        let Some(rows) = rows else {
            return Vec::new();
        };

        let mut entries: Vec<(&String, &Row)> = rows.iter().collect();
        entries.sort_by(|a, b| b.1.seq.cmp(&a.1.seq));
        entries
            .into_iter()
            .map(|(id, row)| Document::new(id.clone(), row.data.clone()))
            .collect()
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(Self::ordered(collections.get(collection)))
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|rows| rows.get(id))
            .map(|row| Document::new(id, row.data.clone())))
    }

    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection.to_string()).or_default();

        if rows.contains_key(id) {
            return Err(StoreError::conflict(collection, id));
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        rows.insert(
            id.to_string(),
            Row {
                seq,
                data: data.clone(),
            },
        );

        self.hub
            .publish(collection, Self::ordered(collections.get(collection)))
            .await;
        Ok(Document::new(id, data))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let row = collections
            .get_mut(collection)
            .and_then(|rows| rows.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        row.data = data.clone();

        self.hub
            .publish(collection, Self::ordered(collections.get(collection)))
            .await;
        Ok(Document::new(id, data))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|rows| rows.remove(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        self.hub
            .publish(collection, Self::ordered(collections.get(collection)))
            .await;
        Ok(())
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        self.hub
            .subscribe_with(collection, || self.read_all(collection))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_read_all_is_most_recent_first() {
        let store = MemoryDocumentStore::new();
        store.create("tools", "a", json!({})).await.unwrap();
        store.create("tools", "b", json!({})).await.unwrap();
        store.create("tools", "c", json!({})).await.unwrap();

        let docs = store.read_all("tools").await.unwrap();
        assert_eq!(ids(&docs), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_create_existing_id_conflicts() {
        let store = MemoryDocumentStore::new();
        store
            .create("tools", "a", json!({ "v": 1 }))
            .await
            .unwrap();

        let result = store.create("tools", "a", json!({ "v": 2 })).await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));

        let doc = store.read("tools", "a").await.unwrap().unwrap();
        assert_eq!(doc.data, json!({ "v": 1 }));
    }

    #[tokio::test]
    async fn test_update_keeps_position() {
        let store = MemoryDocumentStore::new();
        store.create("tools", "a", json!({})).await.unwrap();
        store.create("tools", "b", json!({})).await.unwrap();
        store
            .update("tools", "a", json!({ "edited": true }))
            .await
            .unwrap();

        let docs = store.read_all("tools").await.unwrap();
        assert_eq!(ids(&docs), vec!["b", "a"]);
        assert_eq!(docs[1].data, json!({ "edited": true }));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            store.update("tools", "nope", json!({})).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("tools", "nope").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryDocumentStore::new();
        store.create("tools", "a", json!({})).await.unwrap();
        store.create("banners", "a", json!({})).await.unwrap();

        store.delete("banners", "a").await.unwrap();
        assert_eq!(store.read_all("tools").await.unwrap().len(), 1);
        assert!(store.read_all("banners").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscription_sees_writes() {
        let store = MemoryDocumentStore::new();
        let mut sub = store.subscribe("tools").await.unwrap();
        assert!(sub.current().documents.is_empty());

        store.create("tools", "a", json!({})).await.unwrap();
        let snapshot = sub.changed().await.unwrap();
        assert_eq!(ids(&snapshot.documents), vec!["a"]);

        store.delete("tools", "a").await.unwrap();
        let snapshot = sub.changed().await.unwrap();
        assert!(snapshot.documents.is_empty());
    }
}
