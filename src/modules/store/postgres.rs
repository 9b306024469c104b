use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgListener;
use sqlx::{FromRow, PgPool};

use super::document::Document;
use super::error::StoreError;
use super::hub::{SnapshotHub, Subscription};
use super::DocumentStore;

/// Channel the `documents` trigger notifies on; the payload is the collection name
const CHANGE_CHANNEL: &str = "document_changes";

/// Delay before reconnecting after the listener connection fails
const RECONNECT_DELAY_SECS: u64 = 5;

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    data: Value,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document::new(row.id, row.data)
    }
}

/// PostgreSQL-backed document store (`documents` table, JSONB data).
pub struct PgDocumentStore {
    pool: PgPool,
    hub: SnapshotHub,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            hub: SnapshotHub::new(),
        }
    }

    /// Reload `collection` and publish it, if anyone is subscribed to it.
    ///
    /// Concurrent refreshes of one collection run one after another, and a
    /// refresh issued while the first subscriber is loading waits for it.
    pub async fn refresh(&self, collection: &str) -> Result<(), StoreError> {
        self.hub
            .refresh_with(collection, || self.read_all(collection))
            .await?;
        Ok(())
    }

    /// Reload every subscribed collection.
    pub async fn refresh_all(&self) {
        for collection in self.hub.tracked_collections().await {
            if let Err(e) = self.refresh(&collection).await {
                tracing::error!("Failed to refresh collection '{}': {:?}", collection, e);
            }
        }
    }

    async fn refresh_after_write(&self, collection: &str) {
        if let Err(e) = self.refresh(collection).await {
            tracing::warn!(
                "Write to '{}' succeeded but snapshot refresh failed: {:?}",
                collection,
                e
            );
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1
            ORDER BY seq DESC
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read collection '{}': {:?}", collection, e);
            StoreError::Database(e)
        })?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read document '{}/{}': {:?}", collection, id, e);
            StoreError::Database(e)
        })?;

        Ok(row.map(Document::from))
    }

    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            RETURNING id, data
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&data)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create document '{}/{}': {:?}", collection, id, e);
            StoreError::Database(e)
        })?
        .ok_or_else(|| StoreError::conflict(collection, id))?;

        self.refresh_after_write(collection).await;
        Ok(row.into())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET data = $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING id, data
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&data)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update document '{}/{}': {:?}", collection, id, e);
            StoreError::Database(e)
        })?
        .ok_or_else(|| StoreError::not_found(collection, id))?;

        self.refresh_after_write(collection).await;
        Ok(row.into())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete document '{}/{}': {:?}", collection, id, e);
            StoreError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }

        self.refresh_after_write(collection).await;
        Ok(())
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        self.hub
            .subscribe_with(collection, || self.read_all(collection))
            .await
    }
}

/// Background worker that turns `pg_notify` events into fresh snapshots,
/// so writes from other instances reach this instance's subscribers.
pub struct ChangeListener {
    pool: PgPool,
    store: Arc<PgDocumentStore>,
}

impl ChangeListener {
    pub fn new(pool: PgPool, store: Arc<PgDocumentStore>) -> Self {
        Self { pool, store }
    }

    /// Run the listener in a background loop
    pub async fn run(&self) {
        tracing::info!("Starting document change listener on '{}'", CHANGE_CHANNEL);

        loop {
            if let Err(e) = self.listen().await {
                tracing::error!("Document change listener failed: {:?}", e);
            }
            tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)).await;
        }
    }

    async fn listen(&self) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;

        // Anything may have changed while we were not listening
        self.store.refresh_all().await;

        loop {
            match listener.try_recv().await? {
                Some(notification) => {
                    let collection = notification.payload();
                    tracing::debug!("Change notification for collection '{}'", collection);
                    if let Err(e) = self.store.refresh(collection).await {
                        tracing::error!("Failed to refresh collection '{}': {:?}", collection, e);
                    }
                }
                None => {
                    // Connection dropped; notifications may have been missed
                    tracing::warn!("Change listener connection lost, reconnecting");
                    self.store.refresh_all().await;
                }
            }
        }
    }
}
