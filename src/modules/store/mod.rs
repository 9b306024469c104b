//! Record store adapter
//!
//! A flat, path-addressed document store: documents live under a named
//! collection and are keyed by `id`. Every backend supports `create`,
//! `update`, `delete`, `read` and `read_all`, plus `subscribe`, which delivers
//! an immutable, versioned snapshot of a collection each time it changes.
//!
//! Backends:
//! - [`PgDocumentStore`]: JSONB rows in PostgreSQL, changes fanned out with
//!   `LISTEN/NOTIFY` (see [`ChangeListener`])
//! - [`MemoryDocumentStore`]: process-local, used when no database is
//!   configured and in tests

mod collection;
mod document;
mod error;
mod hub;
mod memory;
mod postgres;

use async_trait::async_trait;
use serde_json::Value;

pub use collection::Collection;
pub use document::{Document, Snapshot};
pub use error::StoreError;
pub use hub::{SnapshotHub, Subscription};
pub use memory::MemoryDocumentStore;
pub use postgres::{ChangeListener, PgDocumentStore};

/// Operations every document store backend provides.
///
/// `read_all` and snapshots order documents most-recently-created first.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn read(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert a new document. Fails with [`StoreError::Conflict`] if `id` is taken.
    async fn create(&self, collection: &str, id: &str, data: Value)
        -> Result<Document, StoreError>;

    /// Replace the data of an existing document, keeping its position.
    async fn update(&self, collection: &str, id: &str, data: Value)
        -> Result<Document, StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Subscribe to snapshots of a collection. The current snapshot is
    /// available immediately; dropping the subscription ends it.
    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError>;
}
