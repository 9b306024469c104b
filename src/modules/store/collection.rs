use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use super::document::Document;
use super::error::StoreError;
use super::hub::Subscription;
use super::DocumentStore;

/// Typed view over one named collection.
///
/// This is the store-read boundary: documents that fail to decode are
/// skipped with a warning instead of failing the whole listing.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decode a batch of documents, dropping the ones that don't fit `T`.
    pub fn decode_all(&self, documents: &[Document]) -> Vec<T> {
        documents
            .iter()
            .filter_map(|doc| match doc.decode::<T>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed document '{}/{}': {}",
                        self.name,
                        doc.id,
                        e
                    );
                    None
                }
            })
            .collect()
    }

    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        let documents = self.store.read_all(&self.name).await?;
        Ok(self.decode_all(&documents))
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.store.read(&self.name, id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.store.read(&self.name, id).await?.is_some())
    }

    pub async fn insert(&self, id: &str, value: &T) -> Result<T, StoreError> {
        let data = Document::encode(value)?;
        let doc = self.store.create(&self.name, id, data).await?;
        Ok(doc.decode()?)
    }

    pub async fn replace(&self, id: &str, value: &T) -> Result<T, StoreError> {
        let data = Document::encode(value)?;
        let doc = self.store.update(&self.name, id, data).await?;
        Ok(doc.decode()?)
    }

    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(&self.name, id).await
    }

    pub async fn subscribe(&self) -> Result<Subscription, StoreError> {
        self.store.subscribe(&self.name).await
    }
}
