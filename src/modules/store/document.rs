use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// A stored document: its key and its data.
///
/// The data never contains the key; [`Document::decode`] merges it back in as
/// `id` so domain types can carry it as an ordinary field.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Decode into a domain type, exposing the key as `id`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut value = self.data.clone();
        if let Value::Object(ref mut map) = value {
            map.insert("id".to_string(), Value::String(self.id.clone()));
        }
        serde_json::from_value(value)
    }

    /// Encode a domain type into document data, dropping its `id` field.
    pub fn encode<T: Serialize>(value: &T) -> Result<Value, serde_json::Error> {
        let mut data = serde_json::to_value(value)?;
        if let Value::Object(ref mut map) = data {
            map.remove("id");
        }
        Ok(data)
    }
}

/// Immutable, point-in-time view of one collection.
///
/// `version` increases with every published snapshot, so two snapshots with
/// the same version hold the same documents.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub version: u64,
    pub documents: Vec<Document>,
}
