use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::entries::models::Entry;

/// Full entry, as returned by the detail and admin endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntryResponseDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub link: String,
    pub image_url: Option<String>,
    pub details: Option<String>,
    pub featured: Vec<String>,
}

impl From<Entry> for EntryResponseDto {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            description: entry.description,
            category: entry.category,
            tags: entry.tags,
            link: entry.link,
            image_url: entry.image_url,
            details: entry.details,
            featured: entry.featured,
        }
    }
}
