use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::catalog::services::CatalogView;
use crate::features::catalog::session::CatalogSession;
use crate::features::catalog::state::{CatalogFilter, Selection};
use crate::features::entries::models::Entry;
use crate::shared::constants::PLACEHOLDER_IMAGE_URL;

/// Filter values accepted on the query string
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQueryDto {
    /// Case-insensitive substring of name or description
    #[serde(default)]
    pub search: Option<String>,
    /// Exact category, or `all`
    #[serde(default)]
    pub category: Option<String>,
    /// Featured label, or `all`
    #[serde(default)]
    pub featured: Option<String>,
}

impl CatalogQueryDto {
    pub fn to_filter(&self) -> CatalogFilter {
        CatalogFilter::new(
            self.search.clone().unwrap_or_default(),
            Selection::parse(self.category.as_deref().unwrap_or_default()),
            Selection::parse(self.featured.as_deref().unwrap_or_default()),
        )
    }
}

/// Card shown in catalog listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntryCardDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Entry image, or the placeholder when none is set
    pub image_url: String,
    /// External project link
    pub link: String,
    /// Detail page path
    pub detail_path: String,
    pub featured: Vec<String>,
}

impl From<&Entry> for EntryCardDto {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            category: entry.category.clone(),
            tags: entry.tags.clone(),
            image_url: entry
                .image_url
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            link: entry.link.clone(),
            detail_path: format!("/tool/{}", urlencoding::encode(&entry.id)),
            featured: entry.featured.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogFilterDto {
    pub search: String,
    pub category: String,
    pub featured: String,
}

impl From<&CatalogFilter> for CatalogFilterDto {
    fn from(filter: &CatalogFilter) -> Self {
        Self {
            search: filter.search_term.clone(),
            category: filter.category.as_str().to_string(),
            featured: filter.featured.as_str().to_string(),
        }
    }
}

/// Categories plus the visible entries for one filter
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogViewDto {
    pub version: u64,
    pub categories: Vec<String>,
    pub entries: Vec<EntryCardDto>,
    pub total: usize,
    pub filter: CatalogFilterDto,
    /// Set when the catalog could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl CatalogViewDto {
    pub fn from_session(session: &CatalogSession, notice: Option<String>) -> Self {
        let entries: Vec<EntryCardDto> = session.visible_entries().iter().map(Into::into).collect();
        Self {
            version: session.version(),
            categories: session.categories().as_ref().clone(),
            total: entries.len(),
            entries,
            filter: session.filter().into(),
            notice,
        }
    }
}

impl From<CatalogView> for CatalogViewDto {
    fn from(view: CatalogView) -> Self {
        let entries: Vec<EntryCardDto> = view.entries.iter().map(Into::into).collect();
        Self {
            version: view.version,
            categories: view.categories.as_ref().clone(),
            total: entries.len(),
            entries,
            filter: (&view.filter).into(),
            notice: view.notice,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoriesDto {
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Messages a live catalog client may send
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LiveCommand {
    SetSearch(String),
    SetCategory(String),
    SetFeatured(String),
}

/// Messages pushed to a live catalog client
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    View(CatalogViewDto),
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(image_url: Option<&str>) -> Entry {
        Entry {
            id: "hoppscotch".to_string(),
            name: "Hoppscotch".to_string(),
            description: "API client".to_string(),
            category: "API Tools".to_string(),
            tags: vec!["api".to_string()],
            link: "https://hoppscotch.io".to_string(),
            image_url: image_url.map(String::from),
            details: None,
            featured: vec![],
        }
    }

    #[test]
    fn test_card_uses_placeholder_without_image() {
        let card = EntryCardDto::from(&entry(None));
        assert_eq!(card.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(card.detail_path, "/tool/hoppscotch");
        assert_eq!(card.link, "https://hoppscotch.io");
    }

    #[test]
    fn test_card_keeps_image() {
        let card = EntryCardDto::from(&entry(Some("https://img.dev/h.png")));
        assert_eq!(card.image_url, "https://img.dev/h.png");
    }

    #[test]
    fn test_query_to_filter() {
        let query = CatalogQueryDto {
            search: Some("Hopp".to_string()),
            category: Some("all".to_string()),
            featured: Some("Hot".to_string()),
        };
        let filter = query.to_filter();
        assert_eq!(filter.search_term, "Hopp");
        assert_eq!(filter.category, Selection::All);
        assert_eq!(filter.featured, Selection::Only("Hot".to_string()));

        assert_eq!(CatalogQueryDto::default().to_filter(), CatalogFilter::default());
    }

    #[test]
    fn test_live_command_parsing() {
        let command: LiveCommand =
            serde_json::from_str(r#"{"type":"set_search","value":"hopp"}"#).unwrap();
        assert_eq!(command, LiveCommand::SetSearch("hopp".to_string()));

        let command: LiveCommand =
            serde_json::from_str(r#"{"type":"set_featured","value":"Hot"}"#).unwrap();
        assert_eq!(command, LiveCommand::SetFeatured("Hot".to_string()));

        assert!(serde_json::from_str::<LiveCommand>(r#"{"type":"drop_tables"}"#).is_err());
    }
}
