use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::entries::dtos::EntryResponseDto;
use crate::features::entries::models::EntryDraft;
use crate::shared::constants::FEATURED_LABELS;

// =============================================================================
// ENTRY DTOs
// =============================================================================

/// Create or update a catalog entry.
///
/// Values are normalized before validation: `name`, `category`, `link` and
/// `tags` are trimmed, blank tags are dropped, blank `image_url`/`details`
/// become absent, and `featured` keeps only known labels, without duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct EntryRequestDto {
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: String,

    #[validate(length(min = 10, message = "Description must be at least 10 characters."))]
    pub description: String,

    #[validate(length(min = 2, message = "Category is required."))]
    pub category: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "At least one tag is required."))]
    pub tags: Vec<String>,

    #[validate(url(message = "Please enter a valid URL."))]
    pub link: String,

    #[serde(default)]
    #[validate(url(message = "Please enter a valid URL."))]
    pub image_url: Option<String>,

    #[serde(default)]
    pub details: Option<String>,

    /// Any of "Top Trending", "Latest", "Hot"
    #[serde(default)]
    pub featured: Vec<String>,
}

impl EntryRequestDto {
    pub fn normalized(self) -> Self {
        let mut featured: Vec<String> = Vec::new();
        for label in self.featured {
            let label = label.trim();
            if FEATURED_LABELS.contains(&label) && !featured.iter().any(|f| f == label) {
                featured.push(label.to_string());
            }
        }

        Self {
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category.trim().to_string(),
            tags: self
                .tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            link: self.link.trim().to_string(),
            image_url: non_blank(self.image_url),
            details: non_blank(self.details),
            featured,
        }
    }

    pub fn into_draft(self) -> EntryDraft {
        EntryDraft {
            name: self.name,
            description: self.description,
            category: self.category,
            tags: self.tags,
            link: self.link,
            image_url: self.image_url,
            details: self.details,
            featured: self.featured,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The admin panel's entry form, as posted by the browser
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Comma-separated
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub details: String,
    pub featured_top_trending: Option<String>,
    pub featured_latest: Option<String>,
    pub featured_hot: Option<String>,
}

impl From<EntryFormData> for EntryRequestDto {
    fn from(form: EntryFormData) -> Self {
        let featured = [
            (form.featured_top_trending.is_some(), FEATURED_LABELS[0]),
            (form.featured_latest.is_some(), FEATURED_LABELS[1]),
            (form.featured_hot.is_some(), FEATURED_LABELS[2]),
        ]
        .into_iter()
        .filter(|(checked, _)| *checked)
        .map(|(_, label)| label.to_string())
        .collect();

        Self {
            name: form.name,
            description: form.description,
            category: form.category,
            tags: form.tags.split(',').map(String::from).collect(),
            link: form.link,
            image_url: Some(form.image_url),
            details: Some(form.details),
            featured,
        }
    }
}

impl From<&EntryResponseDto> for EntryFormData {
    fn from(entry: &EntryResponseDto) -> Self {
        let has = |label: &str| entry.featured.iter().any(|f| f == label).then(|| "on".to_string());
        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
            category: entry.category.clone(),
            tags: entry.tags.join(", "),
            link: entry.link.clone(),
            image_url: entry.image_url.clone().unwrap_or_default(),
            details: entry.details.clone().unwrap_or_default(),
            featured_top_trending: has(FEATURED_LABELS[0]),
            featured_latest: has(FEATURED_LABELS[1]),
            featured_hot: has(FEATURED_LABELS[2]),
        }
    }
}

// =============================================================================
// BANNER DTOs
// =============================================================================

/// Create or update a carousel banner (also the admin panel's banner form)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BannerRequestDto {
    #[serde(default)]
    #[validate(url(message = "Please enter a valid image URL."))]
    pub image_url: String,

    #[serde(default)]
    #[validate(url(message = "Please enter a valid destination URL."))]
    pub link: String,
}

impl BannerRequestDto {
    pub fn normalized(self) -> Self {
        Self {
            image_url: self.image_url.trim().to_string(),
            link: self.link.trim().to_string(),
        }
    }
}
