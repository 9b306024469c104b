use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A catalog entry as stored in the `tools` collection.
///
/// Stored documents keep camelCase field names. Shapes written by older
/// clients are normalized here: a missing or non-array `tags`/`featured`
/// reads as empty, blank strings inside them are dropped, and an empty
/// `imageUrl`/`details` reads as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub link: String,
    #[serde(
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub featured: Vec<String>,
}

impl Entry {
    pub fn is_featured_in(&self, label: &str) -> bool {
        self.featured.iter().any(|f| f == label)
    }
}

/// Validated entry fields without an id, produced by the admin editor
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub link: String,
    pub image_url: Option<String>,
    pub details: Option<String>,
    pub featured: Vec<String>,
}

impl EntryDraft {
    pub fn into_entry(self, id: String) -> Entry {
        Entry {
            id,
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

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_document() {
        let entry: Entry = serde_json::from_value(json!({
            "id": "hoppscotch",
            "name": "Hoppscotch",
            "description": "API development ecosystem",
            "category": "API Tools",
            "tags": ["api", "http"],
            "link": "https://hoppscotch.io",
            "imageUrl": "https://example.com/h.png",
            "details": "Open source",
            "featured": ["Hot"]
        }))
        .unwrap();

        assert_eq!(entry.image_url.as_deref(), Some("https://example.com/h.png"));
        assert!(entry.is_featured_in("Hot"));
        assert!(!entry.is_featured_in("Latest"));
    }

    #[test]
    fn test_decode_normalizes_loose_shapes() {
        let entry: Entry = serde_json::from_value(json!({
            "id": "x",
            "name": "X",
            "tags": "not-a-list",
            "featured": ["Hot", "", 3],
            "imageUrl": "",
            "details": null
        }))
        .unwrap();

        assert!(entry.tags.is_empty());
        assert_eq!(entry.featured, vec!["Hot"]);
        assert_eq!(entry.image_url, None);
        assert_eq!(entry.details, None);
        assert_eq!(entry.category, "");
    }

    #[test]
    fn test_encode_uses_camel_case_and_skips_absent() {
        let entry = Entry {
            id: "x".to_string(),
            name: "X".to_string(),
            description: "Some description".to_string(),
            category: "CLI".to_string(),
            tags: vec!["cli".to_string()],
            link: "https://x.dev".to_string(),
            image_url: Some("https://x.dev/x.png".to_string()),
            details: None,
            featured: vec![],
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["imageUrl"], "https://x.dev/x.png");
        assert!(value.get("image_url").is_none());
        assert!(value.get("details").is_none());
    }
}
