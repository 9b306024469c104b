use serde::{Deserialize, Serialize};

/// A promotional carousel item as stored in the `banners` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: String,
    pub image_url: String,
    pub link: String,
}
