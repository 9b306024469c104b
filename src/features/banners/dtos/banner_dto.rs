use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::banners::models::Banner;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BannerResponseDto {
    pub id: String,
    pub image_url: String,
    pub link: String,
}

impl From<Banner> for BannerResponseDto {
    fn from(banner: Banner) -> Self {
        Self {
            id: banner.id,
            image_url: banner.image_url,
            link: banner.link,
        }
    }
}
