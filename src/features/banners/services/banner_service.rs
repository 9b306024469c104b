use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::banners::dtos::BannerResponseDto;
use crate::features::banners::models::Banner;
use crate::modules::store::Collection;

/// Service for carousel banners
pub struct BannerService {
    banners: Collection<Banner>,
}

impl BannerService {
    pub fn new(banners: Collection<Banner>) -> Self {
        Self { banners }
    }

    /// List all banners, newest first
    pub async fn list(&self) -> Result<Vec<BannerResponseDto>> {
        let banners = self.banners.list().await?;
        Ok(banners.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, image_url: String, link: String) -> Result<BannerResponseDto> {
        let id = Uuid::now_v7().to_string();
        let banner = Banner {
            id: id.clone(),
            image_url,
            link,
        };

        let created = self.banners.insert(&id, &banner).await?;
        tracing::info!("Created banner '{}'", id);
        Ok(created.into())
    }

    pub async fn update(
        &self,
        id: &str,
        image_url: String,
        link: String,
    ) -> Result<BannerResponseDto> {
        let banner = Banner {
            id: id.to_string(),
            image_url,
            link,
        };

        let updated = self.banners.replace(id, &banner).await.map_err(|e| {
            tracing::debug!("Banner update failed: {}", e);
            AppError::from(e)
        })?;
        Ok(updated.into())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.banners.remove(id).await?;
        tracing::info!("Deleted banner '{}'", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::store::{DocumentStore, MemoryDocumentStore};
    use std::sync::Arc;

    fn service() -> BannerService {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        BannerService::new(Collection::new(store, "banners"))
    }

    #[tokio::test]
    async fn test_create_list_newest_first() {
        let service = service();
        let first = service
            .create("https://img/1.png".into(), "https://one.dev".into())
            .await
            .unwrap();
        let second = service
            .create("https://img/2.png".into(), "https://two.dev".into())
            .await
            .unwrap();

        let ids: Vec<String> = service.list().await.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = service();
        let banner = service
            .create("https://img/1.png".into(), "https://one.dev".into())
            .await
            .unwrap();

        let updated = service
            .update(&banner.id, "https://img/3.png".into(), "https://three.dev".into())
            .await
            .unwrap();
        assert_eq!(updated.id, banner.id);
        assert_eq!(updated.link, "https://three.dev");

        service.delete(&banner.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
        assert!(matches!(
            service.delete(&banner.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_banner() {
        let result = service()
            .update("ghost", "https://img.png".into(), "https://x.dev".into())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
