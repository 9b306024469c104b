use std::sync::Arc;

use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::{BannerRequestDto, EntryRequestDto};
use crate::features::banners::dtos::BannerResponseDto;
use crate::features::banners::services::BannerService;
use crate::features::entries::dtos::EntryResponseDto;
use crate::features::entries::models::EntryDraft;
use crate::features::entries::services::EntryService;
use crate::shared::validation::validation_messages;

/// Admin editor: validates submissions and applies them to the store
pub struct AdminService {
    entries: Arc<EntryService>,
    banners: Arc<BannerService>,
}

impl AdminService {
    pub fn new(entries: Arc<EntryService>, banners: Arc<BannerService>) -> Self {
        Self { entries, banners }
    }

    // =========================================================================
    // ENTRIES
    // =========================================================================

    pub async fn list_entries(&self) -> Result<Vec<EntryResponseDto>> {
        self.entries.list().await
    }

    pub async fn get_entry(&self, id: &str) -> Result<EntryResponseDto> {
        self.entries.get(id).await
    }

    pub async fn create_entry(&self, dto: EntryRequestDto) -> Result<EntryResponseDto> {
        let draft = validate_entry(dto)?;
        Ok(self.entries.create(draft).await?.into())
    }

    pub async fn update_entry(&self, id: &str, dto: EntryRequestDto) -> Result<EntryResponseDto> {
        let draft = validate_entry(dto)?;
        Ok(self.entries.update(id, draft).await?.into())
    }

    pub async fn delete_entry(&self, id: &str) -> Result<()> {
        self.entries.delete(id).await
    }

    // =========================================================================
    // BANNERS
    // =========================================================================

    pub async fn list_banners(&self) -> Result<Vec<BannerResponseDto>> {
        self.banners.list().await
    }

    pub async fn create_banner(&self, dto: BannerRequestDto) -> Result<BannerResponseDto> {
        let dto = validate_banner(dto)?;
        self.banners.create(dto.image_url, dto.link).await
    }

    pub async fn update_banner(
        &self,
        id: &str,
        dto: BannerRequestDto,
    ) -> Result<BannerResponseDto> {
        let dto = validate_banner(dto)?;
        self.banners.update(id, dto.image_url, dto.link).await
    }

    pub async fn delete_banner(&self, id: &str) -> Result<()> {
        self.banners.delete(id).await
    }
}

fn validate_entry(dto: EntryRequestDto) -> Result<EntryDraft> {
    let dto = dto.normalized();
    dto.validate()
        .map_err(|e| AppError::InvalidFields(validation_messages(&e)))?;
    Ok(dto.into_draft())
}

fn validate_banner(dto: BannerRequestDto) -> Result<BannerRequestDto> {
    let dto = dto.normalized();
    dto.validate()
        .map_err(|e| AppError::InvalidFields(validation_messages(&e)))?;
    Ok(dto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::banners::models::Banner;
    use crate::features::entries::models::Entry;
    use crate::modules::store::{Collection, DocumentStore, MemoryDocumentStore};

    fn service() -> AdminService {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        AdminService::new(
            Arc::new(EntryService::new(Collection::<Entry>::new(
                store.clone(),
                "tools",
            ))),
            Arc::new(BannerService::new(Collection::<Banner>::new(
                store, "banners",
            ))),
        )
    }

    fn request(name: &str) -> EntryRequestDto {
        EntryRequestDto {
            name: name.to_string(),
            description: "A long enough description".to_string(),
            category: "CLI".to_string(),
            tags: vec!["cli".to_string()],
            link: "https://example.com".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_entry_normalizes_and_stores() {
        let service = service();
        let created = service
            .create_entry(EntryRequestDto {
                name: "  Ripgrep ".to_string(),
                image_url: Some(" ".to_string()),
                ..request("")
            })
            .await
            .unwrap();

        assert_eq!(created.id, "ripgrep");
        assert_eq!(created.name, "Ripgrep");
        assert_eq!(created.image_url, None);
        assert_eq!(service.list_entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_entry_is_rejected_without_write() {
        let service = service();
        let result = service
            .create_entry(EntryRequestDto {
                tags: vec![],
                ..request("Ripgrep")
            })
            .await;

        match result {
            Err(AppError::InvalidFields(messages)) => {
                assert_eq!(messages, vec!["At least one tag is required."]);
            }
            other => panic!("unexpected result: {:?}", other.map(|e| e.id)),
        }
        assert!(service.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_entry_keeps_id() {
        let service = service();
        let created = service.create_entry(request("Ripgrep")).await.unwrap();
        let updated = service
            .update_entry(&created.id, request("ripgrep (rg)"))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "ripgrep (rg)");
    }

    #[tokio::test]
    async fn test_banner_crud() {
        let service = service();
        let banner = service
            .create_banner(BannerRequestDto {
                image_url: "https://img.dev/b.png".to_string(),
                link: "https://dest.dev".to_string(),
            })
            .await
            .unwrap();

        let invalid = service
            .update_banner(
                &banner.id,
                BannerRequestDto {
                    image_url: "https://img.dev/b.png".to_string(),
                    link: "nowhere".to_string(),
                },
            )
            .await;
        assert!(matches!(invalid, Err(AppError::InvalidFields(_))));

        service.delete_banner(&banner.id).await.unwrap();
        assert!(service.list_banners().await.unwrap().is_empty());
    }
}
