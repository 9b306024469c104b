use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::entries::dtos::EntryResponseDto;
use crate::features::entries::models::{Entry, EntryDraft};
use crate::modules::store::{Collection, StoreError};
use crate::shared::validation::slugify;

/// Attempts at claiming a fresh id before giving up on a create
const MAX_ID_ATTEMPTS: usize = 5;

/// Service for catalog entry records
pub struct EntryService {
    entries: Collection<Entry>,
}

impl EntryService {
    pub fn new(entries: Collection<Entry>) -> Self {
        Self { entries }
    }

    /// List all entries, newest first
    pub async fn list(&self) -> Result<Vec<EntryResponseDto>> {
        let entries = self.entries.list().await?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    /// Get one entry by id, or `None` if absent
    pub async fn find(&self, id: &str) -> Result<Option<Entry>> {
        Ok(self.entries.get(id).await?)
    }

    /// Get one entry by id
    pub async fn get(&self, id: &str) -> Result<EntryResponseDto> {
        self.find(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Entry '{}' not found", id)))
    }

    /// Create an entry with an id derived from its name.
    ///
    /// Ids are never reused: a taken or empty slug gets a short random suffix.
    pub async fn create(&self, draft: EntryDraft) -> Result<Entry> {
        let base = slugify(&draft.name);

        for attempt in 0..MAX_ID_ATTEMPTS {
            let candidate = if attempt == 0 && !base.is_empty() {
                base.clone()
            } else {
                with_suffix(&base)
            };

            if self.entries.exists(&candidate).await? {
                continue;
            }

            let entry = draft.clone().into_entry(candidate.clone());
            match self.entries.insert(&candidate, &entry).await {
                Ok(created) => {
                    tracing::info!("Created entry '{}'", created.id);
                    return Ok(created);
                }
                // Lost a race for the id; try another
                Err(StoreError::Conflict { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Conflict(format!(
            "Could not allocate an id for '{}'",
            draft.name
        )))
    }

    /// Replace an entry's fields. The id never changes, even on rename.
    pub async fn update(&self, id: &str, draft: EntryDraft) -> Result<Entry> {
        let entry = draft.into_entry(id.to_string());
        let updated = self.entries.replace(id, &entry).await?;
        tracing::info!("Updated entry '{}'", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.entries.remove(id).await?;
        tracing::info!("Deleted entry '{}'", id);
        Ok(())
    }
}

fn with_suffix(base: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    let suffix = &simple[..6];
    if base.is_empty() {
        format!("entry-{}", suffix)
    } else {
        format!("{}-{}", base, suffix)
    }
}
