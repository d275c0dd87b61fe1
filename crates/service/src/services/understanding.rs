use std::collections::BTreeMap;
use std::sync::Arc;

use models::{Material, RecordId, Understanding};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::store::Store;
use crate::uploads::{FileStorage, UploadedFile};

/// Per-article study material: a summary plus uploaded files.
#[derive(Clone)]
pub struct UnderstandingService {
    store: Arc<Store>,
    files: Arc<dyn FileStorage>,
}

impl UnderstandingService {
    pub fn new(store: Arc<Store>, files: Arc<dyn FileStorage>) -> Self { Self { store, files } }

    pub async fn list(&self) -> BTreeMap<RecordId, Understanding> { self.store.list_understanding().await }

    pub async fn get(&self, article_id: RecordId) -> Result<Understanding, ServiceError> {
        self.store.get_understanding(article_id).await.ok_or_else(|| ServiceError::not_found("understanding"))
    }

    /// Replace the entry for `article_id` wholesale. The article must exist.
    #[instrument(skip(self, summary, uploads), fields(files = uploads.len()))]
    pub async fn replace(
        &self,
        article_id: RecordId,
        summary: Option<String>,
        uploads: Vec<UploadedFile>,
    ) -> Result<Understanding, ServiceError> {
        let summary = summary.unwrap_or_default();
        if summary.trim().is_empty() && uploads.is_empty() {
            return Err(ServiceError::Validation("summary or materials are required".into()));
        }
        if self.store.get_article(article_id).await.is_none() {
            return Err(ServiceError::not_found("article"));
        }

        let mut materials = Vec::with_capacity(uploads.len());
        for file in uploads {
            match self.files.save(file).await {
                Ok(stored) => materials.push(Material { name: stored.name, url: stored.url, size: stored.size }),
                Err(e) => {
                    self.remove_all(&materials).await;
                    return Err(e.into());
                }
            }
        }

        let Some((entry, previous)) = self.store.replace_understanding(article_id, summary, materials.clone()).await else {
            // article deleted while the files were being written
            self.remove_all(&materials).await;
            return Err(ServiceError::not_found("article"));
        };
        if let Some(prev) = previous {
            self.remove_all(&prev.materials).await;
        }
        info!(article_id, materials = entry.materials.len(), "understanding_replaced");
        Ok(entry)
    }

    async fn remove_all(&self, materials: &[Material]) {
        for m in materials {
            if let Err(e) = self.files.remove(&m.url).await {
                warn!(url = %m.url, error = %e, "failed to remove material");
            }
        }
    }
}
