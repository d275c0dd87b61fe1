use std::sync::Arc;

use models::{Article, ArticlePatch, NewArticle, PdfRef, RecordId, Understanding};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::push::PushService;
use crate::store::Store;
use crate::uploads::{FileStorage, UploadedFile};

/// Article fields as received from a form. Absent fields are `None`.
#[derive(Clone, Debug, Default)]
pub struct ArticleInput {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub authors: Option<String>,
    pub institution: Option<String>,
    pub publication_date: Option<String>,
    pub pdf: Option<UploadedFile>,
}

#[derive(Clone)]
pub struct ArticleService {
    store: Arc<Store>,
    files: Arc<dyn FileStorage>,
    push: PushService,
}

impl ArticleService {
    pub fn new(store: Arc<Store>, files: Arc<dyn FileStorage>, push: PushService) -> Self {
        Self { store, files, push }
    }

    pub async fn list(&self) -> Vec<Article> { self.store.list_articles().await }

    pub async fn get(&self, id: RecordId) -> Result<Article, ServiceError> {
        self.store.get_article(id).await.ok_or_else(|| ServiceError::not_found("article"))
    }

    #[instrument(skip(self, input), fields(title = ?input.title))]
    pub async fn create(&self, input: ArticleInput) -> Result<Article, ServiceError> {
        let mut new = NewArticle {
            title: input.title.unwrap_or_default(),
            category: input.category.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            authors: input.authors.unwrap_or_default(),
            institution: input.institution.unwrap_or_default(),
            publication_date: input.publication_date.unwrap_or_default(),
            pdf: None,
        };
        new.validate()?;
        if let Some(file) = input.pdf {
            new.pdf = Some(self.save_pdf(file).await?);
        }

        let article = self.store.insert_article(new).await;
        info!(article_id = article.id, pdf = article.pdf_file, "article_created");
        self.push.notify_new_article(&article).await;
        Ok(article)
    }

    /// Merge the supplied fields. A new pdf replaces the old file.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: RecordId, input: ArticleInput) -> Result<Article, ServiceError> {
        let mut patch = ArticlePatch {
            title: input.title,
            category: input.category,
            description: input.description,
            authors: input.authors,
            institution: input.institution,
            publication_date: input.publication_date,
            pdf: None,
        };
        if patch.is_empty() && input.pdf.is_none() {
            return Err(ServiceError::Validation("no fields to update".into()));
        }
        patch.validate()?;
        self.get(id).await?;

        if let Some(file) = input.pdf {
            patch.pdf = Some(self.save_pdf(file).await?);
        }
        let new_pdf_url = patch.pdf.as_ref().map(|p| p.url.clone());

        let Some((updated, replaced_pdf)) = self.store.update_article(id, patch).await else {
            // deleted concurrently; drop the file we just wrote
            if let Some(url) = new_pdf_url {
                self.remove_file(&url).await;
            }
            return Err(ServiceError::not_found("article"));
        };
        if let Some(old) = replaced_pdf.as_deref() {
            self.remove_file(old).await;
        }
        info!(article_id = id, "article_updated");
        Ok(updated)
    }

    /// Delete the article, its understanding entry and their files.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: RecordId) -> Result<(), ServiceError> {
        let (article, understanding) = self.store.take_article(id).await.ok_or_else(|| ServiceError::not_found("article"))?;
        if let Some(url) = article.pdf_url.as_deref() {
            self.remove_file(url).await;
        }
        if let Some(Understanding { materials, .. }) = understanding {
            for m in materials {
                self.remove_file(&m.url).await;
            }
        }
        info!(article_id = id, "article_deleted");
        Ok(())
    }

    async fn save_pdf(&self, file: UploadedFile) -> Result<PdfRef, ServiceError> {
        if !file.is_pdf() {
            return Err(ServiceError::Validation("pdf must be a PDF document".into()));
        }
        let stored = self.files.save(file).await?;
        Ok(PdfRef { name: stored.name, url: stored.url })
    }

    async fn remove_file(&self, url: &str) {
        if let Err(e) = self.files.remove(url).await {
            warn!(%url, error = %e, "failed to remove upload");
        }
    }
}
