use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::RecordId;

/// A research article. The pdf reference is the triple
/// (`pdf_name`, `pdf_url`, `pdf_file`); `pdf_file` is false when nothing is attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: RecordId,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub pdf_file: bool,
    #[serde(default)]
    pub pdf_name: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Location of an uploaded pdf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfRef {
    pub name: String,
    pub url: String,
}

/// Insert payload; the store assigns `id` and `created_at`.
#[derive(Clone, Debug, Default)]
pub struct NewArticle {
    pub title: String,
    pub category: String,
    pub description: String,
    pub authors: String,
    pub institution: String,
    pub publication_date: String,
    pub pdf: Option<PdfRef>,
}

impl NewArticle {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.title.trim().is_empty() { return Err(ModelError::required("title")); }
        if self.category.trim().is_empty() { return Err(ModelError::required("category")); }
        Ok(())
    }

    pub fn into_article(self, id: RecordId, now: DateTime<Utc>) -> Article {
        let (pdf_file, pdf_name, pdf_url) = match self.pdf {
            Some(p) => (true, Some(p.name), Some(p.url)),
            None => (false, None, None),
        };
        Article {
            id,
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self.description,
            authors: self.authors,
            institution: self.institution,
            publication_date: self.publication_date,
            pdf_file,
            pdf_name,
            pdf_url,
            created_at: now,
            updated_at: None,
        }
    }
}

/// Partial update. `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub authors: Option<String>,
    pub institution: Option<String>,
    pub publication_date: Option<String>,
    pub pdf: Option<PdfRef>,
}

impl ArticlePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.authors.is_none()
            && self.institution.is_none()
            && self.publication_date.is_none()
            && self.pdf.is_none()
    }

    /// Supplied title/category may not be blank.
    pub fn validate(&self) -> Result<(), ModelError> {
        if matches!(&self.title, Some(t) if t.trim().is_empty()) { return Err(ModelError::required("title")); }
        if matches!(&self.category, Some(c) if c.trim().is_empty()) { return Err(ModelError::required("category")); }
        Ok(())
    }

    pub fn apply(self, article: &mut Article, now: DateTime<Utc>) {
        if let Some(v) = self.title { article.title = v.trim().to_string(); }
        if let Some(v) = self.category { article.category = v.trim().to_string(); }
        if let Some(v) = self.description { article.description = v; }
        if let Some(v) = self.authors { article.authors = v; }
        if let Some(v) = self.institution { article.institution = v; }
        if let Some(v) = self.publication_date { article.publication_date = v; }
        if let Some(p) = self.pdf {
            article.pdf_file = true;
            article.pdf_name = Some(p.name);
            article.pdf_url = Some(p.url);
        }
        article.updated_at = Some(now);
    }
}
