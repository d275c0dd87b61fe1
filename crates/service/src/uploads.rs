//! Uploaded file storage. The store only ever sees `name`/`url` references;
//! bytes live here.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// A file received from a multipart request.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some("application/pdf") || self.file_name.to_ascii_lowercase().ends_with(".pdf")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub url: String,
    pub size: u64,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("uploaded file '{0}' is empty")]
    Empty(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn save(&self, file: UploadedFile) -> Result<StoredFile, UploadError>;
    /// Remove a previously stored file by its public url. Missing files are ignored.
    async fn remove(&self, url: &str) -> Result<(), UploadError>;
}

/// Writes files into a local directory served under `public_prefix`.
pub struct LocalFileStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalFileStorage {
    pub fn new<P: Into<PathBuf>>(root: P, public_prefix: &str) -> Self {
        Self { root: root.into(), public_prefix: public_prefix.trim_end_matches('/').to_string() }
    }

    pub fn root(&self) -> &Path { &self.root }

    fn stored_name(original: &str) -> String {
        let base = Path::new(original).file_name().and_then(|n| n.to_str()).unwrap_or("file");
        let clean: String = base
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        format!("{}-{}", Uuid::new_v4().simple(), clean)
    }

    fn local_path(&self, url: &str) -> Option<PathBuf> {
        let rel = url.strip_prefix(&self.public_prefix)?.trim_start_matches('/');
        let rel = Path::new(rel);
        if rel.as_os_str().is_empty() || rel.components().any(|c| !matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.root.join(rel))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, file: UploadedFile) -> Result<StoredFile, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Empty(file.file_name));
        }
        fs::create_dir_all(&self.root).await?;
        let name = Self::stored_name(&file.file_name);
        let size = file.bytes.len() as u64;
        fs::write(self.root.join(&name), &file.bytes).await?;
        debug!(%name, size, "upload_saved");
        Ok(StoredFile { url: format!("{}/{}", self.public_prefix, name), name: file.file_name, size })
    }

    async fn remove(&self, url: &str) -> Result<(), UploadError> {
        let Some(path) = self.local_path(url) else {
            warn!(%url, "refusing to remove file outside uploads dir");
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> LocalFileStorage {
        LocalFileStorage::new(std::env::temp_dir().join(format!("uploads_{}", Uuid::new_v4())), "/uploads/")
    }

    #[tokio::test]
    async fn save_then_remove() -> anyhow::Result<()> {
        let storage = temp_storage();
        let stored = storage
            .save(UploadedFile { file_name: "../My Paper.pdf".into(), content_type: None, bytes: b"%PDF-1.4".to_vec() })
            .await?;
        assert_eq!(stored.name, "../My Paper.pdf");
        assert_eq!(stored.size, 8);
        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.url.ends_with("-My_Paper.pdf"));

        let path = storage.local_path(&stored.url).expect("inside root");
        assert!(path.exists());
        storage.remove(&stored.url).await?;
        assert!(!path.exists());
        // second remove is a no-op
        storage.remove(&stored.url).await?;

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
        Ok(())
    }

    #[tokio::test]
    async fn rejects_empty_and_traversal() -> anyhow::Result<()> {
        let storage = temp_storage();
        let empty = UploadedFile { file_name: "a.pdf".into(), content_type: None, bytes: vec![] };
        assert!(matches!(storage.save(empty).await, Err(UploadError::Empty(_))));
        assert!(storage.local_path("/uploads/../secret").is_none());
        assert!(storage.local_path("/elsewhere/x").is_none());
        Ok(())
    }

    #[test]
    fn pdf_detection() {
        let f = |name: &str, ct: Option<&str>| UploadedFile { file_name: name.into(), content_type: ct.map(Into::into), bytes: vec![1] };
        assert!(f("x.PDF", None).is_pdf());
        assert!(f("x", Some("application/pdf")).is_pdf());
        assert!(!f("x.docx", Some("application/msword")).is_pdf());
    }
}
