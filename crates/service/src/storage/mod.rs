//! Snapshot backends.
//!
//! A backend stores exactly one blob at a well-known location: `put`
//! overwrites it, `get_latest` reads it back. The store never depends on
//! which implementation is behind the trait.

pub mod file;
pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use configs::{SnapshotBackendKind, SnapshotConfig};
use thiserror::Error;

pub use file::FileBackend;
pub use http::HttpBlobBackend;
pub use memory::MemoryBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Overwrite the stored snapshot.
    async fn put(&self, bytes: Vec<u8>) -> Result<(), BackendError>;
    /// `None` when nothing has been written yet.
    async fn get_latest(&self) -> Result<Option<Vec<u8>>, BackendError>;
    /// Human-readable location for logs and `/health`.
    fn describe(&self) -> String;
}

/// Build the configured backend.
pub fn from_config(cfg: &SnapshotConfig) -> Result<Arc<dyn SnapshotBackend>, BackendError> {
    let backend: Arc<dyn SnapshotBackend> = match cfg.backend {
        SnapshotBackendKind::Memory => Arc::new(MemoryBackend::default()),
        SnapshotBackendKind::File => Arc::new(FileBackend::new(&cfg.path)),
        SnapshotBackendKind::Http => {
            let url = cfg
                .url
                .clone()
                .ok_or_else(|| BackendError::Unavailable("snapshot.url is not set".into()))?;
            Arc::new(HttpBlobBackend::new(url, cfg.token.clone(), cfg.request_timeout())?)
        }
    };
    Ok(backend)
}
