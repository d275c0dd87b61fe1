use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BackendError, SnapshotBackend};

/// Keeps the latest snapshot in process memory. Shared via `Arc`, it
/// outlives any one store, which is how tests and the `memory` variant
/// exercise hydrate-after-flush.
#[derive(Default)]
pub struct MemoryBackend {
    blob: RwLock<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn with_blob(bytes: Vec<u8>) -> Self { Self { blob: RwLock::new(Some(bytes)) } }
}

#[async_trait]
impl SnapshotBackend for MemoryBackend {
    async fn put(&self, bytes: Vec<u8>) -> Result<(), BackendError> {
        *self.blob.write().await = Some(bytes);
        Ok(())
    }

    async fn get_latest(&self) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.blob.read().await.clone())
    }

    fn describe(&self) -> String { "memory".into() }
}
