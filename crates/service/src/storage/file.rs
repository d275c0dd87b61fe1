use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::{BackendError, SnapshotBackend};

/// Single JSON file on local disk. Writes go to a sibling temp file and are
/// renamed into place, so readers see either the old or the new snapshot.
pub struct FileBackend {
    file_path: PathBuf,
}

impl FileBackend {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self { Self { file_path: path.into() } }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotBackend for FileBackend {
    async fn put(&self, bytes: Vec<u8>) -> Result<(), BackendError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &self.file_path).await?;
        Ok(())
    }

    async fn get_latest(&self) -> Result<Option<Vec<u8>>, BackendError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String { format!("file://{}", self.file_path.display()) }
}
