//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Create the uploads directory and, when given, the snapshot file's parent.
pub async fn ensure_env(uploads_dir: &str, snapshot_file: Option<&str>) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {uploads_dir}: {e}"))?;
    info!(%uploads_dir, "uploads directory ready");

    if let Some(file) = snapshot_file {
        match Path::new(file).parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
            }
            None => warn!(%file, "snapshot file has no parent directory; writing next to the binary"),
        }
    }
    Ok(())
}
