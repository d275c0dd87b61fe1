//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use configs::{AppConfig, SnapshotBackendKind};

/// Create the uploads directory and, for the file backend, the snapshot's parent.
pub async fn ensure_env(cfg: &AppConfig) -> anyhow::Result<()> {
    let snapshot_file = match cfg.snapshot.backend {
        SnapshotBackendKind::File => Some(cfg.snapshot.path.as_str()),
        _ => None,
    };
    common::env::ensure_env(&cfg.uploads.dir, snapshot_file).await
}
