use models::{ConfigPatch, SiteConfig};
use serde_json::Value;
use tracing::info;

use crate::errors::ServiceError;
use crate::store::Store;

/// Current site configuration.
pub async fn get_config(store: &Store) -> SiteConfig { store.site_config().await }

/// Merge a JSON object of string/number values into the site configuration.
pub async fn merge_config(store: &Store, body: Value) -> Result<SiteConfig, ServiceError> {
    let patch = ConfigPatch::from_json(body)?;
    let keys: Vec<String> = patch.keys().cloned().collect();
    let merged = store.merge_site_config(patch).await;
    info!(?keys, "site_config_merged");
    Ok(merged)
}
