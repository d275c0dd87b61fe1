use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;

/// Web push subscription, unique by `endpoint`. `keys` is kept opaque.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub keys: Value,
    pub created_at: DateTime<Utc>,
}

pub fn validate_endpoint(endpoint: &str) -> Result<(), ModelError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() { return Err(ModelError::required("endpoint")); }
    if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
        return Err(ModelError::Validation("endpoint must start with http(s)".into()));
    }
    Ok(())
}
