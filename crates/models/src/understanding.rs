use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded study material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub url: String,
    pub size: u64,
}

/// Understanding materials for one article, keyed by the article id.
/// Updates replace the whole record, materials included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Understanding {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub materials: Vec<Material>,
    pub updated_at: DateTime<Utc>,
}
