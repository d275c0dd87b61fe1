//! Singleton site configuration: a flat map of string or number values.
//!
//! Updates merge: only the keys present in a [`ConfigPatch`] are replaced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Text(String),
    Number(Number),
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self { ConfigValue::Text(s.to_string()) }
}

impl From<u64> for ConfigValue {
    fn from(n: u64) -> Self { ConfigValue::Number(n.into()) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteConfig(BTreeMap<String, ConfigValue>);

impl Default for SiteConfig {
    fn default() -> Self {
        let entries: [(&str, ConfigValue); 8] = [
            ("siteTitle", "Research Articles".into()),
            ("siteSubtitle", "University research repository".into()),
            ("institutionName", "University".into()),
            ("primaryColor", "#1e3a8a".into()),
            ("secondaryColor", "#f59e0b".into()),
            ("contactEmail", "research@university.edu".into()),
            ("contactPhone", "".into()),
            ("articlesPerPage", 12u64.into()),
        ];
        Self(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl SiteConfig {
    pub fn get(&self, key: &str) -> Option<&ConfigValue> { self.0.get(key) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Merge the patch in; returns the keys that were written.
    pub fn merge(&mut self, patch: ConfigPatch) -> Vec<String> {
        let mut written = Vec::with_capacity(patch.0.len());
        for (k, v) in patch.0 {
            written.push(k.clone());
            self.0.insert(k, v);
        }
        written
    }
}

/// Validated partial config update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigPatch(BTreeMap<String, ConfigValue>);

impl ConfigPatch {
    /// Accepts a JSON object whose values are strings or numbers.
    pub fn from_json(value: Value) -> Result<Self, ModelError> {
        let Value::Object(map) = value else {
            return Err(ModelError::Validation("config must be a JSON object".into()));
        };
        let mut out = BTreeMap::new();
        for (key, v) in map {
            if key.trim().is_empty() {
                return Err(ModelError::Validation("config keys must not be blank".into()));
            }
            let v = match v {
                Value::String(s) => ConfigValue::Text(s),
                Value::Number(n) => ConfigValue::Number(n),
                _ => return Err(ModelError::Validation(format!("config value for '{}' must be a string or number", key))),
            };
            out.insert(key, v);
        }
        if out.is_empty() {
            return Err(ModelError::Validation("config update is empty".into()));
        }
        Ok(Self(out))
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> { self.0.keys() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_keeps_unspecified_keys() {
        let mut cfg = SiteConfig::default();
        let before = cfg.clone();
        let patch = ConfigPatch::from_json(json!({"siteTitle": "Lab", "maxUploadMb": 20})).unwrap();
        let written = cfg.merge(patch);
        assert_eq!(written, vec!["maxUploadMb".to_string(), "siteTitle".to_string()]);
        assert_eq!(cfg.get("siteTitle"), Some(&ConfigValue::from("Lab")));
        assert_eq!(cfg.get("maxUploadMb"), Some(&ConfigValue::from(20u64)));
        assert_eq!(cfg.get("primaryColor"), before.get("primaryColor"));
        assert_eq!(cfg.len(), before.len() + 1);
    }

    #[test]
    fn patch_rejects_nested_and_empty() {
        assert!(ConfigPatch::from_json(json!({"a": {"b": 1}})).is_err());
        assert!(ConfigPatch::from_json(json!({"a": true})).is_err());
        assert!(ConfigPatch::from_json(json!({})).is_err());
        assert!(ConfigPatch::from_json(json!(["x"])).is_err());
    }

    #[test]
    fn serializes_as_flat_object() {
        let json = serde_json::to_value(SiteConfig::default()).unwrap();
        assert_eq!(json["siteTitle"], "Research Articles");
        assert_eq!(json["articlesPerPage"], 12);
        let back: SiteConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, SiteConfig::default());
    }
}
