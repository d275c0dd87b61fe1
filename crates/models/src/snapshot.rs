//! The persisted snapshot document and the in-memory collections it mirrors.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Article, PushSubscription, RecordId, SiteConfig, Understanding, User};

/// Every collection the store owns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collections {
    pub users: Vec<User>,
    pub articles: Vec<Article>,
    pub config: SiteConfig,
    pub understanding: BTreeMap<RecordId, Understanding>,
    pub push_subscriptions: Vec<PushSubscription>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCounts {
    pub users: usize,
    pub articles: usize,
    pub config_keys: usize,
    pub understanding: usize,
    pub push_subscriptions: usize,
}

impl Collections {
    pub fn counts(&self) -> CollectionCounts {
        CollectionCounts {
            users: self.users.len(),
            articles: self.articles.len(),
            config_keys: self.config.len(),
            understanding: self.understanding.len(),
            push_subscriptions: self.push_subscriptions.len(),
        }
    }

    /// Largest generated id across users and articles.
    pub fn max_record_id(&self) -> Option<RecordId> {
        let users = self.users.iter().map(|u| u.id);
        let articles = self.articles.iter().map(|a| a.id);
        users.chain(articles).max()
    }
}

/// One structured document holding the whole store at one instant.
/// Missing collections deserialize to their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub config: SiteConfig,
    #[serde(default)]
    pub understanding: BTreeMap<RecordId, Understanding>,
    #[serde(default)]
    pub push_subscriptions: Vec<PushSubscription>,
    pub last_updated: DateTime<Utc>,
}

impl Snapshot {
    /// Clone the collections into a snapshot stamped `at`.
    pub fn capture(data: &Collections, at: DateTime<Utc>) -> Self {
        Self {
            users: data.users.clone(),
            articles: data.articles.clone(),
            config: data.config.clone(),
            understanding: data.understanding.clone(),
            push_subscriptions: data.push_subscriptions.clone(),
            last_updated: at,
        }
    }

    pub fn into_collections(self) -> Collections {
        Collections {
            users: self.users,
            articles: self.articles,
            config: self.config,
            understanding: self.understanding,
            push_subscriptions: self.push_subscriptions,
        }
    }
}
