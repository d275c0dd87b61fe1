//! Web push subscription bookkeeping. Delivery is a logging stub.

use std::sync::Arc;

use models::push_subscription::validate_endpoint;
use models::{Article, PushSubscription};
use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::store::Store;

#[derive(Clone)]
pub struct PushService {
    store: Arc<Store>,
}

impl PushService {
    pub fn new(store: Arc<Store>) -> Self { Self { store } }

    /// Returns the stored subscription and whether the endpoint was new.
    #[instrument(skip(self, keys))]
    pub async fn subscribe(&self, endpoint: &str, keys: Value) -> Result<(PushSubscription, bool), ServiceError> {
        validate_endpoint(endpoint)?;
        let keys = match keys {
            Value::Null => Value::Object(Default::default()),
            Value::Object(_) => keys,
            _ => return Err(ServiceError::Validation("keys must be an object".into())),
        };
        Ok(self.store.upsert_push_subscription(endpoint.trim().to_string(), keys).await)
    }

    pub async fn unsubscribe(&self, endpoint: &str) -> Result<bool, ServiceError> {
        if endpoint.trim().is_empty() {
            return Err(ServiceError::Validation("endpoint is required".into()));
        }
        Ok(self.store.remove_push_subscription(endpoint.trim()).await)
    }

    /// Announce a new article to every subscriber. Returns how many were notified.
    pub async fn notify_new_article(&self, article: &Article) -> usize {
        let subs = self.store.list_push_subscriptions().await;
        for sub in &subs {
            info!(endpoint = %sub.endpoint, article_id = article.id, title = %article.title, "push_notify");
        }
        subs.len()
    }
}
