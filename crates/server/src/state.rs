use std::sync::Arc;

use configs::AppConfig;
use service::auth::AuthService;
use service::push::PushService;
use service::services::{ArticleService, UnderstandingService};
use service::store::Store;

/// Shared handles for every handler. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub auth: AuthService,
    pub articles: ArticleService,
    pub understanding: UnderstandingService,
    pub push: PushService,
    pub config: Arc<AppConfig>,
}
