use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use models::SiteConfig;
use serde_json::Value;
use service::services::site_config;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(get, path = "/config", tag = "config", responses((status = 200, description = "Site configuration")))]
pub async fn get(State(state): State<AppState>) -> Json<SiteConfig> {
    Json(site_config::get_config(&state.store).await)
}

/// Merge the posted keys; keys not in the body keep their values.
#[utoipa::path(post, path = "/config", tag = "config", request_body = crate::openapi::SiteConfigDoc, responses((status = 200, description = "Merged configuration"), (status = 400, description = "Bad Request")))]
pub async fn merge(State(state): State<AppState>, WithRejection(Json(body), _): WithRejection<Json<Value>, JsonApiError>) -> Result<Json<SiteConfig>, JsonApiError> {
    Ok(Json(site_config::merge_config(&state.store, body).await?))
}
