use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use models::PushSubscription;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeInput {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub keys: Value,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeInput {
    #[serde(default)]
    pub endpoint: String,
}

#[utoipa::path(post, path = "/push/subscribe", tag = "push", request_body = crate::openapi::SubscribeRequest, responses((status = 201, description = "Subscribed"), (status = 400, description = "Bad Request")))]
pub async fn subscribe(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<SubscribeInput>, JsonApiError>,
) -> Result<(StatusCode, Json<PushSubscription>), JsonApiError> {
    let (sub, _created) = state.push.subscribe(&input.endpoint, input.keys).await?;
    Ok((StatusCode::CREATED, Json(sub)))
}

#[utoipa::path(post, path = "/push/unsubscribe", tag = "push", request_body = crate::openapi::UnsubscribeRequest, responses((status = 200, description = "`{removed: bool}`"), (status = 400, description = "Bad Request")))]
pub async fn unsubscribe(State(state): State<AppState>, WithRejection(Json(input), _): WithRejection<Json<UnsubscribeInput>, JsonApiError>) -> Result<Json<Value>, JsonApiError> {
    let removed = state.push.unsubscribe(&input.endpoint).await?;
    Ok(Json(json!({ "removed": removed })))
}
