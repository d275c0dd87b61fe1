use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{RecordId, UserProfile};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(get, path = "/users", tag = "users", responses((status = 200, description = "Registered users without password hashes", body = [crate::openapi::UserDoc]), (status = 401, description = "Unauthorized")))]
pub async fn list(State(state): State<AppState>) -> Json<Vec<UserProfile>> {
    Json(state.auth.list_users().await)
}

#[utoipa::path(delete, path = "/users/{id}", tag = "users", params(("id" = u64, Path, description = "User id")), responses((status = 204, description = "Deleted"), (status = 401, description = "Unauthorized"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<RecordId>) -> Result<StatusCode, JsonApiError> {
    state.auth.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
