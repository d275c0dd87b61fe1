use std::collections::BTreeMap;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use models::{RecordId, Understanding};

use crate::errors::JsonApiError;
use crate::routes::forms::read_form;
use crate::state::AppState;

#[utoipa::path(get, path = "/understanding", tag = "understanding", responses((status = 200, description = "Understanding entries keyed by article id")))]
pub async fn list(State(state): State<AppState>) -> Json<BTreeMap<RecordId, Understanding>> {
    Json(state.understanding.list().await)
}

#[utoipa::path(get, path = "/understanding/{article_id}", tag = "understanding", params(("article_id" = u64, Path, description = "Article id")), responses((status = 200, description = "Entry", body = crate::openapi::UnderstandingDoc), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<AppState>, Path(article_id): Path<RecordId>) -> Result<Json<Understanding>, JsonApiError> {
    Ok(Json(state.understanding.get(article_id).await?))
}

#[utoipa::path(post, path = "/understanding/{article_id}", tag = "understanding", params(("article_id" = u64, Path, description = "Article id")), request_body(content = crate::openapi::UnderstandingFormDoc, content_type = "multipart/form-data"), responses((status = 200, description = "Replaced", body = crate::openapi::UnderstandingDoc), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn replace(
    State(state): State<AppState>,
    Path(article_id): Path<RecordId>,
    multipart: Multipart,
) -> Result<Json<Understanding>, JsonApiError> {
    let mut form = read_form(multipart).await?;
    let summary = form.take("summary");
    let materials = form.take_files("materials");
    Ok(Json(state.understanding.replace(article_id, summary, materials).await?))
}
