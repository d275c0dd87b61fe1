use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use models::{Article, RecordId};
use service::services::ArticleInput;

use crate::errors::JsonApiError;
use crate::routes::forms::{read_form, FormData};
use crate::state::AppState;

fn article_input(mut form: FormData) -> ArticleInput {
    ArticleInput {
        title: form.take("title"),
        category: form.take("category"),
        description: form.take("description"),
        authors: form.take("authors"),
        institution: form.take("institution"),
        publication_date: form.take("publicationDate"),
        pdf: form.take_file("pdf"),
    }
}

#[utoipa::path(get, path = "/articles", tag = "articles", responses((status = 200, description = "All articles", body = [crate::openapi::ArticleDoc])))]
pub async fn list(State(state): State<AppState>) -> Json<Vec<Article>> {
    Json(state.articles.list().await)
}

#[utoipa::path(get, path = "/articles/{id}", tag = "articles", params(("id" = u64, Path, description = "Article id")), responses((status = 200, description = "Article", body = crate::openapi::ArticleDoc), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<AppState>, Path(id): Path<RecordId>) -> Result<Json<Article>, JsonApiError> {
    Ok(Json(state.articles.get(id).await?))
}

#[utoipa::path(post, path = "/articles", tag = "articles", request_body(content = crate::openapi::ArticleFormDoc, content_type = "multipart/form-data"), responses((status = 201, description = "Created", body = crate::openapi::ArticleDoc), (status = 400, description = "Bad Request")))]
pub async fn create(State(state): State<AppState>, multipart: Multipart) -> Result<(StatusCode, Json<Article>), JsonApiError> {
    let form = read_form(multipart).await?;
    let article = state.articles.create(article_input(form)).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

#[utoipa::path(put, path = "/articles/{id}", tag = "articles", params(("id" = u64, Path, description = "Article id")), request_body(content = crate::openapi::ArticleFormDoc, content_type = "multipart/form-data"), responses((status = 200, description = "Updated", body = crate::openapi::ArticleDoc), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    multipart: Multipart,
) -> Result<Json<Article>, JsonApiError> {
    let form = read_form(multipart).await?;
    Ok(Json(state.articles.update(id, article_input(form)).await?))
}

#[utoipa::path(delete, path = "/articles/{id}", tag = "articles", params(("id" = u64, Path, description = "Article id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<RecordId>) -> Result<StatusCode, JsonApiError> {
    state.articles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
