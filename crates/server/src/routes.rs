pub mod articles;
pub mod auth;
pub mod forms;
pub mod push;
pub mod site_config;
pub mod understanding;
pub mod users;

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use service::store::StoreStatus;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::openapi::ApiDoc;
use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub store: StoreStatus,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health { status: "ok", store: state.store.status().await })
}

async fn metrics() -> impl IntoResponse { common::metrics::encode_metrics() }

/// Build the full application router: api routes, uploaded files, metrics and docs.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let uploads = ServeDir::new(&state.config.uploads.dir);
    let body_limit = state.config.server.body_limit_bytes();
    let uploads_prefix = state.config.uploads.public_prefix.clone();

    // Account management needs a signed-in caller
    let accounts = Router::new()
        .route("/users", get(users::list))
        .route("/users/:id", axum::routing::delete(users::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_token));

    let api = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/articles", get(articles::list).post(articles::create))
        .route("/articles/:id", get(articles::get).put(articles::update).delete(articles::delete))
        .route("/config", get(site_config::get).post(site_config::merge))
        .route("/understanding", get(understanding::list))
        .route("/understanding/:article_id", get(understanding::get).post(understanding::replace))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/push/subscribe", post(push::subscribe))
        .route("/push/unsubscribe", post(push::unsubscribe))
        .merge(accounts)
        .nest_service(&uploads_prefix, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    api.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
