use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use models::UserProfile;
use service::auth::domain::{AuthSession, LoginInput, RegisterInput};

use crate::errors::JsonApiError;
use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered", body = crate::openapi::UserDoc), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<RegisterInput>, JsonApiError>,
) -> Result<(StatusCode, Json<UserProfile>), JsonApiError> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In", body = crate::openapi::SessionDoc), (status = 400, description = "Bad Request"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(input), _): WithRejection<Json<LoginInput>, JsonApiError>,
) -> Result<(CookieJar, Json<AuthSession>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(session)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

/// Bearer header first, then the `auth_token` cookie.
fn request_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    bearer
        .or_else(|| jar.get(AUTH_COOKIE).map(|c| c.value().to_string()))
        .filter(|t| !t.is_empty())
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current user", body = crate::openapi::UserDoc), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Result<Json<UserProfile>, JsonApiError> {
    let Some(token) = request_token(&headers, &jar) else {
        return Err(missing_token());
    };
    Ok(Json(state.auth.me(&token).await?))
}

fn missing_token() -> JsonApiError {
    JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("missing token".into()))
}

/// Route layer for account management: requires a valid bearer token or auth cookie.
pub async fn require_token(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let Some(token) = request_token(req.headers(), &jar) else {
        return Err(missing_token());
    };
    state.auth.verify_token(&token)?;
    Ok(next.run(req).await)
}
