#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use configs::AppConfig;
use serde_json::Value;
use service::storage::{MemoryBackend, SnapshotBackend};
use tower::Service;
use uuid::Uuid;

use server::startup::{build_app, build_state, hydrate_store};
use server::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub uploads: PathBuf,
}

pub fn test_config(uploads: &PathBuf) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.uploads.dir = uploads.to_string_lossy().into_owned();
    cfg.auth.jwt_secret = "test-secret".into();
    cfg
}

/// App over an existing backend, hydrated the way startup does it.
pub async fn app_over(backend: Arc<dyn SnapshotBackend>, uploads: PathBuf) -> TestApp {
    let state = build_state(Arc::new(test_config(&uploads)), backend);
    hydrate_store(&state.store).await;
    TestApp { app: build_app(state.clone()), state, uploads }
}

pub async fn build_test_app() -> TestApp {
    let uploads = std::env::temp_dir().join(format!("portal_uploads_{}", Uuid::new_v4()));
    app_over(Arc::new(MemoryBackend::default()), uploads).await
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> anyhow::Result<Response<Body>> {
        Ok(self.app.clone().call(req).await?)
    }

    pub async fn get(&self, uri: &str) -> anyhow::Result<Response<Body>> {
        self.send(Request::builder().uri(uri).body(Body::empty())?).await
    }

    pub async fn json(&self, method: &str, uri: &str, body: &Value) -> anyhow::Result<Response<Body>> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?;
        self.send(req).await
    }

    pub async fn multipart(&self, method: &str, uri: &str, form: Multipart) -> anyhow::Result<Response<Body>> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", form.boundary))
            .body(Body::from(form.finish()))?;
        self.send(req).await
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.uploads).await;
    }
}

pub async fn body_json(resp: Response<Body>) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Minimal multipart/form-data encoder.
pub struct Multipart {
    boundary: String,
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self { boundary: format!("----portal{}", Uuid::new_v4().simple()), body: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", self.boundary, name, value).as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}
