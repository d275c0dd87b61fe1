use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode};

use super::{BackendError, SnapshotBackend};

/// Remote blob store addressed by a single URL: `PUT` overwrites the
/// object, `GET` reads it, `404` means nothing stored yet.
pub struct HttpBlobBackend {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpBlobBackend {
    pub fn new(url: String, token: Option<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url, token })
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }
}

#[async_trait]
impl SnapshotBackend for HttpBlobBackend {
    async fn put(&self, bytes: Vec<u8>) -> Result<(), BackendError> {
        let req = self
            .client
            .put(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(bytes);
        let resp = self.authorize(req).send().await?;
        if !resp.status().is_success() {
            return Err(BackendError::Status { status: resp.status().as_u16(), url: self.url.clone() });
        }
        Ok(())
    }

    async fn get_latest(&self) -> Result<Option<Vec<u8>>, BackendError> {
        let resp = self.authorize(self.client.get(&self.url)).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(resp.bytes().await?.to_vec())),
            s => Err(BackendError::Status { status: s.as_u16(), url: self.url.clone() }),
        }
    }

    fn describe(&self) -> String { self.url.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::Bytes, extract::State, http::HeaderMap, routing::get, Router};
    use tokio::{net::TcpListener, sync::Mutex};

    type Blob = Arc<Mutex<Option<Vec<u8>>>>;

    async fn get_blob(State(blob): State<Blob>) -> Result<Vec<u8>, axum::http::StatusCode> {
        blob.lock().await.clone().ok_or(axum::http::StatusCode::NOT_FOUND)
    }

    async fn put_blob(State(blob): State<Blob>, headers: HeaderMap, body: Bytes) -> axum::http::StatusCode {
        if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("Bearer t0ken") {
            return axum::http::StatusCode::UNAUTHORIZED;
        }
        *blob.lock().await = Some(body.to_vec());
        axum::http::StatusCode::NO_CONTENT
    }

    async fn start_blob_server() -> anyhow::Result<String> {
        let blob: Blob = Arc::new(Mutex::new(None));
        let app = Router::new().route("/snapshot.json", get(get_blob).put(put_blob)).with_state(blob);
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await { eprintln!("blob server error: {}", e); }
        });
        Ok(format!("http://{}/snapshot.json", addr))
    }

    #[tokio::test]
    async fn http_backend_put_then_get() -> anyhow::Result<()> {
        let url = start_blob_server().await?;
        let backend = HttpBlobBackend::new(url.clone(), Some("t0ken".into()), Duration::from_secs(5))?;

        assert!(backend.get_latest().await?.is_none());
        backend.put(b"{\"users\":[]}".to_vec()).await?;
        assert_eq!(backend.get_latest().await?.as_deref(), Some(&b"{\"users\":[]}"[..]));

        let anonymous = HttpBlobBackend::new(url, None, Duration::from_secs(5))?;
        let err = anonymous.put(b"{}".to_vec()).await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 401, .. }));
        Ok(())
    }
}
