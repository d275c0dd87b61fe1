mod support;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use service::storage::{MemoryBackend, SnapshotBackend};

use support::{app_over, body_json, Multipart};

#[tokio::test]
async fn data_survives_restart_over_same_backend() -> anyhow::Result<()> {
    let backend: Arc<dyn SnapshotBackend> = Arc::new(MemoryBackend::default());
    let uploads = std::env::temp_dir().join(format!("portal_restart_{}", uuid::Uuid::new_v4()));

    let first = app_over(backend.clone(), uploads.clone()).await;
    let form = Multipart::new().text("title", "Glacier Retreat").text("category", "Geoscience");
    let article = body_json(first.multipart("POST", "/articles", form).await?).await?;
    first.json("POST", "/config", &json!({"siteTitle": "Earth Lab"})).await?;
    first
        .json("POST", "/auth/register", &json!({"name": "Rae", "email": "rae@uni.edu", "password": "longenough"}))
        .await?;

    let health = body_json(first.get("/health").await?).await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["store"]["dirty"], false);
    assert!(health["store"]["lastFlushedAt"].is_string());

    // a new process: fresh state, same backend
    let second = app_over(backend, uploads).await;
    let id = article["id"].as_u64().expect("numeric id");
    let resp = second.get(&format!("/articles/{id}")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await?["title"], "Glacier Retreat");
    assert_eq!(body_json(second.get("/config").await?).await?["siteTitle"], "Earth Lab");

    let resp = second.json("POST", "/auth/login", &json!({"email": "rae@uni.edu", "password": "longenough"})).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let health = body_json(second.get("/health").await?).await?;
    assert_eq!(health["store"]["counts"]["articles"], 1);
    assert_eq!(health["store"]["counts"]["users"], 1);

    second.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn unreadable_snapshot_starts_empty() -> anyhow::Result<()> {
    let backend: Arc<dyn SnapshotBackend> = Arc::new(MemoryBackend::with_blob(b"\x00garbage".to_vec()));
    let uploads = std::env::temp_dir().join(format!("portal_garbage_{}", uuid::Uuid::new_v4()));
    let t = app_over(backend, uploads).await;

    let list = body_json(t.get("/articles").await?).await?;
    assert_eq!(list, json!([]));
    assert_eq!(body_json(t.get("/config").await?).await?["articlesPerPage"], 12);

    let metrics = t.get("/metrics").await?;
    assert_eq!(metrics.status(), StatusCode::OK);

    t.cleanup().await;
    Ok(())
}
