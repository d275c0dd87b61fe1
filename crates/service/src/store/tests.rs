use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use models::{ArticlePatch, ConfigPatch, ConfigValue, Material, NewArticle, NewUser, PdfRef};
use serde_json::json;

use super::*;
use crate::storage::{BackendError, MemoryBackend, SnapshotBackend};

/// Memory backend whose writes can be switched off.
#[derive(Default)]
struct FlakyBackend {
    inner: MemoryBackend,
    failing: AtomicBool,
}

#[async_trait]
impl SnapshotBackend for FlakyBackend {
    async fn put(&self, bytes: Vec<u8>) -> Result<(), BackendError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("backend offline".into()));
        }
        self.inner.put(bytes).await
    }

    async fn get_latest(&self) -> Result<Option<Vec<u8>>, BackendError> { self.inner.get_latest().await }

    fn describe(&self) -> String { "flaky".into() }
}

fn store_over(backend: Arc<dyn SnapshotBackend>, write_through: bool) -> Store {
    Store::new(backend, FlushPolicy { write_through })
}

fn memory_store() -> Store { store_over(Arc::new(MemoryBackend::default()), true) }

fn new_article(title: &str) -> NewArticle {
    NewArticle { title: title.into(), category: "Physics".into(), ..Default::default() }
}

#[tokio::test]
async fn insert_then_get_returns_record_with_id() -> anyhow::Result<()> {
    let store = memory_store();
    let a = store.insert_article(new_article("Quantum Dots")).await;
    let fetched = store.get_article(a.id).await.expect("article present");
    assert_eq!(fetched, a);
    assert_eq!(fetched.title, "Quantum Dots");
    assert!(!store.is_dirty().await);
    Ok(())
}

#[tokio::test]
async fn update_missing_id_changes_nothing() -> anyhow::Result<()> {
    let store = memory_store();
    store.insert_article(new_article("A")).await;
    let before = store.status().await;

    let patch = ArticlePatch { title: Some("B".into()), ..Default::default() };
    assert!(store.update_article(42, patch).await.is_none());

    let after = store.status().await;
    assert_eq!(after.counts, before.counts);
    assert_eq!(after.revision, before.revision);
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> anyhow::Result<()> {
    let store = memory_store();
    let a = store.insert_article(new_article("A")).await;
    assert!(store.delete_article(a.id).await);
    assert!(store.get_article(a.id).await.is_none());
    assert!(!store.delete_article(a.id).await);
    Ok(())
}

#[tokio::test]
async fn flush_then_hydrate_reproduces_collections() -> anyhow::Result<()> {
    let backend: Arc<dyn SnapshotBackend> = Arc::new(MemoryBackend::default());
    let store = store_over(backend.clone(), false);

    let user = store
        .try_insert_user(NewUser { name: "Ana".into(), email: "Ana@Uni.edu ".into(), password_hash: "h".into() })
        .await
        .expect("fresh email");
    let article = store.insert_article(new_article("A")).await;
    store.merge_site_config(ConfigPatch::from_json(json!({"siteTitle": "Lab"}))?).await;
    store
        .replace_understanding(article.id, "sum".into(), vec![Material { name: "m".into(), url: "/uploads/m".into(), size: 1 }])
        .await
        .expect("article exists");
    store.upsert_push_subscription("https://push.example.com/1".into(), json!({"p256dh": "k"})).await;
    store.flush().await?;

    let restored = store_over(backend, false);
    let outcome = restored.hydrate().await?;
    assert!(matches!(outcome, HydrateOutcome::Restored { .. }));
    assert_eq!(restored.list_users().await, store.list_users().await);
    assert_eq!(restored.list_articles().await, store.list_articles().await);
    assert_eq!(restored.site_config().await, store.site_config().await);
    assert_eq!(restored.list_understanding().await, store.list_understanding().await);
    assert_eq!(restored.list_push_subscriptions().await, store.list_push_subscriptions().await);
    assert_eq!(restored.find_user_by_email("ana@uni.edu").await.map(|u| u.id), Some(user.id));
    assert!(!restored.is_dirty().await);

    // new ids continue past the hydrated ones
    let next = restored.insert_article(new_article("B")).await;
    assert!(next.id > article.id);
    Ok(())
}

#[tokio::test]
async fn config_merge_touches_only_supplied_keys() -> anyhow::Result<()> {
    let store = memory_store();
    let before = store.site_config().await;
    let after = store.merge_site_config(ConfigPatch::from_json(json!({"primaryColor": "#000000"}))?).await;
    assert_eq!(after.get("primaryColor"), Some(&ConfigValue::from("#000000")));
    assert_eq!(after.get("siteTitle"), before.get("siteTitle"));
    assert_eq!(after.len(), before.len());
    Ok(())
}

#[tokio::test]
async fn understanding_replace_drops_old_materials() -> anyhow::Result<()> {
    let store = memory_store();
    let article = store.insert_article(new_article("A")).await;
    let m = |n: &str| Material { name: n.into(), url: format!("/uploads/{n}"), size: 10 };
    store.replace_understanding(article.id, "first".into(), vec![m("a"), m("b")]).await.expect("article exists");
    let (entry, previous) = store
        .replace_understanding(article.id, "second".into(), vec![m("c")])
        .await
        .expect("article exists");
    assert_eq!(previous.map(|p| p.materials.len()), Some(2));
    assert_eq!(entry.materials, vec![m("c")]);
    assert_eq!(store.get_understanding(article.id).await.map(|u| u.summary), Some("second".into()));
    Ok(())
}

#[tokio::test]
async fn understanding_for_missing_article_is_rejected() -> anyhow::Result<()> {
    let store = memory_store();
    let article = store.insert_article(new_article("A")).await;
    store.delete_article(article.id).await;
    let before = store.status().await;

    let material = Material { name: "m".into(), url: "/uploads/m".into(), size: 1 };
    assert!(store.replace_understanding(article.id, "late".into(), vec![material]).await.is_none());

    assert!(store.list_understanding().await.is_empty());
    assert_eq!(store.status().await.revision, before.revision);
    Ok(())
}

#[tokio::test]
async fn pdf_update_returns_the_replaced_url() -> anyhow::Result<()> {
    let store = memory_store();
    let pdf = |n: &str| PdfRef { name: n.into(), url: format!("/uploads/{n}") };
    let article = store.insert_article(NewArticle { pdf: Some(pdf("v1.pdf")), ..new_article("A") }).await;

    let (_, replaced) = store
        .update_article(article.id, ArticlePatch { title: Some("B".into()), ..Default::default() })
        .await
        .expect("article exists");
    assert!(replaced.is_none());

    let (updated, replaced) = store
        .update_article(article.id, ArticlePatch { pdf: Some(pdf("v2.pdf")), ..Default::default() })
        .await
        .expect("article exists");
    assert_eq!(replaced.as_deref(), Some("/uploads/v1.pdf"));
    assert_eq!(updated.pdf_url.as_deref(), Some("/uploads/v2.pdf"));

    let (_, replaced) = store
        .update_article(article.id, ArticlePatch { pdf: Some(pdf("v3.pdf")), ..Default::default() })
        .await
        .expect("article exists");
    assert_eq!(replaced.as_deref(), Some("/uploads/v2.pdf"));
    Ok(())
}

#[tokio::test]
async fn concurrent_inserts_get_unique_ids() -> anyhow::Result<()> {
    let store = Arc::new(store_over(Arc::new(MemoryBackend::default()), false));
    let mut handles = Vec::new();
    for i in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.insert_article(new_article(&format!("t{i}"))).await.id }));
    }
    let mut ids = Vec::new();
    for h in handles {
        ids.push(h.await?);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);
    assert_eq!(store.list_articles().await.len(), 50);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() -> anyhow::Result<()> {
    let store = memory_store();
    let nu = |email: &str| NewUser { name: "N".into(), email: email.into(), password_hash: "h".into() };
    assert!(store.try_insert_user(nu("a@b.co")).await.is_some());
    assert!(store.try_insert_user(nu(" A@B.CO")).await.is_none());
    assert_eq!(store.list_users().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn failing_backend_keeps_store_dirty_until_next_flush() -> anyhow::Result<()> {
    let backend = Arc::new(FlakyBackend::default());
    let store = store_over(backend.clone(), true);

    backend.failing.store(true, Ordering::SeqCst);
    let a = store.insert_article(new_article("A")).await;
    assert_eq!(store.get_article(a.id).await.map(|x| x.id), Some(a.id));
    assert!(store.is_dirty().await);
    assert!(store.status().await.last_flushed_at.is_none());

    backend.failing.store(false, Ordering::SeqCst);
    let report = store.flush_if_dirty().await?.expect("dirty store flushes");
    assert!(report.bytes > 0);
    assert!(!store.is_dirty().await);
    assert!(store.flush_if_dirty().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn malformed_snapshot_starts_fresh() -> anyhow::Result<()> {
    let backend = Arc::new(MemoryBackend::with_blob(b"{not json".to_vec()));
    let store = store_over(backend, true);
    let outcome = store.hydrate().await?;
    assert!(matches!(outcome, HydrateOutcome::Fresh(FreshReason::Unreadable(_))));
    assert!(store.list_articles().await.is_empty());
    assert_eq!(store.site_config().await, models::SiteConfig::default());

    let empty = store_over(Arc::new(MemoryBackend::default()), true);
    assert_eq!(empty.hydrate().await?, HydrateOutcome::Fresh(FreshReason::NoSnapshot));
    Ok(())
}

#[tokio::test]
async fn article_lifecycle_example() -> anyhow::Result<()> {
    let backend: Arc<dyn SnapshotBackend> = Arc::new(MemoryBackend::default());
    let store = store_over(backend.clone(), true);

    let created = store
        .insert_article(NewArticle {
            title: "Soil Microbiomes".into(),
            category: "Biology".into(),
            authors: "R. Lima".into(),
            pdf: Some(PdfRef { name: "soil.pdf".into(), url: "/uploads/soil.pdf".into() }),
            ..Default::default()
        })
        .await;
    assert!(created.pdf_file);

    let (updated, replaced_pdf) = store
        .update_article(created.id, ArticlePatch { description: Some("16S survey".into()), ..Default::default() })
        .await
        .expect("article exists");
    assert!(replaced_pdf.is_none());
    assert_eq!(updated.description, "16S survey");
    assert_eq!(updated.title, "Soil Microbiomes");
    assert!(updated.updated_at.is_some());

    store.replace_understanding(created.id, "notes".into(), vec![]).await.expect("article exists");
    let (removed, understanding) = store.take_article(created.id).await.expect("article exists");
    assert_eq!(removed.id, created.id);
    assert!(understanding.is_some());
    assert!(store.get_understanding(created.id).await.is_none());

    // write-through already persisted the deletion
    let reloaded = store_over(backend, true);
    reloaded.hydrate().await?;
    assert!(reloaded.list_articles().await.is_empty());
    assert!(reloaded.list_understanding().await.is_empty());
    Ok(())
}
