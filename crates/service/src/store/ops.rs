//! Typed per-collection operations.

use std::collections::BTreeMap;

use chrono::Utc;
use models::user::normalize_email;
use models::{
    Article, ArticlePatch, ConfigPatch, Material, NewArticle, NewUser, PushSubscription, RecordId, SiteConfig,
    Understanding, User,
};
use serde_json::Value;

use super::{Collection, Outcome, Store};

impl Store {
    // users

    pub async fn list_users(&self) -> Vec<User> { self.read(|d| d.users.clone()).await }

    pub async fn get_user(&self, id: RecordId) -> Option<User> {
        self.read(|d| d.users.iter().find(|u| u.id == id).cloned()).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        self.read(|d| d.users.iter().find(|u| normalize_email(&u.email) == email).cloned()).await
    }

    /// Insert unless the email is already registered; the check and the
    /// insert happen under one write lock.
    pub async fn try_insert_user(&self, new: NewUser) -> Option<User> {
        let email = normalize_email(&new.email);
        self.mutate(Collection::Users, |d| {
            if d.users.iter().any(|u| normalize_email(&u.email) == email) {
                return Outcome::Unchanged(None);
            }
            let user = NewUser { email, ..new }.into_user(self.ids.next(), Utc::now());
            d.users.push(user.clone());
            Outcome::Changed(Some(user))
        })
        .await
    }

    pub async fn delete_user(&self, id: RecordId) -> bool {
        self.mutate(Collection::Users, |d| {
            let before = d.users.len();
            d.users.retain(|u| u.id != id);
            if d.users.len() < before { Outcome::Changed(true) } else { Outcome::Unchanged(false) }
        })
        .await
    }

    // articles

    pub async fn list_articles(&self) -> Vec<Article> { self.read(|d| d.articles.clone()).await }

    pub async fn get_article(&self, id: RecordId) -> Option<Article> {
        self.read(|d| d.articles.iter().find(|a| a.id == id).cloned()).await
    }

    pub async fn insert_article(&self, new: NewArticle) -> Article {
        self.mutate(Collection::Articles, |d| {
            let article = new.into_article(self.ids.next(), Utc::now());
            d.articles.push(article.clone());
            Outcome::Changed(article)
        })
        .await
    }

    /// Merge `patch` into the article; `None` when the id is unknown.
    /// When the patch carries a pdf, also returns the url it replaced.
    pub async fn update_article(&self, id: RecordId, patch: ArticlePatch) -> Option<(Article, Option<String>)> {
        self.mutate(Collection::Articles, |d| match d.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                let replaced_pdf = if patch.pdf.is_some() { article.pdf_url.take() } else { None };
                patch.apply(article, Utc::now());
                Outcome::Changed(Some((article.clone(), replaced_pdf)))
            }
            None => Outcome::Unchanged(None),
        })
        .await
    }

    /// Remove the article together with its understanding entry and return both.
    pub async fn take_article(&self, id: RecordId) -> Option<(Article, Option<Understanding>)> {
        self.mutate(Collection::Articles, |d| match d.articles.iter().position(|a| a.id == id) {
            Some(idx) => {
                let article = d.articles.remove(idx);
                let understanding = d.understanding.remove(&id);
                Outcome::Changed(Some((article, understanding)))
            }
            None => Outcome::Unchanged(None),
        })
        .await
    }

    pub async fn delete_article(&self, id: RecordId) -> bool { self.take_article(id).await.is_some() }

    // config

    pub async fn site_config(&self) -> SiteConfig { self.read(|d| d.config.clone()).await }

    pub async fn merge_site_config(&self, patch: ConfigPatch) -> SiteConfig {
        self.mutate(Collection::Config, |d| {
            d.config.merge(patch);
            Outcome::Changed(d.config.clone())
        })
        .await
    }

    // understanding

    pub async fn list_understanding(&self) -> BTreeMap<RecordId, Understanding> {
        self.read(|d| d.understanding.clone()).await
    }

    pub async fn get_understanding(&self, article_id: RecordId) -> Option<Understanding> {
        self.read(|d| d.understanding.get(&article_id).cloned()).await
    }

    /// Replace the entry wholesale; returns the new entry and the one it replaced.
    /// `None` when no article has `article_id`.
    pub async fn replace_understanding(
        &self,
        article_id: RecordId,
        summary: String,
        materials: Vec<Material>,
    ) -> Option<(Understanding, Option<Understanding>)> {
        self.mutate(Collection::Understanding, |d| {
            if !d.articles.iter().any(|a| a.id == article_id) {
                return Outcome::Unchanged(None);
            }
            let entry = Understanding { summary, materials, updated_at: Utc::now() };
            let previous = d.understanding.insert(article_id, entry.clone());
            Outcome::Changed(Some((entry, previous)))
        })
        .await
    }

    // push subscriptions

    pub async fn list_push_subscriptions(&self) -> Vec<PushSubscription> {
        self.read(|d| d.push_subscriptions.clone()).await
    }

    /// Insert or replace keys by endpoint. The flag is true for a new endpoint.
    pub async fn upsert_push_subscription(&self, endpoint: String, keys: Value) -> (PushSubscription, bool) {
        self.mutate(Collection::PushSubscriptions, |d| {
            match d.push_subscriptions.iter_mut().find(|s| s.endpoint == endpoint) {
                Some(existing) => {
                    existing.keys = keys;
                    Outcome::Changed((existing.clone(), false))
                }
                None => {
                    let sub = PushSubscription { endpoint, keys, created_at: Utc::now() };
                    d.push_subscriptions.push(sub.clone());
                    Outcome::Changed((sub, true))
                }
            }
        })
        .await
    }

    pub async fn remove_push_subscription(&self, endpoint: &str) -> bool {
        self.mutate(Collection::PushSubscriptions, |d| {
            let before = d.push_subscriptions.len();
            d.push_subscriptions.retain(|s| s.endpoint != endpoint);
            if d.push_subscriptions.len() < before { Outcome::Changed(true) } else { Outcome::Unchanged(false) }
        })
        .await
    }
}
