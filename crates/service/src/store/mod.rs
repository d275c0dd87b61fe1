//! Durable in-memory store.
//!
//! All collections live behind one `RwLock` and are served from memory. Every
//! applied mutation bumps a revision; a flush writes a point-in-time snapshot
//! to the configured [`SnapshotBackend`] and records the revision it covered.
//! The store is dirty while `revision > flushed_revision`.
//!
//! With write-through enabled, each mutation flushes before returning. A
//! failed flush is logged and counted; the mutation still succeeds and the
//! timer in [`crate::flusher`] retries.

mod ids;
mod ops;
mod persistence;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use common::metrics::STORE_MUTATIONS_TOTAL;
use models::Collections;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::error;

use crate::storage::{BackendError, SnapshotBackend};

pub use ids::IdGenerator;
pub use persistence::{FlushReport, FreshReason, HydrateOutcome, StoreStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot backend: {0}")]
    Backend(#[from] BackendError),
    #[error("snapshot encoding: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug)]
pub struct FlushPolicy {
    pub write_through: bool,
}

impl Default for FlushPolicy {
    fn default() -> Self { Self { write_through: true } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Users,
    Articles,
    Config,
    Understanding,
    PushSubscriptions,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Articles => "articles",
            Collection::Config => "config",
            Collection::Understanding => "understanding",
            Collection::PushSubscriptions => "pushSubscriptions",
        }
    }
}

/// Result of a mutation closure: whether the collections actually changed.
pub(crate) enum Outcome<T> {
    Changed(T),
    Unchanged(T),
}

struct State {
    data: Collections,
    revision: u64,
}

pub struct Store {
    state: RwLock<State>,
    flush_lock: Mutex<()>,
    flushed_revision: AtomicU64,
    last_flushed_at: ArcSwapOption<DateTime<Utc>>,
    ids: IdGenerator,
    backend: Arc<dyn SnapshotBackend>,
    policy: FlushPolicy,
}

impl Store {
    /// Empty store with default site config. Call [`Store::hydrate`] to load
    /// the latest snapshot.
    pub fn new(backend: Arc<dyn SnapshotBackend>, policy: FlushPolicy) -> Self {
        Self {
            state: RwLock::new(State { data: Collections::default(), revision: 0 }),
            flush_lock: Mutex::new(()),
            flushed_revision: AtomicU64::new(0),
            last_flushed_at: ArcSwapOption::empty(),
            ids: IdGenerator::default(),
            backend,
            policy,
        }
    }

    pub fn backend(&self) -> &Arc<dyn SnapshotBackend> { &self.backend }

    pub fn policy(&self) -> FlushPolicy { self.policy }

    async fn read<T>(&self, f: impl FnOnce(&Collections) -> T) -> T {
        let st = self.state.read().await;
        f(&st.data)
    }

    /// Apply `f` under the write lock. A `Changed` outcome bumps the revision
    /// and, under write-through, flushes once the lock is released.
    async fn mutate<T>(&self, collection: Collection, f: impl FnOnce(&mut Collections) -> Outcome<T>) -> T {
        let (value, changed) = {
            let mut st = self.state.write().await;
            match f(&mut st.data) {
                Outcome::Changed(v) => {
                    st.revision += 1;
                    (v, true)
                }
                Outcome::Unchanged(v) => (v, false),
            }
        };
        if changed {
            STORE_MUTATIONS_TOTAL.with_label_values(&[collection.as_str()]).inc();
            if self.policy.write_through {
                if let Err(e) = self.flush().await {
                    error!(collection = collection.as_str(), error = %e, "write_through_flush_failed");
                }
            }
        }
        value
    }

    fn mark_flushed(&self, revision: u64, at: DateTime<Utc>) {
        self.flushed_revision.fetch_max(revision, Ordering::AcqRel);
        self.last_flushed_at.store(Some(Arc::new(at)));
    }
}

#[cfg(test)]
mod tests;
