use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use common::metrics::{SNAPSHOT_FLUSHES_TOTAL, SNAPSHOT_FLUSH_DURATION, SNAPSHOT_FLUSH_FAILURES_TOTAL};
use models::{CollectionCounts, Snapshot};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{Store, StoreError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlushReport {
    pub revision: u64,
    pub bytes: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HydrateOutcome {
    Restored { last_updated: DateTime<Utc>, counts: CollectionCounts },
    Fresh(FreshReason),
}

impl HydrateOutcome {
    /// Label for the hydrations metric.
    pub fn label(&self) -> &'static str {
        match self {
            HydrateOutcome::Restored { .. } => "restored",
            HydrateOutcome::Fresh(FreshReason::NoSnapshot) => "empty",
            HydrateOutcome::Fresh(FreshReason::Unreadable(_)) => "unreadable",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FreshReason {
    NoSnapshot,
    Unreadable(String),
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub revision: u64,
    pub flushed_revision: u64,
    pub dirty: bool,
    pub last_flushed_at: Option<DateTime<Utc>>,
    pub backend: String,
    pub write_through: bool,
    pub counts: CollectionCounts,
}

impl Store {
    /// Write a point-in-time snapshot to the backend, overwriting the last one.
    pub async fn flush(&self) -> Result<FlushReport, StoreError> {
        let _serial = self.flush_lock.lock().await;
        let timer = SNAPSHOT_FLUSH_DURATION.start_timer();

        let (snapshot, revision) = {
            let st = self.state.read().await;
            (Snapshot::capture(&st.data, Utc::now()), st.revision)
        };
        let result = match serde_json::to_vec(&snapshot) {
            Ok(bytes) => {
                let len = bytes.len();
                self.backend.put(bytes).await.map(|_| len).map_err(StoreError::from)
            }
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(bytes) => {
                timer.observe_duration();
                self.mark_flushed(revision, snapshot.last_updated);
                SNAPSHOT_FLUSHES_TOTAL.inc();
                debug!(revision, bytes, backend = %self.backend.describe(), "snapshot_flushed");
                Ok(FlushReport { revision, bytes, last_updated: snapshot.last_updated })
            }
            Err(e) => {
                timer.stop_and_discard();
                SNAPSHOT_FLUSH_FAILURES_TOTAL.inc();
                error!(revision, backend = %self.backend.describe(), error = %e, "snapshot_flush_failed");
                Err(e)
            }
        }
    }

    fn is_dirty_at(&self, revision: u64) -> bool { revision > self.flushed_revision.load(Ordering::Acquire) }

    pub async fn is_dirty(&self) -> bool {
        let revision = self.state.read().await.revision;
        self.is_dirty_at(revision)
    }

    /// Flush only when something changed since the last successful flush.
    pub async fn flush_if_dirty(&self) -> Result<Option<FlushReport>, StoreError> {
        if !self.is_dirty().await {
            return Ok(None);
        }
        self.flush().await.map(Some)
    }

    /// Replace every collection with the latest snapshot, if one exists.
    ///
    /// A snapshot that cannot be parsed leaves the store at its defaults.
    /// Transport failures are returned to the caller.
    pub async fn hydrate(&self) -> Result<HydrateOutcome, StoreError> {
        let Some(bytes) = self.backend.get_latest().await? else {
            info!(backend = %self.backend.describe(), "no snapshot found, starting empty");
            return Ok(HydrateOutcome::Fresh(FreshReason::NoSnapshot));
        };
        let snapshot: Snapshot = match serde_json::from_slice(&bytes) {
            Ok(s) => s,
            Err(e) => {
                warn!(backend = %self.backend.describe(), error = %e, "snapshot unreadable, starting empty");
                return Ok(HydrateOutcome::Fresh(FreshReason::Unreadable(e.to_string())));
            }
        };

        let last_updated = snapshot.last_updated;
        let data = snapshot.into_collections();
        let counts = data.counts();
        if let Some(max) = data.max_record_id() {
            self.ids.advance_past(max);
        }
        {
            let mut st = self.state.write().await;
            st.data = data;
            st.revision += 1;
            self.mark_flushed(st.revision, last_updated);
        }
        info!(%last_updated, users = counts.users, articles = counts.articles, "snapshot_hydrated");
        Ok(HydrateOutcome::Restored { last_updated, counts })
    }

    pub async fn status(&self) -> StoreStatus {
        let st = self.state.read().await;
        let flushed_revision = self.flushed_revision.load(Ordering::Acquire);
        StoreStatus {
            revision: st.revision,
            flushed_revision,
            dirty: st.revision > flushed_revision,
            last_flushed_at: self.last_flushed_at.load_full().map(|t| *t),
            backend: self.backend.describe(),
            write_through: self.policy.write_through,
            counts: st.data.counts(),
        }
    }
}
