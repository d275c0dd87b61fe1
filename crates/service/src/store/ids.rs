use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use models::RecordId;

/// Clock-seeded, strictly increasing id source: `next = max(now_ms, last + 1)`.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn next(&self) -> RecordId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last.compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }

    /// Ensure every later id is greater than `id`.
    pub fn advance_past(&self, id: RecordId) { self.last.fetch_max(id, Ordering::AcqRel); }
}
