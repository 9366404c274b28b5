//! In-memory job store with time-based expiry.
//!
//! Finished layouts are kept under a job id so a caller can fetch them again
//! (for example to render on demand). Entries older than the TTL are dropped on
//! lookup and by [`LayoutStore::sweep`].

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::model::LayoutResult;

/// Default entry lifetime: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct Entry {
    result: LayoutResult,
    created: SystemTime,
}

#[derive(Debug, Clone)]
pub struct LayoutStore {
    ttl: Duration,
    entries: HashMap<String, Entry>,
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl LayoutStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores `result` under `job_id`, replacing any previous entry.
    pub fn insert(&mut self, job_id: impl Into<String>, result: LayoutResult) {
        self.insert_at(job_id, result, SystemTime::now());
    }

    pub fn insert_at(&mut self, job_id: impl Into<String>, result: LayoutResult, now: SystemTime) {
        self.entries.insert(
            job_id.into(),
            Entry {
                result,
                created: now,
            },
        );
    }

    /// Returns the entry if it has not expired.
    pub fn get(&self, job_id: &str) -> Option<&LayoutResult> {
        self.get_at(job_id, SystemTime::now())
    }

    pub fn get_at(&self, job_id: &str, now: SystemTime) -> Option<&LayoutResult> {
        self.entries
            .get(job_id)
            .filter(|e| !self.expired(e, now))
            .map(|e| &e.result)
    }

    pub fn remove(&mut self, job_id: &str) -> Option<LayoutResult> {
        self.entries.remove(job_id).map(|e| e.result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry older than the TTL at `now`. Returns how many were removed.
    pub fn sweep(&mut self, now: SystemTime) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, e| !is_expired(e.created, ttl, now));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, kept = self.entries.len(), "expired layouts swept");
        }
        removed
    }

    fn expired(&self, e: &Entry, now: SystemTime) -> bool {
        is_expired(e.created, self.ttl, now)
    }
}

/// An entry created in the future (clock skew) counts as fresh.
fn is_expired(created: SystemTime, ttl: Duration, now: SystemTime) -> bool {
    now.duration_since(created).is_ok_and(|age| age > ttl)
}
