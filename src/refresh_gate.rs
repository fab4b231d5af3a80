use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::resource::ResourceKey;

pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(300);

/// Process-local record of the last successful refresh per resource.
///
/// Nothing is persisted, so every resource starts out stale. Concurrent callers
/// may both see a key as stale and refresh it twice; the store writes are
/// idempotent replaces so the only cost is a redundant scrape.
#[derive(Debug)]
pub struct RefreshGate {
    timeout: Duration,
    entries: Mutex<HashMap<ResourceKey, Instant>>,
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_TIMEOUT)
    }
}

impl RefreshGate {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn should_refresh(&self, key: &ResourceKey) -> bool {
        self.should_refresh_at(key, Instant::now())
    }

    pub fn should_refresh_at(&self, key: &ResourceKey, now: Instant) -> bool {
        match self.last_success(key) {
            Some(last) => now.saturating_duration_since(last) > self.timeout,
            None => true,
        }
    }

    pub fn record_success(&self, key: &ResourceKey, at: Instant) {
        self.lock().insert(key.clone(), at);
    }

    pub fn last_success(&self, key: &ResourceKey) -> Option<Instant> {
        self.lock().get(key).copied()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ResourceKey, Instant>> {
        // A panic mid-insert cannot leave the map inconsistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
