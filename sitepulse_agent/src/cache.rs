//! Single-slot TTL cache in front of the resolver. Bounds how often the
//! expensive probes (file reads, commands, database queries) run.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::types::MetricSnapshot;

#[derive(Debug)]
pub struct CacheEntry<T> {
    pub snapshot: Arc<T>,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// An expiry past the clock's range never comes, so the entry stays fresh.
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.created_at
            .checked_add(self.ttl)
            .map_or(true, |expires| now < expires)
    }
}

/// The slot mutex is held across resolution, so callers that arrive while an
/// expired entry is being replaced wait for that resolution instead of
/// starting their own.
pub struct SnapshotCache<T = MetricSnapshot> {
    slot: Mutex<Option<CacheEntry<T>>>,
}

impl<T> Default for SnapshotCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotCache<T> {
    /// Empty slot; the first read resolves.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached snapshot while `now < created_at + ttl`, otherwise
    /// run `resolve`, store the result with `created_at = now` and return it.
    pub async fn get_or_resolve<F, Fut>(&self, ttl: Duration, resolve: F) -> Arc<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(entry) = slot.as_ref() {
            if entry.is_fresh(Instant::now()) {
                return entry.snapshot.clone();
            }
        }
        let snapshot = Arc::new(resolve().await);
        *slot = Some(CacheEntry {
            snapshot: snapshot.clone(),
            created_at: Instant::now(),
            ttl,
        });
        snapshot
    }

    /// When the current entry was stored, if any.
    pub async fn created_at(&self) -> Option<Instant> {
        self.slot.lock().await.as_ref().map(|e| e.created_at)
    }

    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }
}
