//! Time-to-live cache with single-flight refresh.

use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

/// Caches one value for `ttl`. Concurrent callers that miss share a single
/// fetch: the first one fetches, the rest wait and reuse its result.
pub struct TtlCache<T> {
    ttl: Duration,
    entry: RwLock<Option<(T, Instant)>>,
    refresh: Mutex<()>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return the cached value, calling `fetch` when it is missing or stale.
    /// A failed fetch is returned as-is and nothing is cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh().await {
            return Ok(value);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(value) = self.fresh().await {
            return Ok(value);
        }

        let value = fetch().await?;
        *self.entry.write().await = Some((value.clone(), Instant::now()));
        Ok(value)
    }

    async fn fresh(&self) -> Option<T> {
        let entry = self.entry.read().await;
        match entry.as_ref() {
            Some((value, fetched_at)) if fetched_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }
}
