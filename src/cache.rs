//! In-memory report cache.
//!
//! Entries are keyed by [`SellerKey`] and considered fresh for a configured
//! TTL. A stale hit is served immediately while one background refresh runs;
//! a miss fetches inline. Per-key fetch locks guarantee at most one in-flight
//! request per key, with late arrivals re-reading the cache instead of
//! issuing their own request.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::SellerKey;
use crate::error::Result;

/// Entries older than this multiple of the freshness TTL are dropped on the
/// next insert, so a long-lived embedder does not hold one report per key
/// forever. Stale-but-younger entries stay servable.
const EVICT_AFTER_TTL_MULTIPLE: u32 = 12;

#[derive(Debug)]
pub enum Lookup<T> {
    Fresh(T),
    Stale(T),
    Miss,
}

struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

pub struct ReportCache<T> {
    stale_after: Duration,
    entries: Mutex<HashMap<SellerKey, Entry<T>>>,
    fetch_locks: Mutex<HashMap<SellerKey, Arc<Mutex<()>>>>,
}

impl<T: Clone> ReportCache<T> {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            entries: Mutex::new(HashMap::new()),
            fetch_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn lookup(&self, key: &SellerKey) -> Lookup<T> {
        let entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() < self.stale_after => {
                Lookup::Fresh(entry.value.clone())
            }
            Some(entry) => Lookup::Stale(entry.value.clone()),
            None => Lookup::Miss,
        }
    }

    pub async fn insert(&self, key: &SellerKey, value: T) {
        let mut entries = self.entries.lock().await;
        let evict_after = self.stale_after * EVICT_AFTER_TTL_MULTIPLE;
        entries.retain(|_, entry| entry.fetched_at.elapsed() < evict_after);
        entries.insert(
            key.clone(),
            Entry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    async fn lock_for(&self, key: &SellerKey) -> Arc<Mutex<()>> {
        let mut locks = self.fetch_locks.lock().await;
        let lock = Arc::clone(locks.entry(key.clone()).or_default());
        // Sweep locks nobody holds; the clone above keeps this key's alive.
        locks.retain(|_, l| Arc::strong_count(l) > 1);
        lock
    }

    /// Wait for this key's fetch slot. While the guard is held no other
    /// caller can fetch the same key.
    pub async fn fetch_slot(&self, key: &SellerKey) -> OwnedMutexGuard<()> {
        self.lock_for(key).await.lock_owned().await
    }

    /// Claim the fetch slot only if it is free. Used by stale hits so a
    /// single background refresh runs per key.
    pub async fn try_fetch_slot(&self, key: &SellerKey) -> Option<OwnedMutexGuard<()>> {
        self.lock_for(key).await.try_lock_owned().ok()
    }

    #[cfg(test)]
    async fn entry_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    #[cfg(test)]
    async fn lock_count(&self) -> usize {
        self.fetch_locks.lock().await.len()
    }
}

/// Resolve a report through the cache.
///
/// Fresh: served directly. Stale: served, with `fetch` spawned in the
/// background if no refresh is already running. Miss: `fetch` runs inline
/// under the key's fetch slot; callers that lost the race re-read the cache.
pub(crate) async fn fetch_through<T, F, Fut>(
    cache: &Arc<ReportCache<T>>,
    key: &SellerKey,
    fetch: F,
) -> Result<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    match cache.lookup(key).await {
        Lookup::Fresh(value) => Ok(value),
        Lookup::Stale(value) => {
            if let Some(slot) = cache.try_fetch_slot(key).await {
                log::debug!("serving stale {key}, refreshing in background");
                let cache = Arc::clone(cache);
                let key = key.clone();
                tokio::spawn(async move {
                    let _slot = slot;
                    match fetch().await {
                        Ok(fresh) => cache.insert(&key, fresh).await,
                        Err(e) => log::warn!("background refresh for {key} failed: {e}"),
                    }
                });
            }
            Ok(value)
        }
        Lookup::Miss => {
            let _slot = cache.fetch_slot(key).await;
            // Another caller may have filled the entry while we waited.
            if let Lookup::Fresh(value) | Lookup::Stale(value) = cache.lookup(key).await {
                return Ok(value);
            }
            let value = fetch().await?;
            cache.insert(key, value.clone()).await;
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: &str) -> SellerKey {
        SellerKey::new("10", code).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_transitions() {
        let cache: ReportCache<u32> = ReportCache::new(Duration::from_millis(50));
        let k = key("000070");

        assert!(matches!(cache.lookup(&k).await, Lookup::Miss));

        cache.insert(&k, 7).await;
        assert!(matches!(cache.lookup(&k).await, Lookup::Fresh(7)));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(matches!(cache.lookup(&k).await, Lookup::Stale(7)));

        cache.insert(&k, 8).await;
        assert!(matches!(cache.lookup(&k).await, Lookup::Fresh(8)));
    }

    #[tokio::test]
    async fn test_entries_are_isolated_per_key() {
        let cache: ReportCache<u32> = ReportCache::new(Duration::from_secs(300));
        cache.insert(&key("000070"), 1).await;
        cache.insert(&key("000071"), 2).await;

        assert!(matches!(cache.lookup(&key("000070")).await, Lookup::Fresh(1)));
        assert!(matches!(cache.lookup(&key("000071")).await, Lookup::Fresh(2)));
    }

    #[tokio::test]
    async fn test_fetch_slot_is_exclusive_per_key() {
        let cache: ReportCache<u32> = ReportCache::new(Duration::from_secs(300));
        let k = key("000070");

        let held = cache.fetch_slot(&k).await;
        assert!(cache.try_fetch_slot(&k).await.is_none());
        // A different key is unaffected.
        assert!(cache.try_fetch_slot(&key("000071")).await.is_some());

        drop(held);
        assert!(cache.try_fetch_slot(&k).await.is_some());
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted_on_insert() {
        let cache: ReportCache<u32> = ReportCache::new(Duration::from_millis(1));
        cache.insert(&key("000070"), 1).await;

        // Well past the eviction horizon (12x the 1ms TTL).
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.insert(&key("000071"), 2).await;

        assert!(matches!(cache.lookup(&key("000070")).await, Lookup::Miss));
        assert!(matches!(cache.lookup(&key("000071")).await, Lookup::Fresh(2)));
        assert_eq!(cache.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_unheld_fetch_locks_are_pruned() {
        let cache: ReportCache<u32> = ReportCache::new(Duration::from_secs(300));

        let slot = cache.fetch_slot(&key("000070")).await;
        drop(slot);

        // Touching any key sweeps locks nobody holds anymore.
        let held = cache.fetch_slot(&key("000071")).await;
        assert_eq!(cache.lock_count().await, 1);
        drop(held);
    }

    #[tokio::test]
    async fn test_fetch_through_dedupes_concurrent_misses() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let cache: Arc<ReportCache<u32>> = Arc::new(ReportCache::new(Duration::from_secs(300)));
        let calls = Arc::new(AtomicU32::new(0));
        let k = key("000070");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let k = k.clone();
            handles.push(tokio::spawn(async move {
                fetch_through(&cache, &k, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(42u32)
                })
                .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
