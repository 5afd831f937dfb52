//! Query cache: the explicit, injectable cache service between the API
//! handlers and the remote store.
//!
//! The cache is keyed by [`QueryKey`] (tag + optional filter object) and holds
//! raw JSON snapshots of remote payloads. Three timers govern an entry:
//!
//! - **stale_time**: a cached value younger than this is served as-is; once
//!   older, the next access re-fetches before answering.
//! - **gc_time**: an entry that nobody has read for this long is evicted by
//!   the background sweeper regardless of freshness.
//! - the sweep interval, owned by [`QueryCache::run_sweeper`].
//!
//! Concurrency contract (process-wide shared state, internally synchronized):
//!
//! - At most one in-flight fetch per key. Concurrent `fetch`/`prefetch`
//!   callers for an unresolved key attach to the same pending future and all
//!   receive its result - two overlapping prefetches issue exactly one remote
//!   call.
//! - A failed fetch caches nothing: the error is delivered to every attached
//!   caller and the key is immediately eligible for retry.
//! - Invalidation wins races against in-flight reads: a fetch that resolves
//!   after its key was invalidated does not re-populate the entry.

pub mod query_key;

pub use query_key::QueryKey;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::store::StoreError;

/// Per-entry timer overrides. Defaults come from [`CacheConfig`].
#[derive(Debug, Clone, Copy)]
pub struct EntryOptions {
    pub stale_time: Duration,
    pub gc_time: Duration,
}

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Value>, Arc<StoreError>>>>;

enum SlotState {
    /// A fetch is running; everyone awaits the same future.
    InFlight(SharedFetch),
    /// A resolved value and when it was fetched.
    Ready { value: Arc<Value>, fetched_at: Instant },
}

struct CacheSlot {
    state: SlotState,
    opts: EntryOptions,
    /// Refreshed on every read; the sweeper evicts entries idle past `gc_time`.
    last_access: Instant,
}

/// The query cache service. Cheap to clone; all clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<DashMap<QueryKey, CacheSlot>>,
    defaults: EntryOptions,
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            defaults: EntryOptions {
                stale_time: config.stale_time,
                gc_time: config.gc_time,
            },
        }
    }

    /// Peek at the cached value for `key` without fetching. Returns stale
    /// values too - staleness only governs when accesses re-fetch, not whether
    /// the data may be looked at. Refreshes the entry's GC clock.
    pub fn get(&self, key: &QueryKey) -> Option<Arc<Value>> {
        let mut slot = self.entries.get_mut(key)?;
        slot.last_access = Instant::now();
        match &slot.state {
            SlotState::Ready { value, .. } => Some(value.clone()),
            SlotState::InFlight(_) => None,
        }
    }

    /// Fetch the value for `key` with default entry options.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetch_fn: F) -> Result<Arc<Value>, Arc<StoreError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::store::errors::Result<Value>> + Send + 'static,
    {
        self.fetch_with(key, self.defaults, fetch_fn).await
    }

    /// Fetch the value for `key`: serve a fresh cached value, join an
    /// in-flight fetch, or start one.
    pub async fn fetch_with<F, Fut>(&self, key: QueryKey, opts: EntryOptions, fetch_fn: F) -> Result<Arc<Value>, Arc<StoreError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::store::errors::Result<Value>> + Send + 'static,
    {
        use dashmap::mapref::entry::Entry;

        // Lock scope: decide what to do with the slot without awaiting, then
        // drop the shard guard before polling the shared future.
        let shared = match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                slot.last_access = Instant::now();
                match &slot.state {
                    SlotState::Ready { value, fetched_at } if fetched_at.elapsed() < slot.opts.stale_time => {
                        trace!(%key, "cache hit");
                        return Ok(value.clone());
                    }
                    SlotState::InFlight(shared) => {
                        trace!(%key, "joining in-flight fetch");
                        shared.clone()
                    }
                    SlotState::Ready { .. } => {
                        debug!(%key, "cache entry stale, refreshing");
                        let shared = self.spawn_fetch(key.clone(), fetch_fn);
                        slot.state = SlotState::InFlight(shared.clone());
                        slot.opts = opts;
                        shared
                    }
                }
            }
            Entry::Vacant(vacant) => {
                debug!(%key, "cache miss, fetching");
                let shared = self.spawn_fetch(key.clone(), fetch_fn);
                vacant.insert(CacheSlot {
                    state: SlotState::InFlight(shared.clone()),
                    opts,
                    last_access: Instant::now(),
                });
                shared
            }
        };

        shared.await
    }

    /// Warm the cache for `key` with default entry options. No-op when a
    /// non-stale entry already exists.
    pub async fn prefetch<F, Fut>(&self, key: QueryKey, fetch_fn: F) -> Result<(), Arc<StoreError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::store::errors::Result<Value>> + Send + 'static,
    {
        self.prefetch_with(key, self.defaults, fetch_fn).await
    }

    /// Warm the cache for `key`. Shares the single-flight path with
    /// [`Self::fetch_with`], so overlapping prefetches and fetches coalesce
    /// into one remote call.
    pub async fn prefetch_with<F, Fut>(&self, key: QueryKey, opts: EntryOptions, fetch_fn: F) -> Result<(), Arc<StoreError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::store::errors::Result<Value>> + Send + 'static,
    {
        self.fetch_with(key, opts, fetch_fn).await.map(|_| ())
    }

    /// Drop the exact entry for `key`.
    pub fn invalidate(&self, key: &QueryKey) {
        if self.entries.remove(key).is_some() {
            debug!(%key, "cache entry invalidated");
        }
    }

    /// Drop every entry whose tag matches, whatever its filter. Mutations use
    /// this to clear all filtered variants of a collection at once.
    pub fn invalidate_tag(&self, tag: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.tag_name() != tag);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(tag, dropped, "cache tag invalidated");
        }
    }

    /// Number of live entries (in-flight included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict resolved entries that have not been read within their `gc_time`.
    /// In-flight entries are left alone; they resolve and age out normally.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, slot| match slot.state {
            SlotState::InFlight(_) => true,
            SlotState::Ready { .. } => slot.last_access.elapsed() < slot.opts.gc_time,
        });
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, "cache sweep evicted idle entries");
        }
        evicted
    }

    /// Background garbage-collection loop. Runs until the shutdown token fires.
    pub async fn run_sweeper(self, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("cache sweeper shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep();
                }
            }
        }
    }

    /// Build the shared single-flight future for one fetch. On success the
    /// result is written back to the slot; on failure the slot is removed so
    /// the next access retries. Either way, a slot that was invalidated while
    /// the fetch was running is not resurrected.
    fn spawn_fetch<F, Fut>(&self, key: QueryKey, fetch_fn: F) -> SharedFetch
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::store::errors::Result<Value>> + Send + 'static,
    {
        let entries = self.entries.clone();
        let future = fetch_fn();
        async move {
            match future.await {
                Ok(value) => {
                    let value = Arc::new(value);
                    if let Some(mut slot) = entries.get_mut(&key) {
                        slot.state = SlotState::Ready {
                            value: value.clone(),
                            fetched_at: Instant::now(),
                        };
                    } else {
                        trace!(%key, "fetch resolved after invalidation, result discarded");
                    }
                    Ok(value)
                }
                Err(err) => {
                    let err = Arc::new(err);
                    entries.remove_if(&key, |_, slot| matches!(slot.state, SlotState::InFlight(_)));
                    Err(err)
                }
            }
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_cache(stale: Duration, gc: Duration) -> QueryCache {
        QueryCache::new(&CacheConfig {
            stale_time: stale,
            gc_time: gc,
            sweep_interval: Duration::from_secs(60),
        })
    }

    fn key() -> QueryKey {
        QueryKey::with_params("websites", json!({"include_all": false}))
    }

    #[tokio::test]
    async fn test_fetch_caches_and_serves_fresh_values() {
        let cache = test_cache(Duration::from_secs(60), Duration::from_secs(300));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let value = cache
                .fetch(key(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(["a", "b"]))
                })
                .await
                .unwrap();
            assert_eq!(*value, json!(["a", "b"]));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1, "fresh entries must not re-fetch");
    }

    #[tokio::test]
    async fn test_concurrent_prefetches_share_one_remote_call() {
        let cache = test_cache(Duration::from_secs(60), Duration::from_secs(300));
        let calls = Arc::new(AtomicUsize::new(0));

        let make_fetch = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(json!([1, 2, 3]))
            }
        };

        let (a, b) = tokio::join!(
            cache.prefetch(key(), make_fetch(calls.clone())),
            cache.prefetch(key(), make_fetch(calls.clone())),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1, "overlapping prefetches must coalesce");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetchers_all_receive_the_shared_error() {
        let cache = test_cache(Duration::from_secs(60), Duration::from_secs(300));
        let calls = Arc::new(AtomicUsize::new(0));

        let make_fetch = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err(StoreError::NotFound)
            }
        };

        let (a, b) = tokio::join!(
            cache.fetch(key(), make_fetch(calls.clone())),
            cache.fetch(key(), make_fetch(calls.clone())),
        );
        assert!(matches!(*a.unwrap_err(), StoreError::NotFound));
        assert!(matches!(*b.unwrap_err(), StoreError::NotFound));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Failed fetches are not cached; the key retries on next access
        assert_eq!(cache.len(), 0);
        let value = cache.fetch(key(), || async { Ok(json!("recovered")) }).await.unwrap();
        assert_eq!(*value, json!("recovered"));
        assert_eq!(calls.load(Ordering::SeqCst), 1, "retry uses the new fetch_fn");
    }

    #[tokio::test]
    async fn test_stale_entries_refetch_on_access() {
        let cache = test_cache(Duration::from_millis(20), Duration::from_secs(300));
        let calls = Arc::new(AtomicUsize::new(0));

        let make_fetch = |calls: Arc<AtomicUsize>, payload: &'static str| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!(payload))
            }
        };

        let first = cache.fetch(key(), make_fetch(calls.clone(), "old")).await.unwrap();
        assert_eq!(*first, json!("old"));

        tokio::time::sleep(Duration::from_millis(40)).await;

        let second = cache.fetch(key(), make_fetch(calls.clone(), "new")).await.unwrap();
        assert_eq!(*second, json!("new"), "stale entry must be superseded by the refresh");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_prefetch_is_noop_when_fresh() {
        let cache = test_cache(Duration::from_secs(60), Duration::from_secs(300));
        let calls = Arc::new(AtomicUsize::new(0));

        let make_fetch = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!([]))
            }
        };

        cache.prefetch(key(), make_fetch(calls.clone())).await.unwrap();
        cache.prefetch(key(), make_fetch(calls.clone())).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_tag_drops_all_filter_variants() {
        let cache = test_cache(Duration::from_secs(60), Duration::from_secs(300));

        cache
            .fetch(QueryKey::with_params("websites", json!({"include_all": false})), || async {
                Ok(json!(1))
            })
            .await
            .unwrap();
        cache
            .fetch(QueryKey::with_params("websites", json!({"include_all": true})), || async {
                Ok(json!(2))
            })
            .await
            .unwrap();
        cache
            .fetch(QueryKey::with_params("website", json!({"id": "x"})), || async { Ok(json!(3)) })
            .await
            .unwrap();

        cache.invalidate_tag("websites");

        assert!(cache.get(&QueryKey::with_params("websites", json!({"include_all": false}))).is_none());
        assert!(cache.get(&QueryKey::with_params("websites", json!({"include_all": true}))).is_none());
        assert!(
            cache.get(&QueryKey::with_params("website", json!({"id": "x"}))).is_some(),
            "the entity tag is a different prefix and must survive"
        );
    }

    #[tokio::test]
    async fn test_fetch_resolving_after_invalidation_does_not_repopulate() {
        let cache = test_cache(Duration::from_secs(60), Duration::from_secs(300));

        let slow_key = key();
        let fetching = cache.fetch(slow_key.clone(), || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(json!("from before the write"))
        });
        let invalidator = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cache.invalidate(&slow_key);
        };

        let (fetched, ()) = tokio::join!(fetching, invalidator);
        // The caller still gets its result...
        assert_eq!(*fetched.unwrap(), json!("from before the write"));
        // ...but the cache does not keep pre-invalidation data
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_sweep_evicts_idle_entries_only() {
        let cache = test_cache(Duration::from_secs(60), Duration::from_millis(30));

        cache.fetch(QueryKey::tag("ideas"), || async { Ok(json!([])) }).await.unwrap();
        cache.fetch(QueryKey::tag("concepts"), || async { Ok(json!([])) }).await.unwrap();
        assert_eq!(cache.len(), 2);

        tokio::time::sleep(Duration::from_millis(50)).await;
        // Touch one entry to keep it alive
        assert!(cache.get(&QueryKey::tag("ideas")).is_some());

        let evicted = cache.sweep();
        assert_eq!(evicted, 1);
        assert!(cache.get(&QueryKey::tag("ideas")).is_some());
        assert!(cache.get(&QueryKey::tag("concepts")).is_none());
    }

    #[tokio::test]
    async fn test_get_does_not_trigger_fetches() {
        let cache = test_cache(Duration::from_secs(60), Duration::from_secs(300));
        assert!(cache.get(&key()).is_none());
        assert!(cache.is_empty());
    }
}
