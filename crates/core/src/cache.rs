//! In-memory TTL cache built on [`moka::future::Cache`].
//!
//! An explicit component, constructed once and handed to whoever needs it
//! (wrapped in `Arc`), rather than module-level state. Expiry and capacity
//! eviction are moka's; this wrapper adds prefix invalidation and
//! [`TtlCache::get_or_load`], which never stores a value loaded before an
//! invalidation that overlapped the load.

use std::future::Future;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::RwLock;

/// Longest TTL an entry may be given.
pub const MAX_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

/// Thread-safe key/value cache with a shared time-to-live.
pub struct TtlCache<V> {
    inner: Cache<String, V>,
    /// Bumped by every invalidation. Loads compare it before storing.
    epoch: RwLock<u64>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let inner = Cache::builder()
            .time_to_live(ttl.min(MAX_TTL))
            .max_capacity(max_entries)
            .support_invalidation_closures()
            .build();
        Self {
            inner,
            epoch: RwLock::new(0),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.inner.policy().time_to_live()
    }

    /// Return the cached value if present and unexpired.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let _guard = self.epoch.read().await;
        self.inner.insert(key.into(), value).await;
    }

    /// Return the cached value, or run `load` and cache its result.
    ///
    /// The loaded value is always returned, but it is only stored when no
    /// invalidation ran between the cache miss and the end of the load.
    pub async fn get_or_load<F, Fut, E>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.inner.get(key).await {
            return Ok(value);
        }

        let seen = *self.epoch.read().await;
        let value = load().await?;

        let epoch = self.epoch.read().await;
        if *epoch == seen {
            self.inner.insert(key.to_string(), value.clone()).await;
        }
        Ok(value)
    }

    /// Remove a single key.
    pub async fn invalidate(&self, key: &str) {
        let mut epoch = self.epoch.write().await;
        *epoch += 1;
        self.inner.invalidate(key).await;
    }

    /// Remove every key starting with `prefix`.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let mut epoch = self.epoch.write().await;
        *epoch += 1;
        let prefix = prefix.to_string();
        if self
            .inner
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix))
            .is_err()
        {
            // Only fails when closures are unsupported; drop everything instead.
            self.inner.invalidate_all();
        }
    }

    /// Apply pending expirations, evictions and invalidations now.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Approximate entry count as of the last maintenance run.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Entry count after applying pending maintenance.
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::oneshot;

    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn get_returns_fresh_value() {
        let cache = TtlCache::new(TTL, 10);
        cache.insert("a", 1).await;
        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let cache = TtlCache::new(Duration::from_millis(50), 10);
        cache.insert("a", 1).await;
        assert_eq!(cache.get("a").await, Some(1));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(cache.get("a").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn ttl_is_clamped() {
        let cache: TtlCache<i32> = TtlCache::new(MAX_TTL * 2, 10);
        assert_eq!(cache.ttl(), Some(MAX_TTL));
    }

    #[tokio::test]
    async fn capacity_is_bounded() {
        let cache = TtlCache::new(TTL, 2);
        for i in 0..10 {
            cache.insert(format!("k{i}"), i).await;
        }
        assert!(cache.len().await <= 2);
    }

    #[tokio::test]
    async fn invalidate_prefix_removes_matching_keys() {
        let cache = TtlCache::new(TTL, 10);
        cache.insert("project:1:measure:1", 1).await;
        cache.insert("project:1:measure:2", 2).await;
        cache.insert("project:12:measure:1", 3).await;

        cache.invalidate_prefix("project:1:").await;
        assert_eq!(cache.get("project:1:measure:1").await, None);
        assert_eq!(cache.get("project:1:measure:2").await, None);
        assert_eq!(cache.get("project:12:measure:1").await, Some(3));
        assert_eq!(cache.len().await, 1);

        cache.invalidate("project:12:measure:1").await;
        assert_eq!(cache.get("project:12:measure:1").await, None);
    }

    #[tokio::test]
    async fn entries_inserted_after_prefix_invalidation_survive() {
        let cache = TtlCache::new(TTL, 10);
        cache.insert("project:1:measure:1", 1).await;
        cache.invalidate_prefix("project:1:").await;
        cache.insert("project:1:measure:1", 2).await;
        assert_eq!(cache.get("project:1:measure:1").await, Some(2));
    }

    #[tokio::test]
    async fn get_or_load_caches_on_miss() {
        let cache = TtlCache::new(TTL, 10);
        let loaded: Result<i32, ()> = cache.get_or_load("a", || async { Ok(7) }).await;
        assert_eq!(loaded, Ok(7));
        assert_eq!(cache.get("a").await, Some(7));

        let hit: Result<i32, ()> = cache.get_or_load("a", || async { Ok(99) }).await;
        assert_eq!(hit, Ok(7));
    }

    #[tokio::test]
    async fn get_or_load_does_not_cache_errors() {
        let cache: TtlCache<i32> = TtlCache::new(TTL, 10);
        let loaded = cache.get_or_load("a", || async { Err("db down") }).await;
        assert_eq!(loaded, Err("db down"));
        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test]
    async fn load_overlapping_invalidation_is_not_stored() {
        let cache = Arc::new(TtlCache::new(TTL, 10));
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let loader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_load("project:1:measure:1", || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, ()>("old")
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.invalidate_prefix("project:1:").await;
        release_tx.send(()).unwrap();

        assert_eq!(loader.await.unwrap(), Ok("old"));
        assert_eq!(cache.get("project:1:measure:1").await, None);

        let fresh: Result<&str, ()> = cache
            .get_or_load("project:1:measure:1", || async { Ok("new") })
            .await;
        assert_eq!(fresh, Ok("new"));
        assert_eq!(cache.get("project:1:measure:1").await, Some("new"));
    }

    #[tokio::test]
    async fn shared_across_tasks() {
        let cache = Arc::new(TtlCache::new(TTL, 100));
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.insert(format!("k{i}"), i).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(cache.len().await, 10);
    }
}
