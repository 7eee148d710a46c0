use async_trait::async_trait;
use moka::future::Cache;
use painel::domain::CachePolicy;
use painel::ports::ResponseCache;
use std::fmt::Debug;
use std::hash::Hash;

/// Moka-backed store implementing the same port as [`crate::TtlLruCache`].
///
/// Moka handles TTL and capacity internally with a TinyLFU admission policy,
/// so eviction order under pressure is approximate rather than strict LRU.
/// Useful when a cache is shared across worker threads; the deterministic
/// store remains the default for tab-level caches.
pub struct MokaStore<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    cache: Cache<K, V>,
}

impl<K, V> MokaStore<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    pub fn new(name: &str, policy: CachePolicy) -> Self {
        let cache = Cache::builder()
            .name(name)
            .max_capacity(policy.capacity as u64)
            .time_to_live(policy.ttl)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl<K, V> ResponseCache<K, V> for MokaStore<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.cache.get(key).await
    }

    async fn put(&self, key: K, value: V) {
        self.cache.insert(key, value).await;
    }

    async fn invalidate(&self, key: &K) -> bool {
        self.cache.remove(key).await.is_some()
    }

    async fn len(&self) -> usize {
        // Entry count is an estimate until pending maintenance runs.
        self.cache.run_pending_tasks().await;
        self.cache.entry_count() as usize
    }
}

impl<K, V> Debug for MokaStore<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn store(ttl: Duration) -> MokaStore<&'static str, &'static str> {
        MokaStore::new("test", CachePolicy::new(ttl, 8))
    }

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let store = store(Duration::from_secs(300));
        store.put("hello", "world").await;
        assert_eq!(store.get(&"hello").await, Some("world"));
    }

    #[tokio::test]
    async fn invalidate_removes_and_is_idempotent() {
        let store = store(Duration::from_secs(300));
        store.put("partner-1", "dados").await;

        assert!(store.invalidate(&"partner-1").await);
        assert!(!store.invalidate(&"partner-1").await);
        assert_eq!(store.get(&"partner-1").await, None);
    }

    #[tokio::test]
    async fn overwrite_returns_latest_value() {
        let store = store(Duration::from_secs(300));
        store.put("key", "value1").await;
        store.put("key", "value2").await;
        assert_eq!(store.get(&"key").await, Some("value2"));
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let store = store(Duration::from_millis(100));
        store.put("partner-42", "saldo").await;
        assert_eq!(store.get(&"partner-42").await, Some("saldo"));

        sleep(Duration::from_millis(150)).await;

        assert_eq!(store.get(&"partner-42").await, None);
    }

    #[tokio::test]
    async fn capacity_bound_is_enforced() {
        let store: MokaStore<&str, &str> =
            MokaStore::new("bounded", CachePolicy::new(Duration::from_secs(300), 2));

        store.put("partner-1", "a").await;
        store.put("partner-2", "b").await;
        store.put("partner-3", "c").await;

        // Eviction order is approximate, but the bound must hold.
        assert!(store.len().await <= 2);
    }
}
