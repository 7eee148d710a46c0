use async_trait::async_trait;
use painel::domain::{CacheEntry, CachePolicy};
use painel::ports::ResponseCache;
use shared::config::CacheSettings;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

pub mod moka_store;

/// Deterministic TTL + LRU cache for entity snapshots.
///
/// Exact semantics: one entry per key, `put` replaces and re-stamps the
/// insertion time, a `get` hit refreshes recency, an expired entry reads as
/// absent, and inserting a new key at capacity evicts the least-recently-used
/// live entry (after reclaiming any expired slots first).
pub struct TtlLruCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    policy: CachePolicy,
    inner: Mutex<Inner<K, V>>,
}

struct Inner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Keys ordered least- to most-recently used. Linear scans are fine at
    /// the capacities this runs with (tens of open tabs).
    recency: Vec<K>,
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq + Clone,
{
    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            let k = self.recency.remove(pos);
            self.recency.push(k);
        }
    }

    fn remove(&mut self, key: &K) -> bool {
        if self.entries.remove(key).is_some() {
            self.recency.retain(|k| k != key);
            true
        } else {
            false
        }
    }

    fn drop_expired(&mut self, ttl: std::time::Duration) {
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(ttl))
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            self.remove(&key);
        }
    }
}

impl<K, V> TtlLruCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                recency: Vec::new(),
            }),
        }
    }

    pub fn with_settings(settings: CacheSettings) -> Self {
        Self::new(settings.into())
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        // A poisoned lock only means some holder panicked mid-operation;
        // the map itself is still structurally sound.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<K, V> ResponseCache<K, V> for TtlLruCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        match inner.entries.get(key) {
            Some(entry) if entry.is_fresh(self.policy.ttl) => {
                let value = entry.value.clone();
                inner.touch(key);
                Some(value)
            }
            Some(_) => {
                // Expired entries read as absent and free their slot.
                inner.remove(key);
                debug!(?key, "cache entry expired");
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: K, value: V) {
        let mut inner = self.lock();
        if inner.entries.contains_key(&key) {
            inner.entries.insert(key.clone(), CacheEntry::new(value));
            inner.touch(&key);
            return;
        }
        if inner.entries.len() >= self.policy.capacity {
            inner.drop_expired(self.policy.ttl);
        }
        while inner.entries.len() >= self.policy.capacity && !inner.recency.is_empty() {
            let victim = inner.recency.remove(0);
            inner.entries.remove(&victim);
            debug!(?victim, "evicting least-recently-used entry");
        }
        inner.recency.push(key.clone());
        inner.entries.insert(key, CacheEntry::new(value));
    }

    async fn invalidate(&self, key: &K) -> bool {
        let existed = self.lock().remove(key);
        if existed {
            debug!(?key, "cache entry invalidated");
        }
        existed
    }

    async fn len(&self) -> usize {
        let inner = self.lock();
        inner
            .entries
            .values()
            .filter(|entry| entry.is_fresh(self.policy.ttl))
            .count()
    }
}

impl<K, V> Debug for TtlLruCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlLruCache")
            .field("policy", &self.policy)
            .field("inner", &"<Mutex<Inner>>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn cache(ttl: Duration, capacity: usize) -> TtlLruCache<&'static str, &'static str> {
        TtlLruCache::new(CachePolicy::new(ttl, capacity))
    }

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let cache = cache(Duration::from_secs(300), 8);
        cache.put("partner-42", "{bookmakers: []}").await;
        assert_eq!(cache.get(&"partner-42").await, Some("{bookmakers: []}"));
    }

    #[tokio::test]
    async fn get_nonexistent_is_absent() {
        let cache = cache(Duration::from_secs(300), 8);
        assert_eq!(cache.get(&"partner-99").await, None);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = cache(Duration::from_millis(100), 8);
        cache.put("partner-42", "saldo").await;

        sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get(&"partner-42").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn overwrite_returns_latest_value() {
        let cache = cache(Duration::from_secs(300), 8);
        cache.put("key", "value1").await;
        cache.put("key", "value2").await;
        assert_eq!(cache.get(&"key").await, Some("value2"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn overwrite_restamps_insertion_time() {
        let cache = cache(Duration::from_millis(120), 8);
        cache.put("key", "v1").await;

        sleep(Duration::from_millis(80)).await;
        cache.put("key", "v2").await;
        sleep(Duration::from_millis(80)).await;

        // 160ms since the first put, 80ms since the second.
        assert_eq!(cache.get(&"key").await, Some("v2"));
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let cache = cache(Duration::from_secs(300), 8);
        cache.put("partner-1", "dados").await;
        assert!(cache.invalidate(&"partner-1").await);
        assert!(!cache.invalidate(&"partner-1").await);
        assert!(!cache.invalidate(&"partner-99").await);
        assert_eq!(cache.get(&"partner-1").await, None);
    }

    #[tokio::test]
    async fn exceeding_capacity_evicts_least_recently_used() {
        let cache = cache(Duration::from_secs(300), 2);
        cache.put("partner-1", "a").await;
        cache.put("partner-2", "b").await;
        cache.put("partner-3", "c").await;

        assert_eq!(cache.get(&"partner-1").await, None);
        assert_eq!(cache.get(&"partner-2").await, Some("b"));
        assert_eq!(cache.get(&"partner-3").await, Some("c"));
    }

    #[tokio::test]
    async fn get_refreshes_recency() {
        let cache = cache(Duration::from_secs(300), 2);
        cache.put("partner-1", "a").await;
        cache.put("partner-2", "b").await;

        // partner-1 becomes most recently used, so partner-2 is the victim.
        assert_eq!(cache.get(&"partner-1").await, Some("a"));
        cache.put("partner-3", "c").await;

        assert_eq!(cache.get(&"partner-1").await, Some("a"));
        assert_eq!(cache.get(&"partner-2").await, None);
        assert_eq!(cache.get(&"partner-3").await, Some("c"));
    }

    #[tokio::test]
    async fn expired_slots_are_reclaimed_before_evicting_live_entries() {
        let cache = cache(Duration::from_millis(100), 2);
        cache.put("partner-1", "a").await;
        sleep(Duration::from_millis(150)).await;

        // partner-1 has expired; inserting two more keys must not evict the
        // live partner-2.
        cache.put("partner-2", "b").await;
        cache.put("partner-3", "c").await;

        assert_eq!(cache.get(&"partner-2").await, Some("b"));
        assert_eq!(cache.get(&"partner-3").await, Some("c"));
    }

    #[tokio::test]
    async fn keys_do_not_interfere() {
        let cache = cache(Duration::from_secs(300), 8);
        cache.put("partner-1", "um").await;
        cache.put("partner-2", "dois").await;
        cache.invalidate(&"partner-1").await;

        assert_eq!(cache.get(&"partner-1").await, None);
        assert_eq!(cache.get(&"partner-2").await, Some("dois"));
    }
}
