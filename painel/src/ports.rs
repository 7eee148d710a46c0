#![deny(clippy::all)]

use async_trait::async_trait;
use shared::Result;

// Ports are the pluggable extension points between the tab-facing use cases
// and whatever holds the cached snapshots / talks to the remote backend.

/// Port for per-entity response caches.
///
/// Implementations own the TTL and eviction lifecycle: a `get` hit must be
/// fresh and refreshes the entry's recency; `put` stamps the insertion time
/// and evicts the least-recently-used entry under capacity pressure;
/// `invalidate` is idempotent.
#[async_trait]
pub trait ResponseCache<K, V>: Send + Sync + 'static {
    /// Fresh value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &K) -> Option<V>;
    /// Insert or overwrite the snapshot for `key`, stamping current time.
    async fn put(&self, key: K, value: V);
    /// Drop the entry for `key`. Returns whether an entry existed.
    async fn invalidate(&self, key: &K) -> bool;
    /// Number of unexpired entries currently held.
    async fn len(&self) -> usize;
}

/// Port for the remote data source behind a tab: one call returns the
/// complete snapshot for an entity. Timeouts and retries, if any, live
/// behind this boundary.
#[async_trait]
pub trait EntityFetcher<K, V>: Send + Sync + 'static {
    async fn fetch(&self, key: &K) -> Result<V>;
}
