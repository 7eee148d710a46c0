use crate::flights::FlightRegistry;
use painel::domain::{LivenessToken, LoadOutcome};
use painel::events::EntityEvent;
use painel::ports::{EntityFetcher, ResponseCache};
use shared::Result;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::broadcast;

fn publish<K>(sender: &Option<broadcast::Sender<EntityEvent<K>>>, event: EntityEvent<K>)
where
    K: Debug + Clone,
{
    let Some(sender) = sender else {
        return;
    };
    let key = event.key().clone();
    match sender.send(event) {
        Ok(subscriber_count) => {
            tracing::debug!(?key, subscriber_count, "published entity event");
        }
        Err(_) => {
            tracing::debug!(?key, "no subscribers for entity event");
        }
    }
}

/// Cache-first read of an entity's tab payload.
///
/// The cache is consulted first; a fresh hit never touches the remote
/// source. On a miss the per-key in-flight flag is claimed before fetching,
/// so a second load issued while the first is outstanding reports
/// [`LoadOutcome::InFlight`] instead of duplicating the fetch.
#[derive(Clone)]
pub struct LoadEntity<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: Arc<dyn ResponseCache<K, V>>,
    fetcher: Arc<dyn EntityFetcher<K, V>>,
    flights: FlightRegistry<K>,
}

impl<K, V> LoadEntity<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        cache: Arc<dyn ResponseCache<K, V>>,
        fetcher: Arc<dyn EntityFetcher<K, V>>,
        flights: FlightRegistry<K>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            flights,
        }
    }

    pub async fn exec(&self, key: K, token: &LivenessToken) -> Result<LoadOutcome<V>> {
        if let Some(value) = self.cache.get(&key).await {
            tracing::debug!(?key, "cache hit");
            return Ok(LoadOutcome::Hit(value));
        }

        let Some(_flight) = self.flights.try_claim(&key) else {
            tracing::debug!(?key, "fetch already in flight");
            return Ok(LoadOutcome::InFlight);
        };

        // A fetch error propagates here with the cache untouched, so the
        // previous stale-or-absent state survives for a manual retry.
        let value = self.fetcher.fetch(&key).await?;
        self.cache.put(key.clone(), value.clone()).await;

        // The snapshot is cached either way; only delivery is liveness-gated.
        if !token.is_live() {
            tracing::debug!(?key, "caller gone, discarding fetched value");
            return Ok(LoadOutcome::Discarded);
        }
        Ok(LoadOutcome::Fetched(value))
    }
}

/// Forced refresh: bypasses the cache read entirely, refetches, and
/// overwrites the cached snapshot. Shares the in-flight registry with
/// [`LoadEntity`] so a refresh cannot race a plain load for the same key.
#[derive(Clone)]
pub struct RefreshEntity<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: Arc<dyn ResponseCache<K, V>>,
    fetcher: Arc<dyn EntityFetcher<K, V>>,
    flights: FlightRegistry<K>,
    events: Option<broadcast::Sender<EntityEvent<K>>>,
}

impl<K, V> RefreshEntity<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        cache: Arc<dyn ResponseCache<K, V>>,
        fetcher: Arc<dyn EntityFetcher<K, V>>,
        flights: FlightRegistry<K>,
        events: Option<broadcast::Sender<EntityEvent<K>>>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            flights,
            events,
        }
    }

    pub async fn exec(&self, key: K, token: &LivenessToken) -> Result<LoadOutcome<V>> {
        let Some(_flight) = self.flights.try_claim(&key) else {
            tracing::debug!(?key, "fetch already in flight");
            return Ok(LoadOutcome::InFlight);
        };

        let value = self.fetcher.fetch(&key).await?;
        self.cache.put(key.clone(), value.clone()).await;
        publish(&self.events, EntityEvent::refreshed(key.clone()));

        if !token.is_live() {
            tracing::debug!(?key, "caller gone, discarding refreshed value");
            return Ok(LoadOutcome::Discarded);
        }
        Ok(LoadOutcome::Fetched(value))
    }
}

/// Mutation hook: after a create/update/delete touching an entity resolves,
/// drop its cached snapshot so the next read observes fresh data, and tell
/// other mounted views about it. Idempotent by construction.
#[derive(Clone)]
pub struct InvalidateEntity<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: Arc<dyn ResponseCache<K, V>>,
    events: Option<broadcast::Sender<EntityEvent<K>>>,
}

impl<K, V> InvalidateEntity<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        cache: Arc<dyn ResponseCache<K, V>>,
        events: Option<broadcast::Sender<EntityEvent<K>>>,
    ) -> Self {
        Self { cache, events }
    }

    /// Returns whether a cache entry existed. The event is published either
    /// way: the underlying data changed even if nothing was cached.
    pub async fn exec(&self, key: K) -> bool {
        let existed = self.cache.invalidate(&key).await;
        publish(&self.events, EntityEvent::invalidated(key));
        existed
    }
}
