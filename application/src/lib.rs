// application/src/lib.rs
pub mod flights;
pub mod usecases;

use flights::FlightRegistry;
use painel::events::EntityEvent;
use painel::ports::{EntityFetcher, ResponseCache};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::broadcast;
use usecases::{InvalidateEntity, LoadEntity, RefreshEntity};

/// One service per feature/tab: load, refresh, and invalidate for a single
/// payload shape, wired over a shared cache, fetcher, and in-flight registry.
#[derive(Clone)]
pub struct EntityService<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub load: LoadEntity<K, V>,
    pub refresh: RefreshEntity<K, V>,
    pub invalidate: InvalidateEntity<K, V>,
    events: Option<broadcast::Sender<EntityEvent<K>>>,
}

impl<K, V> EntityService<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(cache: Arc<dyn ResponseCache<K, V>>, fetcher: Arc<dyn EntityFetcher<K, V>>) -> Self {
        Self::build(cache, fetcher, None)
    }

    /// Wire with a broadcast channel so other mounted views hear about
    /// refreshes and invalidations.
    pub fn with_events(
        cache: Arc<dyn ResponseCache<K, V>>,
        fetcher: Arc<dyn EntityFetcher<K, V>>,
        events: broadcast::Sender<EntityEvent<K>>,
    ) -> Self {
        Self::build(cache, fetcher, Some(events))
    }

    fn build(
        cache: Arc<dyn ResponseCache<K, V>>,
        fetcher: Arc<dyn EntityFetcher<K, V>>,
        events: Option<broadcast::Sender<EntityEvent<K>>>,
    ) -> Self {
        let flights = FlightRegistry::new();
        Self {
            load: LoadEntity::new(Arc::clone(&cache), Arc::clone(&fetcher), flights.clone()),
            refresh: RefreshEntity::new(
                Arc::clone(&cache),
                Arc::clone(&fetcher),
                flights,
                events.clone(),
            ),
            invalidate: InvalidateEntity::new(cache, events.clone()),
            events,
        }
    }

    pub fn subscribe(&self) -> Option<broadcast::Receiver<EntityEvent<K>>> {
        self.events.as_ref().map(|sender| sender.subscribe())
    }
}
