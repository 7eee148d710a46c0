use serde::{Deserialize, Serialize};
use shared::config::CacheSettings;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identifier of a managed partner (parceiro), the owning entity for every
/// cached tab payload: linked bookmakers, bank accounts, movimentações.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerId(pub Uuid);

impl PartnerId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partner-{}", self.0)
    }
}

/// A complete snapshot of one entity's remote data, stamped at fetch time.
/// Entries are never partial; a refresh replaces the whole value.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    /// Freshness window: `now - stored_at < ttl`. An expired entry is
    /// indistinguishable from an absent one for readers.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Lifecycle policy shared by every cache instance: a fixed freshness
/// window and a bounded number of slots, LRU-evicted under pressure.
#[derive(Clone, Copy, Debug)]
pub struct CachePolicy {
    pub ttl: Duration,
    pub capacity: usize,
}

impl CachePolicy {
    /// Capacity is clamped to at least one slot.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
        }
    }
}

impl From<CacheSettings> for CachePolicy {
    fn from(settings: CacheSettings) -> Self {
        Self::new(settings.ttl.into(), settings.capacity)
    }
}

/// What a load request produced, from the caller's point of view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome<V> {
    /// Served from the cache without touching the remote source.
    Hit(V),
    /// Fetched from the remote source and cached.
    Fetched(V),
    /// A fetch for this key is already outstanding; no duplicate fetch was
    /// started and no value is available yet.
    InFlight,
    /// The fetch completed after the caller's liveness token was revoked;
    /// the value was withheld to avoid writes into unmounted state.
    Discarded,
}

impl<V> LoadOutcome<V> {
    pub fn value(&self) -> Option<&V> {
        match self {
            LoadOutcome::Hit(v) | LoadOutcome::Fetched(v) => Some(v),
            LoadOutcome::InFlight | LoadOutcome::Discarded => None,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            LoadOutcome::Hit(v) | LoadOutcome::Fetched(v) => Some(v),
            LoadOutcome::InFlight | LoadOutcome::Discarded => None,
        }
    }
}

/// Tracks whether the view that issued a load is still interested in the
/// result. Revoking does not cancel the in-flight request; it only tells
/// the loader to drop the response on arrival.
#[derive(Clone, Debug)]
pub struct LivenessToken {
    alive: Arc<AtomicBool>,
}

impl LivenessToken {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn revoke(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_live(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl Default for LivenessToken {
    fn default() -> Self {
        Self::new()
    }
}
