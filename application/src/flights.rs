use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-key in-flight flags shared by the load and refresh use cases.
///
/// A flag is claimed synchronously before a fetch starts, so at most one
/// fetch per key is ever outstanding. The claim is released when the
/// returned guard drops, including on fetch error or panic.
#[derive(Clone, Debug)]
pub struct FlightRegistry<K>
where
    K: Hash + Eq + Clone,
{
    inflight: Arc<Mutex<HashSet<K>>>,
}

impl<K> FlightRegistry<K>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claim the flight for `key`, or `None` if one is already outstanding.
    pub fn try_claim(&self, key: &K) -> Option<FlightGuard<K>> {
        let mut set = self
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !set.insert(key.clone()) {
            return None;
        }
        Some(FlightGuard {
            key: key.clone(),
            inflight: Arc::clone(&self.inflight),
        })
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

impl<K> Default for FlightRegistry<K>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

pub struct FlightGuard<K>
where
    K: Hash + Eq,
{
    key: K,
    inflight: Arc<Mutex<HashSet<K>>>,
}

impl<K> Drop for FlightGuard<K>
where
    K: Hash + Eq,
{
    fn drop(&mut self) {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
