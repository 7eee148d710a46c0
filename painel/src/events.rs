use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Cross-component notification that the remote data behind a key changed.
/// Independently-mounted views subscribe to drop derived state without
/// prop-drilling callbacks through the whole tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityEvent<K> {
    /// A mutation touched the entity; its cache entry was dropped.
    Invalidated { key: K, timestamp: u64 },
    /// A forced refresh replaced the cached snapshot.
    Refreshed { key: K, timestamp: u64 },
}

impl<K> EntityEvent<K> {
    pub fn invalidated(key: K) -> Self {
        EntityEvent::Invalidated {
            key,
            timestamp: now_timestamp(),
        }
    }

    pub fn refreshed(key: K) -> Self {
        EntityEvent::Refreshed {
            key,
            timestamp: now_timestamp(),
        }
    }

    pub fn key(&self) -> &K {
        match self {
            EntityEvent::Invalidated { key, .. } | EntityEvent::Refreshed { key, .. } => key,
        }
    }
}

/// Current timestamp in seconds since UNIX epoch.
pub fn now_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
