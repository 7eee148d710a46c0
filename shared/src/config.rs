use crate::TtlMs;
use tracing::warn;

/// Tuning knobs for the entity response caches.
///
/// Both values are deployment parameters, not contracts: the defaults match
/// what the back-office currently runs with (5-minute freshness window,
/// enough slots for every partner tab a session realistically opens).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl: TtlMs,
    pub capacity: usize,
}

impl CacheSettings {
    pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("PAINEL_CACHE_TTL_MS").ok().as_deref(),
            std::env::var("PAINEL_CACHE_CAPACITY").ok().as_deref(),
        )
    }

    fn from_vars(ttl_ms: Option<&str>, capacity: Option<&str>) -> Self {
        let ttl = match ttl_ms {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => TtlMs(ms),
                _ => {
                    warn!("PAINEL_CACHE_TTL_MS={raw} is not a positive integer, using default");
                    TtlMs(Self::DEFAULT_TTL_MS)
                }
            },
            None => TtlMs(Self::DEFAULT_TTL_MS),
        };
        let capacity = match capacity {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!("PAINEL_CACHE_CAPACITY={raw} is not a positive integer, using default");
                    Self::DEFAULT_CAPACITY
                }
            },
            None => Self::DEFAULT_CAPACITY,
        };
        Self { ttl, capacity }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: TtlMs(Self::DEFAULT_TTL_MS),
            capacity: Self::DEFAULT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let settings = CacheSettings::from_vars(None, None);
        assert_eq!(settings.ttl, TtlMs(CacheSettings::DEFAULT_TTL_MS));
        assert_eq!(settings.capacity, CacheSettings::DEFAULT_CAPACITY);
    }

    #[test]
    fn parses_overrides() {
        let settings = CacheSettings::from_vars(Some("60000"), Some("8"));
        assert_eq!(settings.ttl, TtlMs(60_000));
        assert_eq!(settings.capacity, 8);
    }

    #[test]
    fn rejects_garbage_and_zero() {
        let settings = CacheSettings::from_vars(Some("five minutes"), Some("0"));
        assert_eq!(settings.ttl, TtlMs(CacheSettings::DEFAULT_TTL_MS));
        assert_eq!(settings.capacity, CacheSettings::DEFAULT_CAPACITY);
    }
}
