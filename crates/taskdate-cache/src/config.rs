//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a [`TtlCache`](crate::TtlCache).
///
/// Durations are written as whole milliseconds when serialized:
///
/// ```json
/// { "sweep_interval_ms": 60000, "default_ttl_ms": 300000 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time between background sweeps. Zero disables the sweeper thread;
    /// expired entries are then only hidden on read and removed by explicit
    /// calls to `sweep`.
    #[serde(rename = "sweep_interval_ms", with = "millis")]
    pub sweep_interval: Duration,

    /// TTL used by `insert`. Zero means entries never expire.
    #[serde(rename = "default_ttl_ms", with = "millis")]
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
            default_ttl: Duration::from_secs(5 * 60),
        }
    }
}

impl CacheConfig {
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
