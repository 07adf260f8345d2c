//! # taskdate-cache
//!
//! In-memory key/value cache with per-entry time-to-live, used to memoize
//! read-heavy task queries. Writes to the backing store invalidate the whole
//! cache with [`TtlCache::invalidate_all`].
//!
//! ```rust
//! use std::time::Duration;
//! use taskdate_cache::{CacheConfig, TtlCache};
//!
//! let cache: TtlCache<String, Vec<u64>> = TtlCache::new(CacheConfig::default());
//! cache.set("tasks:20240305".to_string(), vec![1, 2], Duration::from_secs(300));
//! assert_eq!(cache.get("tasks:20240305"), Some(vec![1, 2]));
//!
//! cache.invalidate_all();
//! assert_eq!(cache.get("tasks:20240305"), None);
//! ```
//!
//! ## Modules
//!
//! - [`cache`] — `TtlCache` and the background sweeper
//! - [`clock`] — system and manual time sources
//! - [`config`] — sweep interval and default TTL

pub mod cache;
pub mod clock;
pub mod config;

pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
