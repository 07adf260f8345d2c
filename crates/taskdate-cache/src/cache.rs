//! The TTL cache and its background sweeper.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

struct Shared<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K: Eq + Hash, V> Shared<K, V> {
    fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

/// Stops and joins the sweeper thread when dropped.
struct Sweeper {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        // Dropping the sender disconnects the channel and wakes the thread.
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("cache sweeper thread panicked");
            }
        }
    }
}

/// Thread-safe key/value cache with per-entry expiry.
///
/// Reads take a shared lock and never block each other; writes, invalidation
/// and sweeps take the lock exclusively. Expired entries are invisible to
/// [`get`](TtlCache::get) immediately, and physically removed by the next
/// sweep. The lock never poisons, so a panic in another thread cannot turn
/// the cache into an error source.
///
/// Share one instance by reference or `Arc`; dropping it stops the sweeper.
pub struct TtlCache<K, V> {
    shared: Arc<Shared<K, V>>,
    config: CacheConfig,
    _sweeper: Option<Sweeper>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache on the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    ///
    /// Starts the background sweeper unless `config.sweep_interval` is zero.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let shared = Arc::new(Shared {
            entries: RwLock::new(HashMap::new()),
            clock,
        });

        let sweeper = if config.sweep_interval.is_zero() {
            None
        } else {
            spawn_sweeper(Arc::clone(&shared), config.sweep_interval)
        };

        Self {
            shared,
            config,
            _sweeper: sweeper,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Insert or overwrite `key`. A zero `ttl` means the entry never expires.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            self.shared.clock.now().checked_add(ttl)
        };
        self.shared
            .entries
            .write()
            .insert(key, Entry { value, expires_at });
    }

    /// Insert or overwrite `key` with the configured default TTL.
    pub fn insert(&self, key: K, value: V) {
        self.set(key, value, self.config.default_ttl);
    }

    /// Look up `key`, treating expired entries as absent.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.shared.clock.now();
        let entries = self.shared.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    /// Remove `key` if present.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.entries.write().remove(key);
    }

    /// Discard every entry. Called after any write to the backing store.
    pub fn invalidate_all(&self) {
        let mut entries = self.shared.entries.write();
        trace!(entries = entries.len(), "invalidating cache");
        entries.clear();
    }

    /// Return the cached value for `key`, or compute it with `load`, cache it
    /// for `ttl` and return it. Errors from `load` are returned and nothing is
    /// cached.
    ///
    /// `load` runs without the lock held, so concurrent misses on the same key
    /// may each run it; the last write wins.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, ttl: Duration, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = load()?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Remove expired entries now and return how many were removed.
    pub fn sweep(&self) -> usize {
        self.shared.sweep()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.shared.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.read().is_empty()
    }
}

fn spawn_sweeper<K, V>(shared: Arc<Shared<K, V>>, interval: Duration) -> Option<Sweeper>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let (stop, stopped) = mpsc::channel::<()>();

    let spawned = thread::Builder::new()
        .name("taskdate-cache-sweep".to_string())
        .spawn(move || {
            debug!(?interval, "cache sweeper started");
            loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let removed = shared.sweep();
                        if removed > 0 {
                            debug!(removed, "swept expired cache entries");
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("cache sweeper stopped");
        });

    match spawned {
        Ok(handle) => Some(Sweeper {
            stop: Some(stop),
            handle: Some(handle),
        }),
        Err(e) => {
            // Reads still hide expired entries; only physical eviction is lost.
            warn!(error = %e, "could not start cache sweeper");
            None
        }
    }
}
