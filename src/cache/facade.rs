//! Cache Facade Module
//!
//! The public, shareable cache handle. Each call takes the engine lock for
//! exactly one operation; the background sweep takes the same lock.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use crate::cache::{
    CacheEngine, CacheStats, Clock, DetailedInfo, EvictionStrategy, JsonSizeEstimator,
    SizeEstimator, SystemClock,
};
use crate::config::{CacheConfig, ResolvedConfig};
use crate::tasks::{spawn_cleanup_task, CleanupHandle};

// == Cache ==
/// Thread-safe in-memory cache with pluggable eviction.
///
/// Cloning yields another handle to the same cache. No method returns an
/// error or panics on bad input: invalid keys read as misses and rejected
/// values report `false`.
///
/// # Example
/// ```
/// use chat_cache::{Cache, CacheConfig, EvictionStrategy};
///
/// let cache: Cache<String> = Cache::new(
///     CacheConfig::new().max_entries(100).strategy(EvictionStrategy::Lfu),
/// );
/// assert!(cache.set("greeting", "hello".to_string(), None));
/// assert_eq!(cache.get("greeting"), Some("hello".to_string()));
/// cache.stop_cleanup();
/// ```
pub struct Cache<V> {
    engine: Arc<Mutex<CacheEngine<V>>>,
    cleanup: Arc<Mutex<Option<CleanupHandle>>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            cleanup: Arc::clone(&self.cleanup),
        }
    }
}

impl<V> Cache<V>
where
    V: Serialize + Clone + Send + 'static,
{
    /// Creates a cache sized by JSON encoding length, on the system clock,
    /// and starts the background sweep.
    pub fn new(config: CacheConfig) -> Self {
        CacheBuilder::new(config).build()
    }

    /// Starts a builder with the JSON size estimator.
    pub fn builder(config: CacheConfig) -> CacheBuilder<V> {
        CacheBuilder::new(config)
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + 'static,
{
    /// Stores `value` under `key`. See [`CacheEngine::set`].
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> bool {
        self.engine.lock().set(key, value, ttl)
    }

    /// Returns the live value under `key`, counting a hit or a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        self.engine.lock().get(key)
    }

    /// Whether `key` holds a live entry, without counting an access.
    pub fn contains(&self, key: &str) -> bool {
        self.engine.lock().contains(key)
    }

    /// Removes `key`, returning whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.engine.lock().delete(key)
    }

    /// Removes every entry and resets all counters.
    pub fn clear(&self) {
        self.engine.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.engine.lock().stats()
    }

    pub fn detailed_info(&self) -> DetailedInfo<V> {
        self.engine.lock().detailed_info()
    }

    /// Runs one expiry sweep now, returning the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.engine.lock().purge_expired()
    }

    pub fn strategy(&self) -> EvictionStrategy {
        self.engine.lock().config().strategy
    }

    pub fn config(&self) -> ResolvedConfig {
        self.engine.lock().config().clone()
    }

    pub fn len(&self) -> usize {
        self.engine.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.lock().is_empty()
    }

    // == Stop Cleanup ==
    /// Stops the background sweep. Safe to call repeatedly or from any clone.
    pub fn stop_cleanup(&self) {
        if let Some(handle) = self.cleanup.lock().take() {
            handle.stop();
            info!("TTL cleanup stopped");
        }
    }

    /// Whether a background sweep is attached to this cache.
    pub fn is_cleanup_running(&self) -> bool {
        self.cleanup
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("engine", &*self.engine.lock())
            .finish()
    }
}

// == Cache Builder ==
/// Assembles a [`Cache`] with a custom clock, size estimator, or without
/// the background sweep.
pub struct CacheBuilder<V> {
    config: CacheConfig,
    estimator: Box<dyn SizeEstimator<V>>,
    clock: Arc<dyn Clock>,
    cleanup: bool,
}

impl<V> CacheBuilder<V>
where
    V: Serialize + Clone + Send + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self::with_estimator(config, JsonSizeEstimator::<V>::new())
    }
}

impl<V> CacheBuilder<V>
where
    V: Clone + Send + 'static,
{
    /// Starts a builder with a custom size estimator; `V` need not be
    /// serializable.
    pub fn with_estimator(
        config: CacheConfig,
        estimator: impl SizeEstimator<V> + 'static,
    ) -> Self {
        Self {
            config,
            estimator: Box::new(estimator),
            clock: Arc::new(SystemClock::new()),
            cleanup: true,
        }
    }

    pub fn estimator(mut self, estimator: impl SizeEstimator<V> + 'static) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Skips the background sweep; expired entries are then removed only on
    /// read, under capacity pressure, or by [`Cache::purge_expired`].
    pub fn without_cleanup(mut self) -> Self {
        self.cleanup = false;
        self
    }

    pub fn build(self) -> Cache<V> {
        let config = self.config.resolve();
        let interval = config.cleanup_interval;
        info!(
            "Cache initialized: strategy={}, max_size={}, max_entries={}, default_ttl={}ms",
            config.strategy,
            config.max_size,
            config.max_entries,
            config.default_ttl.as_millis()
        );

        let engine = Arc::new(Mutex::new(CacheEngine::new(
            config,
            self.estimator,
            self.clock,
        )));

        let cleanup = if self.cleanup {
            spawn_cleanup_task(Arc::downgrade(&engine), interval)
        } else {
            None
        };

        Cache {
            engine,
            cleanup: Arc::new(Mutex::new(cleanup)),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FnEstimator, MockClock};

    fn test_cache(config: CacheConfig) -> (Cache<String>, MockClock) {
        let clock = MockClock::new();
        let cache = Cache::builder(config)
            .clock(clock.clone())
            .without_cleanup()
            .build();
        (cache, clock)
    }

    #[test]
    fn test_clones_share_state() {
        let (cache, _) = test_cache(CacheConfig::new());
        let other = cache.clone();

        cache.set("k", "v".to_string(), None);
        assert_eq!(other.get("k"), Some("v".to_string()));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_json_estimator_by_default() {
        let (cache, _) = test_cache(CacheConfig::new());
        cache.set("k", "abc".to_string(), None);
        // JSON string encoding adds the quotes
        assert_eq!(cache.stats().total_memory, 5);
    }

    #[test]
    fn test_custom_estimator_for_non_serializable_values() {
        #[derive(Clone)]
        struct Opaque(Vec<u8>);

        let cache = CacheBuilder::with_estimator(
            CacheConfig::new().max_size(8),
            FnEstimator(|v: &Opaque| v.0.len() as u64),
        )
        .without_cleanup()
        .build();

        assert!(cache.set("small", Opaque(vec![0; 4]), None));
        assert!(!cache.set("large", Opaque(vec![0; 9]), None));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stop_cleanup_is_idempotent() {
        let cache: Cache<String> = Cache::new(CacheConfig::new());
        assert!(cache.is_cleanup_running());

        cache.stop_cleanup();
        cache.stop_cleanup();
        assert!(!cache.is_cleanup_running());

        assert!(cache.set("still", "works".to_string(), None));
        assert_eq!(cache.get("still"), Some("works".to_string()));
    }

    #[test]
    fn test_stop_cleanup_without_sweep() {
        let (cache, _) = test_cache(CacheConfig::new());
        assert!(!cache.is_cleanup_running());
        cache.stop_cleanup();
    }

    #[test]
    fn test_invalid_config_is_replaced() {
        let (cache, _) = test_cache(
            CacheConfig::new()
                .max_size(-10)
                .max_entries(-1)
                .eviction_strategy("RANDOM"),
        );

        assert_eq!(cache.strategy(), EvictionStrategy::Lru);
        let config = cache.config();
        assert!(config.max_size > 0);
        assert!(config.max_entries > 0);
        assert!(cache.set("k", "v".to_string(), None));
    }

    #[tokio::test]
    async fn test_sweep_runs_inside_runtime() {
        let clock = MockClock::new();
        let cache: Cache<String> = Cache::builder(
            CacheConfig::new().cleanup_interval(Duration::from_millis(10)),
        )
        .clock(clock.clone())
        .build();

        cache.set("k", "v".to_string(), Some(Duration::from_millis(100)));
        clock.advance_ms(200);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !cache.is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
        cache.stop_cleanup();
    }
}
