//! Cache Engine Module
//!
//! Single-owner cache state machine combining the entry store, the eviction
//! policy, and statistics. Every method runs to completion without I/O; the
//! [`Cache`](super::Cache) facade serializes access to it behind one lock.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{
    is_valid_key, policy, CacheStats, Clock, DetailedInfo, EntryInfo, EntryStore, Rejection,
    SizeEstimator,
};
use crate::config::ResolvedConfig;

// == Cache Engine ==
/// Cache state with capacity enforcement and expiry checks.
pub struct CacheEngine<V> {
    /// Entry storage and size accounting
    store: EntryStore<V>,
    /// Hit/miss/eviction counters
    stats: CacheStats,
    /// Validated settings
    config: ResolvedConfig,
    /// Time source for timestamps and expiry
    clock: Arc<dyn Clock>,
}

impl<V> CacheEngine<V> {
    // == Constructor ==
    pub fn new(
        config: ResolvedConfig,
        estimator: Box<dyn SizeEstimator<V>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let stats = CacheStats {
            max_size: config.max_size,
            max_entries: config.max_entries,
            ..CacheStats::new()
        };
        Self {
            store: EntryStore::new(config.max_size, estimator),
            stats,
            config,
            clock,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, evicting as needed to stay within limits.
    ///
    /// `ttl` overrides the default time-to-live; `None` or zero keeps the
    /// default. Returns `false` when the value is not stored: invalid key,
    /// unmeasurable value, or a value larger than the whole cache. A rejected
    /// write leaves any previous value under `key` untouched.
    pub fn set(&mut self, key: &str, value: V, ttl: Option<Duration>) -> bool {
        let now = self.clock.now_ms();
        let ttl = ttl
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or(self.config.default_ttl);
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        let entry = match self.store.prepare(key, value, ttl_ms, now) {
            Ok(entry) => entry,
            Err(Rejection::InvalidKey) => {
                debug!("Rejected set with invalid key");
                return false;
            }
            Err(rejection) => {
                debug!("Rejected set for key '{}': {}", key, rejection);
                return false;
            }
        };

        self.make_room(key, entry.size_bytes);
        self.store.insert(entry);
        true
    }

    // == Make Room ==
    /// Removes entries until an entry of `incoming` bytes fits under `key`.
    ///
    /// Expired entries go first and are counted as expirations; live entries
    /// are then evicted one victim at a time, never `key` itself.
    fn make_room(&mut self, key: &str, incoming: u64) {
        if !self.needs_room(key, incoming) {
            return;
        }

        self.purge_expired();

        while self.needs_room(key, incoming) {
            let Some(victim) =
                policy::select_victim(self.store.all(), self.config.strategy, Some(key))
                    .map(str::to_string)
            else {
                break;
            };

            if let Some(evicted) = self.store.remove(&victim) {
                self.stats.record_eviction();
                debug!(
                    "Evicted '{}' ({} bytes) under {}",
                    victim, evicted.size_bytes, self.config.strategy
                );
            }
        }
    }

    fn needs_room(&self, key: &str, incoming: u64) -> bool {
        let replaced = self.store.size_of(key);
        let count_after = self.store.len() + usize::from(replaced.is_none());
        let memory_after = self.store.total_memory() - replaced.unwrap_or(0) + incoming;

        count_after > self.config.max_entries || memory_after > self.config.max_size
    }

    // == Contains ==
    /// Whether `key` holds a live entry. Read-only: no hit, miss, or touch.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        is_valid_key(key)
            && self
                .store
                .get(key)
                .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Delete ==
    /// Removes an entry by key, returning whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        is_valid_key(key) && self.store.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry and resets all counters.
    pub fn clear(&mut self) {
        self.store.clear();
        self.stats.reset();
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired = self.store.expired_keys(now);
        let count = expired.len();

        for key in expired {
            self.store.remove(&key);
        }

        self.stats.record_expirations(count);
        count
    }

    // == Stats ==
    /// Returns a snapshot of counters and current usage.
    ///
    /// The gauges cover live entries only; expired entries still waiting for
    /// the sweep are not counted.
    pub fn stats(&self) -> CacheStats {
        self.stats_at(self.clock.now_ms())
    }

    fn stats_at(&self, now: u64) -> CacheStats {
        let (entry_count, total_memory) = self
            .store
            .all()
            .filter(|entry| !entry.is_expired(now))
            .fold((0usize, 0u64), |(count, memory), entry| {
                (count + 1, memory + entry.size_bytes)
            });

        let mut stats = self.stats.clone();
        stats.entry_count = entry_count;
        stats.total_memory = total_memory;
        stats
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }
}

impl<V: Clone> CacheEngine<V> {
    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. Expired entries are
    /// removed on the spot and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if !is_valid_key(key) {
            self.stats.record_miss();
            return None;
        }

        let now = self.clock.now_ms();
        let expired = match self.store.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            self.store.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            debug!("Key '{}' expired on read", key);
            return None;
        }

        let value = self.store.touch(key, now).cloned();
        self.stats.record_hit();
        value
    }

    // == Detailed Info ==
    /// Stats plus a view of every live entry, ordered by key.
    pub fn detailed_info(&self) -> DetailedInfo<V> {
        let now = self.clock.now_ms();
        let mut entries: Vec<EntryInfo<V>> = self
            .store
            .all()
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| EntryInfo {
                key: entry.key.clone(),
                value: entry.value.clone(),
                age_ms: entry.age_ms(now),
                last_accessed_ms: entry.idle_ms(now),
                access_count: entry.access_count,
                size_bytes: entry.size_bytes,
                ttl_remaining_ms: entry.ttl_remaining_ms(now),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        DetailedInfo {
            stats: self.stats_at(now),
            entries,
        }
    }
}

impl<V> fmt::Debug for CacheEngine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEngine")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}
