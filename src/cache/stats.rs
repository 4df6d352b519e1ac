//! Cache Statistics Module
//!
//! Tracks hit/miss/eviction/expiry counters and renders snapshots of the
//! cache contents for diagnostics.

use serde::Serialize;

// == Cache Stats ==
/// Counters and gauges describing the cache.
///
/// Counters are monotonic until the next `clear()`. Gauges (`total_memory`,
/// `entry_count`) and limits are filled in when a snapshot is taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of reads that found a live entry
    pub hits: u64,
    /// Number of reads that found nothing, an invalid key, or an expired entry
    pub misses: u64,
    /// Number of entries removed to restore a capacity limit
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
    /// Sum of estimated entry sizes in bytes
    pub total_memory: u64,
    /// Current number of entries
    pub entry_count: usize,
    /// Configured aggregate size ceiling in bytes
    pub max_size: u64,
    /// Configured entry count ceiling
    pub max_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Reset ==
    /// Zeroes the counters. Limits are kept.
    pub fn reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
        self.expirations = 0;
        self.total_memory = 0;
        self.entry_count = 0;
    }
}

// == Detailed Info ==
/// Per-entry diagnostic view, computed at call time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryInfo<V> {
    pub key: String,
    pub value: V,
    /// Milliseconds since insertion
    pub age_ms: u64,
    /// Milliseconds since the last read (or insertion)
    pub last_accessed_ms: u64,
    pub access_count: u64,
    pub size_bytes: u64,
    pub ttl_remaining_ms: u64,
}

/// Stats plus one [`EntryInfo`] per live entry, ordered by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedInfo<V> {
    pub stats: CacheStats,
    pub entries: Vec<EntryInfo<V>>,
}
