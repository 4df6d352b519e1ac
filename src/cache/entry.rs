//! Cache Entry Module
//!
//! Defines a single cache entry together with the metadata eviction and
//! expiry decisions are made from.

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// All timestamps are readings of the cache's [`Clock`](super::Clock) in
/// milliseconds.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Estimated size of the value in bytes
    pub size_bytes: u64,
    /// Insertion timestamp
    pub created_at: u64,
    /// Timestamp of the last successful read (equals `created_at` until read)
    pub last_accessed_at: u64,
    /// Number of successful reads
    pub access_count: u64,
    /// Effective time-to-live in milliseconds
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry stamped at `now` with zero accesses.
    pub fn new(key: String, value: V, size_bytes: u64, ttl_ms: u64, now: u64) -> Self {
        Self {
            key,
            value,
            size_bytes,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            ttl_ms,
        }
    }

    // == Expires At ==
    /// Fixed-origin expiry: `created_at + ttl_ms`. Reads do not extend it.
    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.ttl_ms)
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once `now >= expires_at`, so a TTL that has fully
    /// elapsed takes effect immediately.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at()
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at().saturating_sub(now)
    }

    /// Milliseconds since the entry was created.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Milliseconds since the entry was last read (or created).
    pub fn idle_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_accessed_at)
    }

    // == Touch ==
    /// Records a successful read at `now`.
    pub fn touch(&mut self, now: u64) {
        self.last_accessed_at = now;
        self.access_count = self.access_count.saturating_add(1);
    }
}
