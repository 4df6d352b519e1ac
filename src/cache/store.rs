//! Entry Store Module
//!
//! Authoritative key → entry mapping with aggregate size accounting.
//! Capacity decisions live in the engine; the store only refuses values
//! that could never fit.

use std::collections::HashMap;
use std::fmt;

use crate::cache::{is_valid_key, CacheEntry, SizeEstimator};

// == Rejection ==
/// Why a value was not admitted. Rejection is an ordinary outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Key was empty or longer than `MAX_KEY_LENGTH`
    InvalidKey,
    /// The value alone exceeds the aggregate size ceiling
    TooLarge { size_bytes: u64, max_size_bytes: u64 },
    /// The size estimator could not measure the value
    Unmeasurable,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvalidKey => write!(f, "invalid key"),
            Rejection::TooLarge {
                size_bytes,
                max_size_bytes,
            } => write!(
                f,
                "value of {} bytes exceeds cache size limit of {} bytes",
                size_bytes, max_size_bytes
            ),
            Rejection::Unmeasurable => write!(f, "value size could not be estimated"),
        }
    }
}

// == Entry Store ==
/// Key-value storage with per-entry and aggregate size tracking.
pub struct EntryStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Sum of `size_bytes` over all stored entries
    total_memory: u64,
    /// Aggregate size ceiling
    max_size_bytes: u64,
    /// Value size estimator
    estimator: Box<dyn SizeEstimator<V>>,
}

impl<V> EntryStore<V> {
    // == Constructor ==
    pub fn new(max_size_bytes: u64, estimator: Box<dyn SizeEstimator<V>>) -> Self {
        Self {
            entries: HashMap::new(),
            total_memory: 0,
            max_size_bytes,
            estimator,
        }
    }

    // == Prepare ==
    /// Builds an entry for `value`, measuring its size.
    ///
    /// Performs no mutation. Fails if the key is invalid, the value cannot be
    /// measured, or its size alone exceeds `max_size_bytes`.
    pub fn prepare(
        &self,
        key: &str,
        value: V,
        ttl_ms: u64,
        now: u64,
    ) -> Result<CacheEntry<V>, Rejection> {
        if !is_valid_key(key) {
            return Err(Rejection::InvalidKey);
        }

        let size_bytes = self
            .estimator
            .estimate(&value)
            .ok_or(Rejection::Unmeasurable)?;

        if size_bytes > self.max_size_bytes {
            return Err(Rejection::TooLarge {
                size_bytes,
                max_size_bytes: self.max_size_bytes,
            });
        }

        Ok(CacheEntry::new(key.to_string(), value, size_bytes, ttl_ms, now))
    }

    // == Insert ==
    /// Inserts a prepared entry, replacing any previous entry under its key.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        self.total_memory = self.total_memory.saturating_add(entry.size_bytes);
        let previous = self.entries.insert(entry.key.clone(), entry);
        if let Some(old) = &previous {
            self.total_memory = self.total_memory.saturating_sub(old.size_bytes);
        }
        previous
    }

    // == Get ==
    /// Read-only lookup. Does not record an access.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Touch ==
    /// Records a read of `key` at `now` and returns its value.
    pub fn touch(&mut self, key: &str, now: u64) -> Option<&V> {
        let entry = self.entries.get_mut(key)?;
        entry.touch(now);
        Some(&entry.value)
    }

    // == Remove ==
    /// Removes an entry, returning it if it existed.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let removed = self.entries.remove(key)?;
        self.total_memory = self.total_memory.saturating_sub(removed.size_bytes);
        Some(removed)
    }

    /// Returns the recorded size of `key`, if present.
    pub fn size_of(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.size_bytes)
    }

    /// Iterates over all stored entries, including expired-but-unswept ones.
    pub fn all(&self) -> impl Iterator<Item = &CacheEntry<V>> {
        self.entries.values()
    }

    /// Keys of every entry expired at `now`.
    pub fn expired_keys(&self, now: u64) -> Vec<String> {
        self.entries
            .values()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.key.clone())
            .collect()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_memory = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_memory(&self) -> u64 {
        self.total_memory
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }
}

impl<V> fmt::Debug for EntryStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryStore")
            .field("entries", &self.entries.len())
            .field("total_memory", &self.total_memory)
            .field("max_size_bytes", &self.max_size_bytes)
            .finish()
    }
}
