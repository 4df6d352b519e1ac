//! Cache Module
//!
//! In-memory caching with TTL expiration, pluggable eviction strategies
//! (LRU, LFU, TTL, size-based, hybrid), size accounting, and statistics.

mod clock;
mod engine;
mod entry;
mod facade;
pub mod policy;
mod size;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, MockClock, SystemClock};
pub use engine::CacheEngine;
pub use entry::CacheEntry;
pub use facade::{Cache, CacheBuilder};
pub use policy::{select_victim, EvictionStrategy, UnknownStrategy};
pub use size::{FnEstimator, JsonSizeEstimator, SizeEstimator};
pub use stats::{CacheStats, DetailedInfo, EntryInfo};
pub use store::{EntryStore, Rejection};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Whether `key` can be stored: non-empty and at most `MAX_KEY_LENGTH` bytes.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= MAX_KEY_LENGTH
}
