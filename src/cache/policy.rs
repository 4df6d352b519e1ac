//! Eviction Policy Module
//!
//! Chooses which entry to remove when an insert would exceed capacity.
//! Every strategy is a pure ordering over entry metadata; the entry that
//! sorts first is the victim.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;

// == Eviction Strategy ==
/// Selectable eviction policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvictionStrategy {
    /// Least recently used
    #[default]
    Lru,
    /// Least frequently used
    Lfu,
    /// Soonest to expire
    Ttl,
    /// Largest entry first
    SizeBased,
    /// Weighted recency, frequency and size
    Hybrid,
}

impl EvictionStrategy {
    /// Every valid strategy, for callers selecting one programmatically.
    pub const ALL: [EvictionStrategy; 5] = [
        EvictionStrategy::Lru,
        EvictionStrategy::Lfu,
        EvictionStrategy::Ttl,
        EvictionStrategy::SizeBased,
        EvictionStrategy::Hybrid,
    ];

    /// Canonical name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionStrategy::Lru => "LRU",
            EvictionStrategy::Lfu => "LFU",
            EvictionStrategy::Ttl => "TTL",
            EvictionStrategy::SizeBased => "SIZE_BASED",
            EvictionStrategy::Hybrid => "HYBRID",
        }
    }

    /// Canonical names of all strategies.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(EvictionStrategy::as_str).collect()
    }

    /// Parses a strategy name, falling back to `Lru` for anything unknown.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a strategy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown eviction strategy '{}'", self.0)
    }
}

impl std::error::Error for UnknownStrategy {}

impl FromStr for EvictionStrategy {
    type Err = UnknownStrategy;

    /// Case-insensitive; `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        EvictionStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

// == Victim Selection ==
/// Picks the entry to evict under `strategy`, skipping `exclude`.
///
/// Returns `None` when there is no candidate. Ties that survive the
/// strategy's own tie-breakers are settled by key order.
pub fn select_victim<'a, V: 'a>(
    entries: impl IntoIterator<Item = &'a CacheEntry<V>>,
    strategy: EvictionStrategy,
    exclude: Option<&str>,
) -> Option<&'a str> {
    let candidates: Vec<&CacheEntry<V>> = entries
        .into_iter()
        .filter(|entry| Some(entry.key.as_str()) != exclude)
        .collect();

    let victim = match strategy {
        EvictionStrategy::Lru => min_by_order(candidates, lru_order),
        EvictionStrategy::Lfu => min_by_order(candidates, lfu_order),
        EvictionStrategy::Ttl => min_by_order(candidates, ttl_order),
        EvictionStrategy::SizeBased => min_by_order(candidates, size_order),
        EvictionStrategy::Hybrid => hybrid_victim(candidates),
    };

    victim.map(|entry| entry.key.as_str())
}

fn min_by_order<'a, V>(
    candidates: Vec<&'a CacheEntry<V>>,
    order: fn(&CacheEntry<V>, &CacheEntry<V>) -> Ordering,
) -> Option<&'a CacheEntry<V>> {
    candidates
        .into_iter()
        .min_by(|a, b| order(a, b).then_with(|| a.key.cmp(&b.key)))
}

/// Oldest `last_accessed_at` first, then oldest `created_at`.
pub fn lru_order<V>(a: &CacheEntry<V>, b: &CacheEntry<V>) -> Ordering {
    a.last_accessed_at
        .cmp(&b.last_accessed_at)
        .then(a.created_at.cmp(&b.created_at))
}

/// Fewest accesses first, then oldest `last_accessed_at`.
pub fn lfu_order<V>(a: &CacheEntry<V>, b: &CacheEntry<V>) -> Ordering {
    a.access_count
        .cmp(&b.access_count)
        .then(a.last_accessed_at.cmp(&b.last_accessed_at))
}

/// Nearest `expires_at` first, then oldest `created_at`.
pub fn ttl_order<V>(a: &CacheEntry<V>, b: &CacheEntry<V>) -> Ordering {
    a.expires_at()
        .cmp(&b.expires_at())
        .then(a.created_at.cmp(&b.created_at))
}

/// Largest `size_bytes` first, then oldest `created_at`.
pub fn size_order<V>(a: &CacheEntry<V>, b: &CacheEntry<V>) -> Ordering {
    b.size_bytes
        .cmp(&a.size_bytes)
        .then(a.created_at.cmp(&b.created_at))
}

// == Hybrid Scoring ==
const RECENCY_WEIGHT: f64 = 1.0 / 3.0;
const FREQUENCY_WEIGHT: f64 = 1.0 / 3.0;
const SIZE_WEIGHT: f64 = 1.0 / 3.0;

/// Retention scores for `candidates`, in the same order.
///
/// Each component is normalized to `[0, 1]` over the candidate set, where 1
/// means "most worth keeping": most recent, most read, smallest.
pub fn hybrid_scores<V>(candidates: &[&CacheEntry<V>]) -> Vec<f64> {
    let Some(first) = candidates.first() else {
        return Vec::new();
    };

    let (mut oldest, mut newest) = (first.last_accessed_at, first.last_accessed_at);
    let (mut max_count, mut max_size) = (0u64, 0u64);
    for entry in candidates {
        oldest = oldest.min(entry.last_accessed_at);
        newest = newest.max(entry.last_accessed_at);
        max_count = max_count.max(entry.access_count);
        max_size = max_size.max(entry.size_bytes);
    }

    candidates
        .iter()
        .map(|entry| {
            let recency = if newest > oldest {
                (entry.last_accessed_at - oldest) as f64 / (newest - oldest) as f64
            } else {
                1.0
            };
            let frequency = if max_count > 0 {
                entry.access_count as f64 / max_count as f64
            } else {
                0.0
            };
            let smallness = if max_size > 0 {
                1.0 - entry.size_bytes as f64 / max_size as f64
            } else {
                1.0
            };
            RECENCY_WEIGHT * recency + FREQUENCY_WEIGHT * frequency + SIZE_WEIGHT * smallness
        })
        .collect()
}

fn hybrid_victim<V>(candidates: Vec<&CacheEntry<V>>) -> Option<&CacheEntry<V>> {
    let scores = hybrid_scores(&candidates);
    candidates
        .into_iter()
        .zip(scores)
        .min_by(|(a, score_a), (b, score_b)| {
            score_a
                .total_cmp(score_b)
                .then(a.created_at.cmp(&b.created_at))
                .then_with(|| a.key.cmp(&b.key))
        })
        .map(|(entry, _)| entry)
}
