//! Configuration Module
//!
//! Raw cache configuration as supplied by callers or the environment, its
//! validated form, and the server configuration for the diagnostics binary.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::cache::EvictionStrategy;

// == Defaults ==
/// Default aggregate size ceiling (50 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 50 * 1024 * 1024;
/// Default entry count ceiling
pub const DEFAULT_MAX_ENTRIES: usize = 1000;
/// Default time-to-live (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
/// Default expiry sweep interval
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

// == Cache Config ==
/// Cache configuration as supplied, possibly invalid.
///
/// Every field is optional. Numbers are signed so that nonsense like a
/// negative size can be represented and replaced; [`CacheConfig::resolve`]
/// never fails.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Aggregate size ceiling in bytes
    pub max_size: Option<i64>,
    /// Entry count ceiling
    pub max_entries: Option<i64>,
    /// Strategy name, e.g. `"LRU"` or `"SIZE_BASED"`
    pub eviction_strategy: Option<String>,
    /// Default time-to-live in milliseconds
    pub default_ttl: Option<i64>,
    /// Expiry sweep interval in milliseconds
    pub cleanup_interval: Option<i64>,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_size(mut self, bytes: i64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    pub fn max_entries(mut self, entries: i64) -> Self {
        self.max_entries = Some(entries);
        self
    }

    pub fn eviction_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.eviction_strategy = Some(strategy.into());
        self
    }

    pub fn strategy(self, strategy: EvictionStrategy) -> Self {
        self.eviction_strategy(strategy.as_str())
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(duration_to_ms(ttl));
        self
    }

    pub fn default_ttl_ms(mut self, ms: i64) -> Self {
        self.default_ttl = Some(ms);
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(duration_to_ms(interval));
        self
    }

    // == Resolve ==
    /// Replaces every missing or invalid value with its default.
    ///
    /// Non-positive numbers and unknown strategy names are invalid; each
    /// substitution is logged.
    pub fn resolve(&self) -> ResolvedConfig {
        let max_size = positive_or("max_size", self.max_size, DEFAULT_MAX_SIZE);
        let max_entries = positive_or("max_entries", self.max_entries, DEFAULT_MAX_ENTRIES as u64);
        let default_ttl_ms =
            positive_or("default_ttl", self.default_ttl, DEFAULT_TTL.as_millis() as u64);
        let cleanup_interval_ms = positive_or(
            "cleanup_interval",
            self.cleanup_interval,
            DEFAULT_CLEANUP_INTERVAL.as_millis() as u64,
        );

        let strategy = match self.eviction_strategy.as_deref() {
            None => EvictionStrategy::default(),
            Some(name) => name.parse().unwrap_or_else(|err| {
                warn!("{}, falling back to {}", err, EvictionStrategy::default());
                EvictionStrategy::default()
            }),
        };

        ResolvedConfig {
            max_size,
            max_entries: usize::try_from(max_entries).unwrap_or(usize::MAX),
            strategy,
            default_ttl: Duration::from_millis(default_ttl_ms),
            cleanup_interval: Duration::from_millis(cleanup_interval_ms),
        }
    }
}

fn positive_or(name: &str, value: Option<i64>, default: u64) -> u64 {
    match value {
        None => default,
        Some(v) if v > 0 => v as u64,
        Some(v) => {
            warn!("Invalid {} ({}), using default {}", name, v, default);
            default
        }
    }
}

fn duration_to_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

// == Resolved Config ==
/// Validated, immutable cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Aggregate size ceiling in bytes
    pub max_size: u64,
    /// Entry count ceiling
    pub max_entries: usize,
    pub strategy: EvictionStrategy,
    pub default_ttl: Duration,
    pub cleanup_interval: Duration,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        CacheConfig::default().resolve()
    }
}

// == Server Config ==
/// Diagnostics server configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache settings, validated when the cache is built
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_MAX_SIZE` - Aggregate size ceiling in bytes
    /// - `CACHE_MAX_ENTRIES` - Entry count ceiling
    /// - `CACHE_EVICTION_STRATEGY` - One of LRU, LFU, TTL, SIZE_BASED, HYBRID
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Expiry sweep interval in milliseconds
    ///
    /// Unparsable values are ignored and the cache default applies.
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cache: CacheConfig {
                max_size: env_i64("CACHE_MAX_SIZE"),
                max_entries: env_i64("CACHE_MAX_ENTRIES"),
                eviction_strategy: env::var("CACHE_EVICTION_STRATEGY").ok(),
                default_ttl: env_i64("CACHE_DEFAULT_TTL_MS"),
                cleanup_interval: env_i64("CACHE_CLEANUP_INTERVAL_MS"),
            },
        }
    }
}

fn env_i64(name: &str) -> Option<i64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache: CacheConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let resolved = CacheConfig::default().resolve();
        assert_eq!(resolved.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(resolved.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(resolved.strategy, EvictionStrategy::Lru);
        assert_eq!(resolved.default_ttl, DEFAULT_TTL);
        assert_eq!(resolved.cleanup_interval, DEFAULT_CLEANUP_INTERVAL);
    }

    #[test]
    fn test_resolve_keeps_valid_values() {
        let resolved = CacheConfig::new()
            .max_size(2048)
            .max_entries(10)
            .strategy(EvictionStrategy::Hybrid)
            .default_ttl(Duration::from_secs(5))
            .cleanup_interval(Duration::from_millis(250))
            .resolve();

        assert_eq!(resolved.max_size, 2048);
        assert_eq!(resolved.max_entries, 10);
        assert_eq!(resolved.strategy, EvictionStrategy::Hybrid);
        assert_eq!(resolved.default_ttl, Duration::from_secs(5));
        assert_eq!(resolved.cleanup_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_resolve_replaces_invalid_values() {
        let resolved = CacheConfig::new()
            .max_size(-1)
            .max_entries(-50)
            .eviction_strategy("MOST_RECENT")
            .default_ttl_ms(0)
            .resolve();

        assert_eq!(resolved.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(resolved.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(resolved.strategy, EvictionStrategy::Lru);
        assert_eq!(resolved.default_ttl, DEFAULT_TTL);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"max_entries": 5, "eviction_strategy": "lfu"}"#).unwrap();
        let resolved = config.resolve();

        assert_eq!(resolved.max_entries, 5);
        assert_eq!(resolved.strategy, EvictionStrategy::Lfu);
        assert_eq!(resolved.max_size, DEFAULT_MAX_SIZE);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert!(config.cache.max_entries.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("CACHE_MAX_SIZE");
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CACHE_EVICTION_STRATEGY");
        env::remove_var("CACHE_DEFAULT_TTL_MS");
        env::remove_var("CACHE_CLEANUP_INTERVAL_MS");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache.resolve(), ResolvedConfig::default());
    }
}
