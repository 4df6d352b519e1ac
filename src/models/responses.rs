//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Outcome message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Whether the value was stored; `false` when it exceeds the size limit
    pub stored: bool,
}

impl SetResponse {
    /// Creates a new SetResponse from the cache's answer
    pub fn new(key: impl Into<String>, stored: bool) -> Self {
        let key = key.into();
        let message = if stored {
            format!("Key '{}' set successfully", key)
        } else {
            format!("Value for key '{}' was not stored", key)
        };
        Self {
            message,
            key,
            stored,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Outcome message
    pub message: String,
    /// The key that was deleted
    pub key: String,
    pub deleted: bool,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse from the cache's answer
    pub fn new(key: impl Into<String>, deleted: bool) -> Self {
        let key = key.into();
        let message = if deleted {
            format!("Key '{}' deleted successfully", key)
        } else {
            format!("Key '{}' was not present", key)
        };
        Self {
            message,
            key,
            deleted,
        }
    }
}

/// Response body for the stats endpoints (GET /stats, POST /clear)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Counters, gauges and limits
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Eviction strategy in use
    pub strategy: String,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: CacheStats, strategy: impl Into<String>) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            stats,
            strategy: strategy.into(),
            hit_rate,
        }
    }
}

/// Response body for GET /strategies
#[derive(Debug, Clone, Serialize)]
pub struct StrategiesResponse {
    /// Every valid strategy name
    pub strategies: Vec<&'static str>,
    /// Strategy of the running cache
    pub active: &'static str,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("test_key", Value::from("test_value"));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("test_key"));
        assert!(json.contains("test_value"));
    }

    #[test]
    fn test_get_response_null_value() {
        let resp = GetResponse::new("k", Value::Null);
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(json["key"], "k");
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("my_key", true);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["stored"], true);
        assert!(json["message"].as_str().unwrap().contains("successfully"));
    }

    #[test]
    fn test_set_response_not_stored() {
        let json = serde_json::to_value(SetResponse::new("big", false)).unwrap();
        assert_eq!(json["stored"], false);
        assert_eq!(json["key"], "big");
        assert!(json["message"].as_str().unwrap().contains("not stored"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("deleted_key", true);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "deleted_key");
        assert_eq!(json["deleted"], true);

        let json = serde_json::to_value(DeleteResponse::new("missing", false)).unwrap();
        assert_eq!(json["deleted"], false);
    }

    #[test]
    fn test_stats_response_flattens_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            evictions: 5,
            entry_count: 100,
            ..CacheStats::new()
        };
        let resp = StatsResponse::new(stats, "LRU");
        assert!((resp.hit_rate - 0.8).abs() < 0.001);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["hits"], 80);
        assert_eq!(json["entry_count"], 100);
        assert_eq!(json["strategy"], "LRU");
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(CacheStats::new(), "LFU");
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
