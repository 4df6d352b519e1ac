//! API Handlers
//!
//! HTTP request handlers exposing the cache facade for diagnostics.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{Cache, DetailedInfo, EvictionStrategy};
use crate::config::CacheConfig;
use crate::error::{ApiError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse,
    StrategiesResponse,
};

/// Application state shared across all handlers.
///
/// The cache handle is cheap to clone and locks internally.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Shared cache of JSON values
    pub cache: Cache<Value>,
}

impl AppState {
    /// Creates a new AppState with the given cache.
    pub fn new(cache: Cache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from cache configuration.
    ///
    /// Starts the cache's background TTL sweep.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Cache::new(config.clone()))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL in milliseconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl.map(Duration::from_millis);
    let stored = state.cache.set(&req.key, req.value, ttl);

    Ok(Json(SetResponse::new(req.key, stored)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| ApiError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache. `deleted` is `false` when the key was absent.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.cache.delete(&key);
    Json(DeleteResponse::new(key, deleted))
}

/// Handler for POST /clear
///
/// Empties the cache and resets its counters.
pub async fn clear_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    state.cache.clear();
    stats_handler(State(state)).await
}

/// Handler for GET /stats
///
/// Returns current cache statistics. Does not count as a cache access.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    Json(StatsResponse::new(stats, state.cache.strategy().as_str()))
}

/// Handler for GET /info
///
/// Returns stats plus a per-entry snapshot of the cache.
pub async fn info_handler(State(state): State<AppState>) -> Json<DetailedInfo<Value>> {
    Json(state.cache.detailed_info())
}

/// Handler for GET /strategies
pub async fn strategies_handler(State(state): State<AppState>) -> Json<StrategiesResponse> {
    Json(StrategiesResponse {
        strategies: EvictionStrategy::names(),
        active: state.cache.strategy().as_str(),
    })
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
