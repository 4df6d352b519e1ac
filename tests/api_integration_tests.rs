//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chat_cache::{create_router, AppState, Cache, CacheConfig, EvictionStrategy, MockClock};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn test_cache(config: CacheConfig, clock: MockClock) -> Cache<Value> {
    Cache::builder(config)
        .clock(clock)
        .without_cleanup()
        .build()
}

fn create_test_app() -> Router {
    create_router(AppState::new(test_cache(
        CacheConfig::new().max_entries(100),
        MockClock::new(),
    )))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/set",
        Some(r#"{"key":"test_key","value":"test_value"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stored"], true);
    assert_eq!(json["key"], "test_key");
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_structured_value() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/set",
        Some(r#"{"key":"reply","value":{"role":"assistant","tokens":[1,2,3]}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "GET", "/get/reply", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"]["role"], "assistant");
    assert_eq!(json["value"]["tokens"][2], 3);
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/set", Some(r#"{"key":"","value":"v"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Invalid request"));
}

#[tokio::test]
async fn test_set_endpoint_oversized_value() {
    let cache = test_cache(CacheConfig::new().max_size(64), MockClock::new());
    let app = create_router(AppState::new(cache.clone()));

    let body = format!(r#"{{"key":"big","value":"{}"}}"#, "x".repeat(100));
    let (status, json) = send(&app, "PUT", "/set", Some(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stored"], false);
    assert_eq!(json["key"], "big");
    assert!(cache.is_empty());

    let (status, _) = send(&app, "GET", "/get/big", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/get/missing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_get_endpoint_after_ttl_expiry() {
    let clock = MockClock::new();
    let app = create_router(AppState::new(test_cache(CacheConfig::new(), clock.clone())));

    let (status, _) = send(
        &app,
        "PUT",
        "/set",
        Some(r#"{"key":"short","value":"lived","ttl":1000}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/get/short", None).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::from_millis(1000));

    let (status, _) = send(&app, "GET", "/get/short", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["expirations"], 1);
    assert_eq!(stats["entry_count"], 0);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"gone","value":1}"#)).await;

    let (status, json) = send(&app, "DELETE", "/del/gone", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], true);

    let (status, json) = send(&app, "DELETE", "/del/gone", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], false);
    assert_eq!(json["key"], "gone");
}

// == Stats / Info / Clear Tests ==

#[tokio::test]
async fn test_stats_endpoint_counts() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"a","value":"1"}"#)).await;
    send(&app, "GET", "/get/a", None).await;
    send(&app, "GET", "/get/a", None).await;
    send(&app, "GET", "/get/b", None).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"], 2);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["entry_count"], 1);
    assert_eq!(json["max_entries"], 100);
    assert_eq!(json["strategy"], "LRU");
    assert!((json["hit_rate"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_eviction_visible_in_stats() {
    let cache = test_cache(
        CacheConfig::new()
            .max_entries(2)
            .strategy(EvictionStrategy::Lfu),
        MockClock::new(),
    );
    let app = create_router(AppState::new(cache));

    send(&app, "PUT", "/set", Some(r#"{"key":"hot","value":1}"#)).await;
    send(&app, "PUT", "/set", Some(r#"{"key":"cold","value":2}"#)).await;
    send(&app, "GET", "/get/hot", None).await;
    send(&app, "PUT", "/set", Some(r#"{"key":"new","value":3}"#)).await;

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["evictions"], 1);
    assert_eq!(stats["entry_count"], 2);

    let (status, _) = send(&app, "GET", "/get/cold", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/get/hot", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_info_endpoint_lists_entries() {
    let clock = MockClock::new();
    let app = create_router(AppState::new(test_cache(
        CacheConfig::new().default_ttl(Duration::from_secs(60)),
        clock.clone(),
    )));

    send(&app, "PUT", "/set", Some(r#"{"key":"b","value":"x"}"#)).await;
    send(&app, "PUT", "/set", Some(r#"{"key":"a","value":"y"}"#)).await;
    clock.advance(Duration::from_secs(10));
    send(&app, "GET", "/get/a", None).await;

    let (status, json) = send(&app, "GET", "/info", None).await;
    assert_eq!(status, StatusCode::OK);

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["key"], "a");
    assert_eq!(entries[0]["access_count"], 1);
    assert_eq!(entries[0]["age_ms"], 10_000);
    assert_eq!(entries[0]["ttl_remaining_ms"], 50_000);
    assert_eq!(entries[1]["key"], "b");
    assert_eq!(json["stats"]["entry_count"], 2);
}

#[tokio::test]
async fn test_clear_endpoint_resets() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(r#"{"key":"a","value":"1"}"#)).await;
    send(&app, "GET", "/get/a", None).await;
    send(&app, "GET", "/get/zz", None).await;

    let (status, json) = send(&app, "POST", "/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["entry_count"], 0);
    assert_eq!(json["total_memory"], 0);
    assert_eq!(json["hits"], 0);
    assert_eq!(json["misses"], 0);

    let (status, _) = send(&app, "GET", "/get/a", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Strategies / Health Tests ==

#[tokio::test]
async fn test_strategies_endpoint() {
    let cache = test_cache(
        CacheConfig::new().eviction_strategy("hybrid"),
        MockClock::new(),
    );
    let app = create_router(AppState::new(cache));

    let (status, json) = send(&app, "GET", "/strategies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active"], "HYBRID");

    let names: Vec<&str> = json["strategies"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(names, vec!["LRU", "LFU", "TTL", "SIZE_BASED", "HYBRID"]);
}

#[tokio::test]
async fn test_unknown_strategy_falls_back() {
    let cache = test_cache(
        CacheConfig::new().eviction_strategy("FIFO"),
        MockClock::new(),
    );
    let app = create_router(AppState::new(cache));

    let (_, json) = send(&app, "GET", "/strategies", None).await;
    assert_eq!(json["active"], "LRU");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}
