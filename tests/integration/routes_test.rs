// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use tvbox_aggregator::application::use_cases::aggregate_config::{
    AggregateConfigUseCase, AggregatorConfig,
};
use tvbox_aggregator::application::use_cases::health_check::HealthCheckUseCase;
use tvbox_aggregator::infrastructure::cache::cache_manager::{CacheConfig, CacheManager};
use tvbox_aggregator::infrastructure::cache::memory_store::MemoryStore;
use tvbox_aggregator::infrastructure::registry::static_registry::StaticSourceRegistry;
use tvbox_aggregator::presentation::routes::routes;

use crate::helpers::{resolver, source, url, ScriptedFetcher};

fn app() -> (Router, Arc<ScriptedFetcher>) {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .json(&url("movie"), json!({"sites": [{"key": "m", "api": "movie"}]}))
            .json(&url("live"), json!({"lives": [{"name": "cctv", "url": "http://tv"}]})),
    );
    let registry = Arc::new(StaticSourceRegistry::new(vec![
        source("movie", &url("movie")).with_tags(["movie"]),
        source("live", &url("live")).with_tags(["live"]),
    ]));
    let cache = Arc::new(CacheManager::new(
        Arc::new(MemoryStore::new()),
        CacheConfig::default(),
    ));
    let aggregate = Arc::new(AggregateConfigUseCase::new(
        registry.clone(),
        resolver(&fetcher),
        cache.clone(),
        AggregatorConfig::default(),
    ));
    let health = Arc::new(HealthCheckUseCase::new(registry, resolver(&fetcher), 10));
    (routes(aggregate, health, cache), fetcher)
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cache_control, body)
}

#[tokio::test]
async fn index_lists_endpoints() {
    let (app, _) = app();

    let (status, _, body) = send(app, "GET", "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("tvbox-aggregator"));
    assert_eq!(body["endpoints"]["config"], json!("GET /api/config"));
}

#[tokio::test]
async fn config_endpoint_filters_by_tag() {
    let (app, _) = app();

    let (status, cache_control, body) = send(app, "GET", "/api/config?tags=movie").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("public, max-age=900"));
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["sources"][0]["id"], json!("movie"));
    assert_eq!(body["cacheTTL"], json!(3600));
    assert_eq!(body["mergedDocument"]["sites"][0]["key"], json!("m"));
}

#[tokio::test]
async fn config_endpoint_without_content() {
    let (app, fetcher) = app();

    let (status, _, body) = send(app, "GET", "/api/config?includeContent=false").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(2));
    assert!(body.get("mergedDocument").is_none());
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn config_endpoint_rejects_invalid_options() {
    let (app, _) = app();

    let (status, _, body) = send(app, "GET", "/api/config?maxSources=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Bad Request"));
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn health_endpoint_reports_all_sources() {
    let (app, _) = app();

    let (status, cache_control, body) = send(app, "GET", "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("public, max-age=300"));
    assert_eq!(body["total"], json!(2));
    assert_eq!(body["healthy"], json!(2));
    assert!(body["sources"][0]["score"].as_f64().is_some());
}

#[tokio::test]
async fn health_check_trigger_is_accepted() {
    let (app, _) = app();

    let (status, _, body) = send(app, "POST", "/api/health/check").await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], json!("pending"));
    assert!(body["taskId"].as_str().unwrap().starts_with("check-"));
}

#[tokio::test]
async fn stats_endpoint_exposes_cache_counters() {
    let (app, _) = app();

    let (status, _, body) = send(app, "GET", "/api/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cache"]["l1Size"], json!(0));
    assert!(body["timestamp"].as_str().is_some());
}
