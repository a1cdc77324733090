// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::use_cases::aggregate_config::AggregateConfigUseCase;
use crate::application::use_cases::health_check::HealthCheckUseCase;
use crate::infrastructure::cache::cache_manager::CacheManager;
use crate::presentation::handlers::{config_handler, health_handler, stats_handler};

/// 创建应用路由
///
/// 用例与缓存管理器通过 `Extension` 注入处理器
pub fn routes(
    aggregate: Arc<AggregateConfigUseCase>,
    health: Arc<HealthCheckUseCase>,
    cache: Arc<CacheManager>,
) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/config", get(config_handler::get_config))
        .route("/api/health", get(health_handler::get_health))
        .route("/api/health/check", post(health_handler::trigger_check))
        .route("/api/stats", get(stats_handler::get_stats))
        .layer(Extension(aggregate))
        .layer(Extension(health))
        .layer(Extension(cache))
        .layer(TraceLayer::new_for_http())
}

/// 服务信息端点
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "config": "GET /api/config",
            "health": "GET /api/health",
            "healthCheck": "POST /api/health/check",
            "stats": "GET /api/stats",
        },
    }))
}
