// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::infrastructure::cache::cache_manager::CacheManager;

/// 缓存统计
pub async fn get_stats(Extension(cache): Extension<Arc<CacheManager>>) -> Json<Value> {
    Json(json!({
        "cache": cache.stats(),
        "timestamp": Utc::now(),
    }))
}
