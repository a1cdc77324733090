// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Query},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::application::dto::aggregate_options::AggregateOptions;
use crate::application::use_cases::aggregate_config::AggregateConfigUseCase;
use crate::presentation::errors::AppError;

/// `GET /api/config` 的查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigQuery {
    /// 逗号分隔的包含标签
    pub tags: Option<String>,
    /// 逗号分隔的排除标签
    pub exclude_tags: Option<String>,
    pub min_priority: Option<u32>,
    pub exclude_failed: Option<bool>,
    pub max_sources: Option<usize>,
    pub include_content: Option<bool>,
    pub enable_recursive: Option<bool>,
    pub max_depth: Option<u32>,
}

fn split_tags(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

impl ConfigQuery {
    pub fn into_options(self) -> AggregateOptions {
        let defaults = AggregateOptions::default();
        AggregateOptions {
            include_tags: split_tags(self.tags.as_deref()),
            exclude_tags: split_tags(self.exclude_tags.as_deref()),
            min_priority: self.min_priority,
            exclude_failed: self.exclude_failed.unwrap_or(defaults.exclude_failed),
            max_sources: self.max_sources,
            include_content: self.include_content.unwrap_or(defaults.include_content),
            enable_recursive: self.enable_recursive.unwrap_or(defaults.enable_recursive),
            max_depth_override: self.max_depth,
        }
    }
}

/// 获取聚合配置
pub async fn get_config(
    Extension(use_case): Extension<Arc<AggregateConfigUseCase>>,
    Query(query): Query<ConfigQuery>,
) -> Result<impl IntoResponse, AppError> {
    let result = use_case.execute(query.into_options()).await?;
    Ok((
        [(header::CACHE_CONTROL, "public, max-age=900")],
        Json(result),
    ))
}
