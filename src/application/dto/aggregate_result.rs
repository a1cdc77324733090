// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::document::ConfigDocument;
use crate::domain::models::source::{SourceRecord, SourceStatus};

/// 结果中的源摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub id: String,
    pub name: String,
    pub url: String,
    pub priority: u32,
    pub status: SourceStatus,
}

impl From<&SourceRecord> for SourceSummary {
    fn from(source: &SourceRecord) -> Self {
        Self {
            id: source.id.clone(),
            name: source.name.clone(),
            url: source.url.clone(),
            priority: source.priority,
            status: source.status,
        }
    }
}

/// 聚合结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// 日期形式的版本号（YYYY-MM-DD）
    pub version: String,
    /// 过滤并按优先级排序后的源
    pub sources: Vec<SourceSummary>,
    pub total: usize,
    pub healthy_sources: usize,
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "cacheTTL")]
    pub cache_ttl: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_document: Option<ConfigDocument>,
}
