// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use validator::Validate;

/// 源健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    /// 尚未检查
    #[default]
    Unknown,
    /// 健康
    Healthy,
    /// 降级（可解析但内容不完整）
    Degraded,
    /// 失败
    Failed,
    /// 超时
    Timeout,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Unknown => "unknown",
            SourceStatus::Healthy => "healthy",
            SourceStatus::Degraded => "degraded",
            SourceStatus::Failed => "failed",
            SourceStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次解析尝试后的状态更新
///
/// 由解析器产出，由源注册表负责写回
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: SourceStatus,
    pub response_time_ms: u64,
    pub checked_at: DateTime<Utc>,
}

fn default_priority() -> u32 {
    50
}

fn default_enabled() -> bool {
    true
}

/// 配置源记录
///
/// 静态字段来自源列表文件，`status`/`last_checked`/`response_time_ms`
/// 在每次解析尝试后更新
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    #[validate(length(min = 1, message = "id cannot be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: String,
    #[validate(url(message = "url is invalid"))]
    pub url: String,
    /// 优先级（0-100，越大越优先）
    #[serde(default = "default_priority")]
    #[validate(range(max = 100))]
    pub priority: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub is_recursive: bool,
    /// 最大递归深度；`0` 禁用递归，未设置时使用默认深度
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub status: SourceStatus,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(default)]
    pub response_time_ms: u64,
}

impl SourceRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            priority: default_priority(),
            tags: BTreeSet::new(),
            enabled: true,
            is_recursive: false,
            max_depth: None,
            status: SourceStatus::Unknown,
            last_checked: None,
            response_time_ms: 0,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn recursive(mut self, max_depth: Option<u32>) -> Self {
        self.is_recursive = true;
        self.max_depth = max_depth;
        self
    }

    pub fn has_any_tag<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        tags.into_iter().any(|tag| self.tags.contains(tag))
    }

    pub fn apply_status(&mut self, update: &StatusUpdate) {
        self.status = update.status;
        self.response_time_ms = update.response_time_ms;
        self.last_checked = Some(update.checked_at);
    }
}
