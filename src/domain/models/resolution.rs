// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::models::document::ConfigDocument;
use crate::domain::models::source::{SourceStatus, StatusUpdate};

/// 解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// 网络错误或服务端错误
    #[error("Source unreachable: {url}: {reason}")]
    Unreachable { url: String, reason: String },
    /// 请求超时
    #[error("Timed out after {timeout_ms}ms: {url}")]
    Timeout { url: String, timeout_ms: u64 },
    /// 当前遍历路径上已访问过该URL
    #[error("Circular reference to {url} (path: {})", .path.join(" -> "))]
    CircularReference { url: String, path: Vec<String> },
    /// 超出最大深度
    #[error("Depth {depth} exceeds max depth {max_depth}: {url}")]
    DepthExceeded {
        url: String,
        depth: u32,
        max_depth: u32,
    },
    /// 内容无法解析为配置文档
    #[error("Malformed document at {url}: {reason}")]
    Malformed { url: String, reason: String },
}

impl ResolveError {
    /// 错误对应的源状态
    pub fn status(&self) -> SourceStatus {
        match self {
            ResolveError::Timeout { .. } => SourceStatus::Timeout,
            ResolveError::Malformed { .. } => SourceStatus::Degraded,
            ResolveError::Unreachable { .. }
            | ResolveError::CircularReference { .. }
            | ResolveError::DepthExceeded { .. } => SourceStatus::Failed,
        }
    }
}

/// 已解析的节点文档（可能已并入子源）
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    pub url: String,
    pub document: ConfigDocument,
    /// `Healthy` 或 `Degraded`
    pub status: SourceStatus,
    /// 成功并入的子源数量
    pub merged_children: usize,
}

/// 单个源的解析结果
///
/// 解析器不修改源记录，状态更新由调用方交给注册表
#[derive(Debug, Clone)]
pub struct SourceResolution {
    pub source_id: String,
    pub outcome: Result<ResolvedDocument, ResolveError>,
    pub status: SourceStatus,
    pub response_time_ms: u64,
    pub checked_at: DateTime<Utc>,
}

impl SourceResolution {
    pub fn status_update(&self) -> StatusUpdate {
        StatusUpdate {
            status: self.status,
            response_time_ms: self.response_time_ms,
            checked_at: self.checked_at,
        }
    }

    pub fn document(&self) -> Option<&ConfigDocument> {
        self.outcome.as_ref().ok().map(|resolved| &resolved.document)
    }

    pub fn into_document(self) -> Option<ConfigDocument> {
        self.outcome.ok().map(|resolved| resolved.document)
    }
}
