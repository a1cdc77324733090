// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::source::{SourceRecord, StatusUpdate};

/// 源注册表错误类型
#[derive(Error, Debug)]
pub enum RegistryError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 源列表格式错误
    #[error("Invalid source list: {0}")]
    Parse(#[from] serde_json::Error),
    /// 未知的源
    #[error("Unknown source: {0}")]
    UnknownSource(String),
}

/// 源注册表特质
///
/// 每次聚合读取一次源列表；解析结果的状态由注册表写回
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    /// 加载全部源，保持配置中的顺序
    async fn load(&self) -> Result<Vec<SourceRecord>, RegistryError>;

    /// 记录一次解析尝试的状态
    async fn record_status(&self, source_id: &str, update: StatusUpdate)
        -> Result<(), RegistryError>;
}
