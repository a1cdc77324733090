// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};
use validator::Validate;

use crate::domain::models::source::{SourceRecord, StatusUpdate};
use crate::domain::repositories::source_registry::{RegistryError, SourceRegistry};

/// 基于JSON文件的源注册表
///
/// 每次 `load` 都重新读取文件，无效记录被跳过；
/// 解析状态保存在内存中，加载时覆盖到对应记录上
pub struct FileSourceRegistry {
    path: PathBuf,
    statuses: DashMap<String, StatusUpdate>,
}

impl FileSourceRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            statuses: DashMap::new(),
        }
    }
}

/// 解析源列表文本，跳过无法反序列化或未通过校验的记录
pub fn parse_source_list(text: &str) -> Result<Vec<SourceRecord>, RegistryError> {
    let items: Vec<Value> = serde_json::from_str(text)?;
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let record: SourceRecord = match serde_json::from_value(item) {
            Ok(record) => record,
            Err(e) => {
                warn!(index, "Skipping unreadable source record: {}", e);
                continue;
            }
        };
        if let Err(e) = record.validate() {
            warn!(index, source_id = %record.id, "Skipping invalid source record: {}", e);
            continue;
        }
        if records.iter().any(|r: &SourceRecord| r.id == record.id) {
            warn!(index, source_id = %record.id, "Skipping duplicate source id");
            continue;
        }
        records.push(record);
    }

    Ok(records)
}

#[async_trait]
impl SourceRegistry for FileSourceRegistry {
    async fn load(&self) -> Result<Vec<SourceRecord>, RegistryError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let mut records = parse_source_list(&text)?;
        for record in records.iter_mut() {
            if let Some(update) = self.statuses.get(&record.id) {
                record.apply_status(&update);
            }
        }
        debug!(path = %self.path.display(), sources = records.len(), "Source list loaded");
        Ok(records)
    }

    async fn record_status(
        &self,
        source_id: &str,
        update: StatusUpdate,
    ) -> Result<(), RegistryError> {
        self.statuses.insert(source_id.to_string(), update);
        Ok(())
    }
}
