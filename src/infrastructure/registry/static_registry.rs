// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::models::source::{SourceRecord, StatusUpdate};
use crate::domain::repositories::source_registry::{RegistryError, SourceRegistry};

/// 内存中的源注册表
pub struct StaticSourceRegistry {
    sources: RwLock<Vec<SourceRecord>>,
}

impl StaticSourceRegistry {
    pub fn new(sources: Vec<SourceRecord>) -> Self {
        Self {
            sources: RwLock::new(sources),
        }
    }

    /// 当前记录的快照
    pub fn snapshot(&self) -> Vec<SourceRecord> {
        self.sources.read().clone()
    }
}

#[async_trait]
impl SourceRegistry for StaticSourceRegistry {
    async fn load(&self) -> Result<Vec<SourceRecord>, RegistryError> {
        Ok(self.snapshot())
    }

    async fn record_status(
        &self,
        source_id: &str,
        update: StatusUpdate,
    ) -> Result<(), RegistryError> {
        let mut sources = self.sources.write();
        let record = sources
            .iter_mut()
            .find(|r| r.id == source_id)
            .ok_or_else(|| RegistryError::UnknownSource(source_id.to_string()))?;
        record.apply_status(&update);
        Ok(())
    }
}
