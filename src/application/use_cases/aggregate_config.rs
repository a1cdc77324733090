// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use chrono::Utc;
use futures::future::join_all;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationErrors};

use crate::application::dto::aggregate_options::AggregateOptions;
use crate::application::dto::aggregate_result::{AggregateResult, SourceSummary};
use crate::domain::models::document::ConfigDocument;
use crate::domain::models::source::{SourceRecord, SourceStatus};
use crate::domain::repositories::source_registry::{RegistryError, SourceRegistry};
use crate::domain::services::merge_engine::merge_sources;
use crate::domain::services::resolver::SourceResolver;
use crate::infrastructure::cache::cache_manager::CacheManager;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] ValidationErrors),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// 聚合配置
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// 每批并发解析的顶层源数量
    pub batch_size: usize,
    /// 结果写入缓存的TTL
    pub cache_ttl: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

/// 源过滤管道
///
/// 顺序固定：启用 → 排除失败 → 最低优先级 → 包含标签 → 排除标签 → 按优先级截取。
/// 返回按优先级降序排列的列表，同优先级保持注册顺序。
pub fn apply_filters(sources: Vec<SourceRecord>, options: &AggregateOptions) -> Vec<SourceRecord> {
    let mut filtered: Vec<SourceRecord> = sources
        .into_iter()
        .filter(|s| s.enabled)
        .filter(|s| !(options.exclude_failed && s.status == SourceStatus::Failed))
        .filter(|s| options.min_priority.is_none_or(|min| s.priority >= min))
        .filter(|s| options.include_tags.is_empty() || s.has_any_tag(&options.include_tags))
        .filter(|s| !s.has_any_tag(&options.exclude_tags))
        .collect();

    filtered.sort_by(|a, b| b.priority.cmp(&a.priority));
    if let Some(max) = options.max_sources {
        filtered.truncate(max);
    }
    filtered
}

/// 聚合配置用例
pub struct AggregateConfigUseCase {
    registry: Arc<dyn SourceRegistry>,
    resolver: SourceResolver,
    cache: Arc<CacheManager>,
    config: AggregatorConfig,
}

impl AggregateConfigUseCase {
    pub fn new(
        registry: Arc<dyn SourceRegistry>,
        resolver: SourceResolver,
        cache: Arc<CacheManager>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            cache,
            config,
        }
    }

    /// 执行聚合
    ///
    /// 只有选项无效或注册表无法加载时才返回错误；
    /// 单个源的失败只会让结果变少
    pub async fn execute(&self, options: AggregateOptions) -> Result<AggregateResult, AggregateError> {
        options.validate()?;

        let cache_key = options.cache_key();
        if let Some(cached) = self.cache.get_json::<AggregateResult>(&cache_key).await {
            counter!("tvbox_aggregations_total", "cache" => "hit").increment(1);
            debug!(cache_key = %cache_key, "Serving aggregate from cache");
            return Ok(cached);
        }
        counter!("tvbox_aggregations_total", "cache" => "miss").increment(1);

        let sources = self.registry.load().await?;
        let registered = sources.len();
        let mut selected = apply_filters(sources, &options);
        info!(
            registered,
            selected = selected.len(),
            include_content = options.include_content,
            "Aggregating sources"
        );

        let merged_document = if options.include_content {
            Some(self.resolve_all(&mut selected, &options).await)
        } else {
            None
        };

        let summaries: Vec<SourceSummary> = selected.iter().map(SourceSummary::from).collect();
        let now = Utc::now();
        let result = AggregateResult {
            version: now.format("%Y-%m-%d").to_string(),
            total: summaries.len(),
            healthy_sources: summaries
                .iter()
                .filter(|s| s.status == SourceStatus::Healthy)
                .count(),
            sources: summaries,
            generated_at: now,
            cache_ttl: self.config.cache_ttl.as_secs(),
            merged_document,
        };

        if let Err(e) = self
            .cache
            .set_json(&cache_key, &result, self.config.cache_ttl)
            .await
        {
            warn!(cache_key = %cache_key, "Failed to cache aggregate: {}", e);
        }

        Ok(result)
    }

    /// 分批解析并按优先级顺序做跨源合并
    ///
    /// 解析后的状态写回注册表，同时更新 `sources` 中的记录
    async fn resolve_all(
        &self,
        sources: &mut [SourceRecord],
        options: &AggregateOptions,
    ) -> ConfigDocument {
        let overrides = options.recursion_overrides();
        let batch_size = self.config.batch_size.max(1);
        let mut documents = Vec::new();

        for (index, batch) in sources.chunks_mut(batch_size).enumerate() {
            let resolutions = join_all(
                batch
                    .iter()
                    .map(|source| self.resolver.resolve_source(source, overrides)),
            )
            .await;

            for (source, resolution) in batch.iter_mut().zip(resolutions) {
                let update = resolution.status_update();
                if let Err(e) = self.registry.record_status(&source.id, update.clone()).await {
                    warn!(source_id = %source.id, "Failed to record source status: {}", e);
                }
                source.apply_status(&update);
                if let Some(document) = resolution.into_document() {
                    documents.push(document);
                }
            }
            debug!(batch = index, size = batch.len(), "Batch resolved");
        }

        info!(resolved = documents.len(), "Merging resolved documents");
        merge_sources(documents)
    }
}
