// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::source::SourceStatus;
use crate::domain::repositories::source_registry::{RegistryError, SourceRegistry};
use crate::domain::services::health_scorer::HealthScorer;
use crate::domain::services::resolver::{RecursionOverrides, SourceResolver};

/// 单个源的检查结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub source_id: String,
    pub source_name: String,
    pub status: SourceStatus,
    pub response_time_ms: u64,
    pub last_checked: DateTime<Utc>,
    /// 0-1 的质量分
    pub score: f64,
}

/// 系统健康报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealthReport {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    /// 失败与超时的合计
    pub failed: usize,
    pub last_checked: DateTime<Utc>,
    pub sources: Vec<HealthCheckResult>,
}

/// 健康检查用例
///
/// 只探测根节点，不展开子源
pub struct HealthCheckUseCase {
    registry: Arc<dyn SourceRegistry>,
    resolver: SourceResolver,
    scorer: HealthScorer,
    batch_size: usize,
}

impl HealthCheckUseCase {
    pub fn new(registry: Arc<dyn SourceRegistry>, resolver: SourceResolver, batch_size: usize) -> Self {
        Self {
            registry,
            resolver,
            scorer: HealthScorer::new(),
            batch_size: batch_size.max(1),
        }
    }

    pub async fn check_all_sources(&self) -> Result<SystemHealthReport, RegistryError> {
        let mut sources = self.registry.load().await?;
        let mut results = Vec::with_capacity(sources.len());

        for batch in sources.chunks_mut(self.batch_size) {
            let resolutions = join_all(
                batch
                    .iter()
                    .map(|source| self.resolver.resolve_source(source, RecursionOverrides::root_only())),
            )
            .await;

            for (source, resolution) in batch.iter_mut().zip(resolutions) {
                let update = resolution.status_update();
                if let Err(e) = self.registry.record_status(&source.id, update.clone()).await {
                    warn!(source_id = %source.id, "Failed to record source status: {}", e);
                }
                source.apply_status(&update);
                results.push(HealthCheckResult {
                    source_id: source.id.clone(),
                    source_name: source.name.clone(),
                    status: source.status,
                    response_time_ms: source.response_time_ms,
                    last_checked: update.checked_at,
                    score: self.scorer.score(source),
                });
            }
        }

        let count = |wanted: &[SourceStatus]| {
            results
                .iter()
                .filter(|r| wanted.contains(&r.status))
                .count()
        };
        let report = SystemHealthReport {
            total: results.len(),
            healthy: count(&[SourceStatus::Healthy]),
            degraded: count(&[SourceStatus::Degraded]),
            failed: count(&[SourceStatus::Failed, SourceStatus::Timeout]),
            last_checked: Utc::now(),
            sources: results,
        };
        info!(
            total = report.total,
            healthy = report.healthy,
            degraded = report.degraded,
            failed = report.failed,
            "Health check completed"
        );
        Ok(report)
    }
}
