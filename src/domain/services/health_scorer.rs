// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source::{SourceRecord, SourceStatus};

const STATUS_WEIGHT: f64 = 0.5;
const RESPONSE_WEIGHT: f64 = 0.3;
const PRIORITY_WEIGHT: f64 = 0.2;

/// 响应时间评分的基准（毫秒），不高于该值得满分
const RESPONSE_BASELINE_MS: f64 = 100.0;
/// 响应时间评分的衰减区间（毫秒）
const RESPONSE_SPAN_MS: f64 = 9900.0;

/// 源质量评分器
///
/// `score = 0.5·status + 0.3·response + 0.2·(priority/100)`，结果落在 `[0, 1]`。
/// 响应时间分数同时做上下限截断，快于基准的响应不会把总分推过 1。
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthScorer;

impl HealthScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, source: &SourceRecord) -> f64 {
        self.score_parts(source.status, source.response_time_ms, source.priority)
    }

    pub fn score_parts(&self, status: SourceStatus, response_time_ms: u64, priority: u32) -> f64 {
        let priority_score = f64::from(priority.min(100)) / 100.0;
        STATUS_WEIGHT * Self::status_score(status)
            + RESPONSE_WEIGHT * Self::response_score(response_time_ms)
            + PRIORITY_WEIGHT * priority_score
    }

    pub fn status_score(status: SourceStatus) -> f64 {
        match status {
            SourceStatus::Healthy => 1.0,
            SourceStatus::Degraded => 0.5,
            SourceStatus::Unknown => 0.3,
            SourceStatus::Timeout => 0.1,
            SourceStatus::Failed => 0.0,
        }
    }

    pub fn response_score(response_time_ms: u64) -> f64 {
        let elapsed = response_time_ms as f64 - RESPONSE_BASELINE_MS;
        (1.0 - elapsed / RESPONSE_SPAN_MS).clamp(0.0, 1.0)
    }
}
