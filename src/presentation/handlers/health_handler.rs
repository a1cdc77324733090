// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::application::use_cases::health_check::HealthCheckUseCase;
use crate::presentation::errors::AppError;

/// 执行一次完整的健康检查并返回报告
pub async fn get_health(
    Extension(use_case): Extension<Arc<HealthCheckUseCase>>,
) -> Result<impl IntoResponse, AppError> {
    let report = use_case.check_all_sources().await?;
    Ok((
        [(header::CACHE_CONTROL, "public, max-age=300")],
        Json(report),
    ))
}

/// 在后台触发健康检查，立即返回任务ID
pub async fn trigger_check(
    Extension(use_case): Extension<Arc<HealthCheckUseCase>>,
) -> impl IntoResponse {
    let task_id = format!("check-{}", Uuid::new_v4());
    info!(task_id = %task_id, "Health check started");

    let background_id = task_id.clone();
    tokio::spawn(async move {
        if let Err(e) = use_case.check_all_sources().await {
            error!(task_id = %background_id, "Health check failed: {}", e);
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "taskId": task_id,
            "status": "pending",
            "message": "Health check initiated",
        })),
    )
}
