// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::{join_all, BoxFuture, FutureExt};
use metrics::counter;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::models::document::ConfigDocument;
use crate::domain::models::resolution::{ResolveError, ResolvedDocument, SourceResolution};
use crate::domain::models::source::{SourceRecord, SourceStatus};
use crate::domain::models::traversal::{TraversalContext, TraversalSettings};
use crate::domain::services::document_parser::{discover_subsources, parse_body, ParsedBody};
use crate::domain::services::merge_engine::merge_children_into_parent;
use crate::engines::traits::{FetchError, FetchMethod, FetchRequest, FetchResponse, Fetcher};

/// 解析器配置
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// 可达性探测超时
    pub probe_timeout: Duration,
    /// 内容抓取超时
    pub fetch_timeout: Duration,
    /// 源未设置 `maxDepth` 时的深度
    pub default_max_depth: u32,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(15),
            default_max_depth: 2,
            user_agent: "tvbox-aggregator/0.1".to_string(),
        }
    }
}

/// 调用方对递归设置的覆盖
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionOverrides {
    pub enable_recursive: bool,
    pub max_depth: Option<u32>,
}

impl Default for RecursionOverrides {
    fn default() -> Self {
        Self {
            enable_recursive: true,
            max_depth: None,
        }
    }
}

impl RecursionOverrides {
    /// 只解析根节点
    pub fn root_only() -> Self {
        Self {
            enable_recursive: false,
            max_depth: Some(0),
        }
    }
}

/// 源解析器
///
/// 对单个源做探测、抓取、校验并按需递归展开子源。
/// 解析不修改源记录，结果中携带状态与耗时供注册表写回。
#[derive(Clone)]
pub struct SourceResolver {
    fetcher: Arc<dyn Fetcher>,
    config: ResolverConfig,
}

impl SourceResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: ResolverConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// 计算源的有效递归设置
    ///
    /// 深度优先级：调用方覆盖 > 源的 `maxDepth` > 默认深度
    pub fn traversal_settings(
        &self,
        source: &SourceRecord,
        overrides: RecursionOverrides,
    ) -> TraversalSettings {
        TraversalSettings {
            recursive: source.is_recursive && overrides.enable_recursive,
            max_depth: overrides
                .max_depth
                .or(source.max_depth)
                .unwrap_or(self.config.default_max_depth),
        }
    }

    /// 解析一个顶层源，每次调用使用全新的遍历上下文
    pub async fn resolve_source(
        &self,
        source: &SourceRecord,
        overrides: RecursionOverrides,
    ) -> SourceResolution {
        let settings = self.traversal_settings(source, overrides);
        let context = TraversalContext::new(settings);
        let started = Instant::now();

        let outcome = self.resolve(source.url.clone(), context).await;

        let response_time_ms = started.elapsed().as_millis() as u64;
        let status = match &outcome {
            Ok(resolved) => resolved.status,
            Err(e) => e.status(),
        };
        counter!("tvbox_source_resolutions_total", "status" => status.as_str()).increment(1);

        match &outcome {
            Ok(resolved) => info!(
                source_id = %source.id,
                status = %status,
                entries = resolved.document.entry_count(),
                merged_children = resolved.merged_children,
                response_time_ms,
                "Source resolved"
            ),
            Err(e) => warn!(
                source_id = %source.id,
                status = %status,
                response_time_ms,
                "Source resolution failed: {}",
                e
            ),
        }

        SourceResolution {
            source_id: source.id.clone(),
            outcome,
            status,
            response_time_ms,
            checked_at: Utc::now(),
        }
    }

    /// 解析一个节点，深度取自上下文
    ///
    /// 子节点并发解析，各自拿到上下文快照；失败的子节点被丢弃，不影响兄弟节点。
    pub fn resolve(
        &self,
        url: String,
        mut context: TraversalContext,
    ) -> BoxFuture<'_, Result<ResolvedDocument, ResolveError>> {
        async move {
            let depth = context.current_depth();
            let settings = context.settings();
            if depth > settings.max_depth {
                return Err(ResolveError::DepthExceeded {
                    url,
                    depth,
                    max_depth: settings.max_depth,
                });
            }

            if let Err(e) = context.claim(&url) {
                debug!(url = %url, path = ?context.path(), "Circular reference detected");
                return Err(e);
            }

            self.probe(&url).await?;
            let response = self.fetch_content(&url).await?;

            match parse_body(&url, &response.body)? {
                ParsedBody::Index(entries) => {
                    debug!(url = %url, entries = entries.len(), depth, "Multi-index document");
                    let child_urls: Vec<String> = entries.into_iter().map(|e| e.url).collect();
                    let children = self.expand(&url, child_urls, &context).await;
                    let healthy = children.iter().any(|c| c.status == SourceStatus::Healthy);
                    let merged_children = children.len();
                    let document = merge_children_into_parent(
                        ConfigDocument::default(),
                        children.into_iter().map(|c| c.document).collect(),
                    );
                    Ok(ResolvedDocument {
                        url,
                        document,
                        status: if healthy {
                            SourceStatus::Healthy
                        } else {
                            SourceStatus::Degraded
                        },
                        merged_children,
                    })
                }
                ParsedBody::Document { document, healthy } => {
                    if !healthy {
                        debug!(url = %url, "Document failed shape check, propagating as degraded");
                    }
                    let child_urls = discover_subsources(&document);
                    let children = self.expand(&url, child_urls, &context).await;
                    let healthy =
                        healthy || children.iter().any(|c| c.status == SourceStatus::Healthy);
                    let merged_children = children.len();
                    let document = if children.is_empty() {
                        document
                    } else {
                        merge_children_into_parent(
                            document,
                            children.into_iter().map(|c| c.document).collect(),
                        )
                    };
                    Ok(ResolvedDocument {
                        url,
                        document,
                        status: if healthy {
                            SourceStatus::Healthy
                        } else {
                            SourceStatus::Degraded
                        },
                        merged_children,
                    })
                }
            }
        }
        .boxed()
    }

    /// 并发解析子源，只保留成功结果并保持发现顺序
    async fn expand(
        &self,
        parent: &str,
        child_urls: Vec<String>,
        context: &TraversalContext,
    ) -> Vec<ResolvedDocument> {
        if child_urls.is_empty() {
            return Vec::new();
        }
        let depth = context.current_depth();
        if !context.settings().allows_descent(depth) {
            debug!(
                url = %parent,
                depth,
                max_depth = context.settings().max_depth,
                skipped = child_urls.len(),
                "Sub-sources not followed"
            );
            return Vec::new();
        }

        let futures = child_urls
            .into_iter()
            .map(|child| self.resolve(child, context.descend()));
        let results = join_all(futures).await;

        let mut children = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(child) => {
                    counter!("tvbox_subsource_fetches_total", "outcome" => "success").increment(1);
                    children.push(child);
                }
                Err(e) => {
                    let outcome = match &e {
                        ResolveError::CircularReference { .. } => "circular",
                        ResolveError::Timeout { .. } => "timeout",
                        ResolveError::Malformed { .. } => "malformed",
                        ResolveError::Unreachable { .. } | ResolveError::DepthExceeded { .. } => {
                            "failed"
                        }
                    };
                    counter!("tvbox_subsource_fetches_total", "outcome" => outcome).increment(1);
                    debug!(parent = %parent, depth = depth + 1, "Sub-source dropped: {}", e);
                }
            }
        }
        children
    }

    /// 可达性探测：5xx、网络错误或超时直接判定失败，其余状态码放行
    async fn probe(&self, url: &str) -> Result<(), ResolveError> {
        let response = self
            .send(url, FetchMethod::Head, self.config.probe_timeout)
            .await?;
        if response.is_server_error() {
            debug!(url = %url, status = response.status_code, "Probe rejected");
            return Err(ResolveError::Unreachable {
                url: url.to_string(),
                reason: format!("probe returned HTTP {}", response.status_code),
            });
        }
        Ok(())
    }

    async fn fetch_content(&self, url: &str) -> Result<FetchResponse, ResolveError> {
        let response = self
            .send(url, FetchMethod::Get, self.config.fetch_timeout)
            .await?;
        if !response.is_success() {
            return Err(ResolveError::Unreachable {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status_code),
            });
        }
        Ok(response)
    }

    async fn send(
        &self,
        url: &str,
        method: FetchMethod,
        deadline: Duration,
    ) -> Result<FetchResponse, ResolveError> {
        let request = FetchRequest::new(url, method, deadline)
            .with_header("User-Agent", self.config.user_agent.as_str())
            .with_header("Accept", "application/json, text/plain, */*");
        let timeout_ms = deadline.as_millis() as u64;

        match tokio::time::timeout(deadline, self.fetcher.fetch(&request)).await {
            Err(_) | Ok(Err(FetchError::Timeout)) => Err(ResolveError::Timeout {
                url: url.to_string(),
                timeout_ms,
            }),
            Ok(Err(e)) => Err(ResolveError::Unreachable {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Ok(Ok(response)) => Ok(response),
        }
    }
}
