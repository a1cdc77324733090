// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tvbox_aggregator::domain::models::source::SourceRecord;
use tvbox_aggregator::domain::services::resolver::{ResolverConfig, SourceResolver};
use tvbox_aggregator::engines::traits::{
    FetchError, FetchMethod, FetchRequest, FetchResponse, Fetcher,
};

/// 预设的响应
#[derive(Debug, Clone)]
pub enum Scripted {
    /// 200 与给定正文
    Body(String),
    /// 指定状态码，正文为空
    Status(u16),
    /// 永不按时返回
    Hang,
    /// 网络错误
    NetworkError,
    /// 延迟后返回 200 与正文
    Delayed(Duration, String),
}

/// 记录全部请求的脚本化抓取器
///
/// 未登记的URL返回404
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Scripted>>,
    head_routes: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<(FetchMethod, String)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(self, url: &str, body: Value) -> Self {
        self.routes
            .lock()
            .insert(url.to_string(), Scripted::Body(body.to_string()));
        self
    }

    pub fn body(self, url: &str, body: &str) -> Self {
        self.routes
            .lock()
            .insert(url.to_string(), Scripted::Body(body.to_string()));
        self
    }

    pub fn respond(self, url: &str, response: Scripted) -> Self {
        self.routes.lock().insert(url.to_string(), response);
        self
    }

    /// 只覆盖探测请求的响应
    pub fn head(self, url: &str, response: Scripted) -> Self {
        self.head_routes.lock().insert(url.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<(FetchMethod, String)> {
        self.calls.lock().clone()
    }

    /// 内容抓取（GET）的URL序列
    pub fn gets(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|(method, _)| *method == FetchMethod::Get)
            .map(|(_, url)| url.clone())
            .collect()
    }

    pub fn get_count(&self, url: &str) -> usize {
        self.gets().iter().filter(|u| u.as_str() == url).count()
    }

    pub fn head_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(method, _)| *method == FetchMethod::Head)
            .count()
    }

    fn lookup(&self, method: FetchMethod, url: &str) -> Option<Scripted> {
        if method == FetchMethod::Head {
            if let Some(scripted) = self.head_routes.lock().get(url) {
                return Some(scripted.clone());
            }
        }
        self.routes.lock().get(url).cloned()
    }
}

fn response(status_code: u16, body: String) -> FetchResponse {
    FetchResponse {
        status_code,
        headers: HashMap::new(),
        body,
        response_time_ms: 1,
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        self.calls.lock().push((request.method, request.url.clone()));

        let body_for = |body: String| match request.method {
            FetchMethod::Head => String::new(),
            FetchMethod::Get => body,
        };

        match self.lookup(request.method, &request.url) {
            None => Ok(response(404, String::new())),
            Some(Scripted::Body(body)) => Ok(response(200, body_for(body))),
            Some(Scripted::Status(code)) => Ok(response(code, String::new())),
            Some(Scripted::NetworkError) => Err(FetchError::Network("connection refused".into())),
            Some(Scripted::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FetchError::Timeout)
            }
            Some(Scripted::Delayed(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(response(200, body_for(body)))
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn resolver(fetcher: &Arc<ScriptedFetcher>) -> SourceResolver {
    SourceResolver::new(fetcher.clone(), ResolverConfig::default())
}

pub fn source(id: &str, url: &str) -> SourceRecord {
    SourceRecord::new(id, id.to_uppercase(), url)
}

pub fn url(name: &str) -> String {
    format!("http://{}.test/config.json", name)
}
