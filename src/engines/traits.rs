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

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// 抓取错误类型
///
/// 超时与网络错误必须可区分，解析器据此给源定级
#[derive(Error, Debug)]
pub enum FetchError {
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 连接、DNS、TLS等网络错误
    #[error("Network error: {0}")]
    Network(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() || e.is_request() || e.is_body() || e.is_decode() {
            FetchError::Network(e.to_string())
        } else {
            FetchError::Other(e.to_string())
        }
    }
}

/// 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMethod {
    Head,
    Get,
}

impl FetchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMethod::Head => "HEAD",
            FetchMethod::Get => "GET",
        }
    }
}

/// 抓取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 请求方法
    pub method: FetchMethod,
    /// 请求头
    pub headers: HashMap<String, String>,
    /// 超时时间
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, method: FetchMethod, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            timeout,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// 抓取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应头
    pub headers: HashMap<String, String>,
    /// 响应内容（HEAD请求为空）
    pub body: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }
}

/// 抓取原语
///
/// 给定URL、方法、请求头与截止时间，返回状态码、响应头与正文，
/// 或可区分的超时/网络错误。
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// 执行请求
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;

    /// 抓取器名称
    fn name(&self) -> &'static str;
}
