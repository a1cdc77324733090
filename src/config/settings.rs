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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::services::resolver::ResolverConfig;
use crate::infrastructure::cache::cache_manager::CacheConfig;

/// 应用程序配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
    /// 源注册表配置
    pub registry: RegistrySettings,
    /// Redis配置
    #[serde(default)]
    pub redis: RedisSettings,
    /// 解析器配置
    pub resolver: ResolverSettings,
    /// 缓存配置
    pub cache: CacheSettings,
    /// 聚合配置
    pub aggregator: AggregatorSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus 监听地址
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySettings {
    /// 源列表文件路径
    pub sources_path: String,
}

/// Redis配置设置
///
/// 未设置 `url` 时持久层退回进程内存储
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverSettings {
    pub probe_timeout_ms: u64,
    pub fetch_timeout_ms: u64,
    pub default_max_depth: u32,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub memory_ttl_seconds: u64,
    pub durable_ttl_seconds: u64,
    /// Redis键前缀
    pub key_prefix: String,
    /// 过期条目清理间隔
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorSettings {
    /// 顶层源的并发批大小
    pub batch_size: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加：内置默认值、`config/default.toml`、
    /// `config/{APP_ENVIRONMENT}.toml`、`TVBOX__` 前缀的环境变量
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::from_dir("config", &env)
    }

    /// 从指定目录加载配置文件
    pub fn from_dir(config_dir: &str, env: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("metrics.address", "0.0.0.0:9000")?
            .set_default("registry.sources_path", "config/sources.json")?
            .set_default("resolver.probe_timeout_ms", 5000)?
            .set_default("resolver.fetch_timeout_ms", 15000)?
            .set_default("resolver.default_max_depth", 2)?
            .set_default("resolver.user_agent", "tvbox-aggregator/0.1")?
            .set_default("cache.memory_ttl_seconds", 300)?
            .set_default("cache.durable_ttl_seconds", 3600)?
            .set_default("cache.key_prefix", "tvbox:")?
            .set_default("cache.sweep_interval_seconds", 60)?
            .set_default("aggregator.batch_size", 10)?
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", config_dir, env)).required(false))
            .add_source(Environment::with_prefix("TVBOX").separator("__"));

        builder.build()?.try_deserialize()
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            probe_timeout: Duration::from_millis(self.resolver.probe_timeout_ms),
            fetch_timeout: Duration::from_millis(self.resolver.fetch_timeout_ms),
            default_max_depth: self.resolver.default_max_depth,
            user_agent: self.resolver.user_agent.clone(),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            memory_ttl: Duration::from_secs(self.cache.memory_ttl_seconds),
            durable_ttl: Duration::from_secs(self.cache.durable_ttl_seconds),
        }
    }
}
