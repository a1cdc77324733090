// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 缓存存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis错误
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 其他错误
    #[error("Store error: {0}")]
    Other(String),
}

/// 持久缓存层的存储适配器
///
/// 值为序列化后的JSON字符串
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// 批量读取，结果与 `keys` 一一对应
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;

    async fn set_many(
        &self,
        entries: &[(String, String)],
        ttl_seconds: u64,
    ) -> Result<(), StoreError>;

    /// 删除键中包含 `pattern` 的条目；`None` 清空全部
    async fn clear(&self, pattern: Option<&str>) -> Result<(), StoreError>;

    /// 移除已过期的条目，返回移除数量
    ///
    /// 自带过期机制的存储（如Redis）无需实现
    async fn purge_expired(&self) -> Result<usize, StoreError> {
        Ok(0)
    }
}
