// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::domain::repositories::cache_store::{CacheStore, StoreError};

const SCAN_BATCH: usize = 200;

/// Redis客户端
///
/// 提供对Redis数据库的异步操作接口。
/// 连接在首次使用时建立，之后所有克隆共享同一个自动重连的连接
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
    manager: Arc<OnceCell<ConnectionManager>>,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    pub fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            manager: Arc::new(OnceCell::new()),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                debug!("Opening Redis connection manager");
                ConnectionManager::new(self.client.clone()).await
            })
            .await?;
        Ok(manager.clone())
    }

    /// 获取指定键的值
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut con = self.connection().await?;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut con).await?;
        Ok(value)
    }

    /// 批量获取，结果与键一一对应
    pub async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut con = self.connection().await?;
        let values: Vec<Option<String>> = redis::cmd("MGET").arg(keys).query_async(&mut con).await?;
        Ok(values)
    }

    /// 设置键值对并指定过期时间
    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let mut con = self.connection().await?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds.max(1))
            .query_async(&mut con)
            .await?;
        Ok(())
    }

    /// 在一个管道中批量设置键值对
    pub async fn set_ex_many(
        &self,
        entries: &[(String, String)],
        ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut con = self.connection().await?;
        let mut pipe = redis::pipe();
        for (key, value) in entries {
            pipe.cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(ttl_seconds.max(1))
                .ignore();
        }
        let _: () = pipe.query_async(&mut con).await?;
        Ok(())
    }

    /// 删除键，返回实际删除的数量
    pub async fn del(&self, keys: &[String]) -> Result<i64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut con = self.connection().await?;
        let removed: i64 = redis::cmd("DEL").arg(keys).query_async(&mut con).await?;
        Ok(removed)
    }

    /// 用 SCAN 游标遍历匹配的键
    pub async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut con = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut con)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(keys)
    }
}

/// 转义 glob 元字符，使子串按字面匹配
fn escape_glob(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 基于Redis的持久缓存存储，所有键带命名空间前缀
#[derive(Clone)]
pub struct RedisStore {
    client: RedisClient,
    key_prefix: String,
}

impl RedisStore {
    pub fn new(client: RedisClient, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    fn match_pattern(&self, pattern: Option<&str>) -> String {
        let prefix = escape_glob(&self.key_prefix);
        match pattern {
            Some(p) => format!("{}*{}*", prefix, escape_glob(p)),
            None => format!("{}*", prefix),
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.client.get(&self.namespaced(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        self.client
            .set_ex(&self.namespaced(key), value, ttl_seconds)
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client.del(&[self.namespaced(key)]).await?;
        Ok(())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        let keys: Vec<String> = keys.iter().map(|k| self.namespaced(k)).collect();
        self.client.mget(&keys).await
    }

    async fn set_many(
        &self,
        entries: &[(String, String)],
        ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        let entries: Vec<(String, String)> = entries
            .iter()
            .map(|(k, v)| (self.namespaced(k), v.clone()))
            .collect();
        self.client.set_ex_many(&entries, ttl_seconds).await
    }

    async fn clear(&self, pattern: Option<&str>) -> Result<(), StoreError> {
        let keys = self.client.scan_match(&self.match_pattern(pattern)).await?;
        let mut removed = 0;
        for chunk in keys.chunks(SCAN_BATCH) {
            removed += self.client.del(chunk).await?;
        }
        debug!(pattern = ?pattern, removed, "Cleared Redis cache keys");
        Ok(())
    }
}
