// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use metrics::counter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::repositories::cache_store::{CacheStore, StoreError};

/// 预热时每批读取的键数
const WARMUP_BATCH_SIZE: usize = 10;

/// 分层缓存配置
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// 内存层TTL上限
    pub memory_ttl: Duration,
    /// 持久层默认TTL
    pub durable_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_ttl: Duration::from_secs(300),
            durable_ttl: Duration::from_secs(3600),
        }
    }
}

/// 内存层缓存条目
struct CacheEntry {
    value: String,
    expires_at: Instant,
    hit_count: u64,
}

impl CacheEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
            hit_count: 0,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn touch(&mut self) {
        self.hit_count += 1;
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// 内存层驻留条目数
    pub l1_size: usize,
    /// 内存层累计命中次数
    pub l1_hits: u64,
    /// 每个驻留条目的平均命中次数（不是请求命中率）
    pub l1_hit_rate: f64,
    /// 驻留键与值的字节数
    pub memory_usage_bytes: usize,
}

/// 缓存管理器
///
/// 第一层为进程内 `DashMap`，TTL 受 `memory_ttl` 限制；
/// 第二层为外部提供的 [`CacheStore`]。持久层错误只记录日志，读取时按未命中处理。
pub struct CacheManager {
    memory: DashMap<String, CacheEntry>,
    store: Arc<dyn CacheStore>,
    config: CacheConfig,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self {
            memory: DashMap::new(),
            store,
            config,
        }
    }

    pub fn durable_ttl(&self) -> Duration {
        self.config.durable_ttl
    }

    fn memory_ttl(&self, requested: Duration) -> Duration {
        requested.min(self.config.memory_ttl)
    }

    /// 读取内存层；命中时累加命中计数，过期条目顺带移除
    fn get_memory(&self, key: &str) -> Option<String> {
        let expired = match self.memory.get_mut(key) {
            Some(mut entry) if !entry.is_expired() => {
                entry.touch();
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.memory.remove_if(key, |_, entry| entry.is_expired());
        }
        None
    }

    fn put_memory(&self, key: &str, value: String, ttl: Duration) {
        self.memory
            .insert(key.to_string(), CacheEntry::new(value, self.memory_ttl(ttl)));
    }

    /// 获取缓存值
    ///
    /// 内存层未命中时读取持久层，命中后以内存层上限回填
    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.get_memory(key) {
            counter!("tvbox_cache_lookups_total", "tier" => "memory", "result" => "hit")
                .increment(1);
            debug!(key, "Cache hit (memory)");
            return Some(value);
        }

        match self.store.get(key).await {
            Ok(Some(value)) => {
                counter!("tvbox_cache_lookups_total", "tier" => "durable", "result" => "hit")
                    .increment(1);
                debug!(key, "Cache hit (durable), backfilling memory tier");
                self.put_memory(key, value.clone(), self.config.memory_ttl);
                Some(value)
            }
            Ok(None) => {
                counter!("tvbox_cache_lookups_total", "tier" => "durable", "result" => "miss")
                    .increment(1);
                None
            }
            Err(e) => {
                counter!("tvbox_cache_lookups_total", "tier" => "durable", "result" => "error")
                    .increment(1);
                warn!(key, "Durable cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    /// 写入两层缓存；内存层TTL不超过上限
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.put_memory(key, value.to_string(), ttl);
        self.store.set(key, value, ttl.as_secs()).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.memory.remove(key);
        self.store.delete(key).await
    }

    /// 删除键中包含 `pattern` 的条目；`None` 清空两层缓存
    pub async fn clear(&self, pattern: Option<&str>) -> Result<(), StoreError> {
        match pattern {
            Some(pattern) => self.memory.retain(|key, _| !key.contains(pattern)),
            None => self.memory.clear(),
        }
        info!(pattern = ?pattern, "Cache cleared");
        self.store.clear(pattern).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, "Cached value could not be deserialized: {}", e);
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw, ttl).await
    }

    /// 从持久层按批回填内存层，返回回填的条目数
    pub async fn warmup(&self, keys: &[String]) -> usize {
        let mut warmed = 0;
        for batch in keys.chunks(WARMUP_BATCH_SIZE) {
            match self.store.get_many(batch).await {
                Ok(values) => {
                    for (key, value) in batch.iter().zip(values) {
                        if let Some(value) = value {
                            self.put_memory(key, value, self.config.memory_ttl);
                            warmed += 1;
                        }
                    }
                }
                Err(e) => warn!(batch = batch.len(), "Cache warmup batch failed: {}", e),
            }
        }
        info!(requested = keys.len(), warmed, "Cache warmup completed");
        warmed
    }

    /// 移除内存层中已过期的条目
    pub fn purge_expired(&self) -> usize {
        let before = self.memory.len();
        self.memory.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.memory.len())
    }

    /// 清理两层缓存中的过期条目，返回移除总数
    ///
    /// 持久层清理失败只记录日志
    pub async fn sweep(&self) -> usize {
        let mut removed = self.purge_expired();
        match self.store.purge_expired().await {
            Ok(count) => removed += count,
            Err(e) => warn!("Durable cache purge failed: {}", e),
        }
        if removed > 0 {
            counter!("tvbox_cache_purged_total").increment(removed as u64);
        }
        removed
    }

    /// 内存层实际驻留的条目数，包括尚未清理的过期条目
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// 内存层是否持有未过期的键（不计入命中）
    pub fn is_memory_resident(&self, key: &str) -> bool {
        self.memory.get(key).is_some_and(|entry| !entry.is_expired())
    }

    /// 获取缓存统计信息
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry in self.memory.iter() {
            if entry.is_expired() {
                continue;
            }
            stats.l1_size += 1;
            stats.l1_hits += entry.hit_count;
            stats.memory_usage_bytes += entry.key().len() + entry.value.len();
        }
        if stats.l1_size > 0 {
            stats.l1_hit_rate = stats.l1_hits as f64 / stats.l1_size as f64;
        }
        stats
    }
}
