// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use super::cache_manager::CacheManager;

/// 缓存过期清理工作器
///
/// 按固定间隔清理两层缓存中未再被读取的过期条目
pub struct CacheSweeper {
    cache: Arc<CacheManager>,
    interval: Duration,
}

impl CacheSweeper {
    pub fn new(cache: Arc<CacheManager>, interval: Duration) -> Self {
        // tokio::time::interval 不接受零间隔
        Self {
            cache,
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    /// 运行工作器
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "Cache sweeper started");

        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;

            let count = self.cache.sweep().await;
            if count > 0 {
                info!("Purged {} expired cache entries", count);
            }
        }
    }

    /// 启动后台运行
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}
