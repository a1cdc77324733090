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

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use tvbox_aggregator::application::use_cases::aggregate_config::{
    AggregateConfigUseCase, AggregatorConfig,
};
use tvbox_aggregator::application::use_cases::health_check::HealthCheckUseCase;
use tvbox_aggregator::config::settings::Settings;
use tvbox_aggregator::domain::repositories::cache_store::CacheStore;
use tvbox_aggregator::domain::repositories::source_registry::SourceRegistry;
use tvbox_aggregator::domain::services::resolver::SourceResolver;
use tvbox_aggregator::engines::reqwest_fetcher::ReqwestFetcher;
use tvbox_aggregator::infrastructure::cache::cache_manager::CacheManager;
use tvbox_aggregator::infrastructure::cache::cache_sweeper::CacheSweeper;
use tvbox_aggregator::infrastructure::cache::memory_store::MemoryStore;
use tvbox_aggregator::infrastructure::cache::redis_client::{RedisClient, RedisStore};
use tvbox_aggregator::infrastructure::registry::file_registry::FileSourceRegistry;
use tvbox_aggregator::presentation::routes;
use tvbox_aggregator::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting tvbox-aggregator...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    tvbox_aggregator::infrastructure::metrics::init_metrics(&settings.metrics.address)?;

    // 3. Durable cache tier
    let store: Arc<dyn CacheStore> = match &settings.redis.url {
        Some(url) => {
            info!("Using Redis for the durable cache tier");
            Arc::new(RedisStore::new(
                RedisClient::new(url)?,
                settings.cache.key_prefix.clone(),
            ))
        }
        None => {
            info!("Redis not configured, using in-process durable tier");
            Arc::new(MemoryStore::new())
        }
    };
    let cache = Arc::new(CacheManager::new(store, settings.cache_config()));
    CacheSweeper::new(
        cache.clone(),
        Duration::from_secs(settings.cache.sweep_interval_seconds),
    )
    .start();

    // 4. Source registry and resolver
    let registry: Arc<dyn SourceRegistry> =
        Arc::new(FileSourceRegistry::new(&settings.registry.sources_path));
    let fetcher = Arc::new(ReqwestFetcher::new(&settings.resolver.user_agent)?);
    let resolver = SourceResolver::new(fetcher, settings.resolver_config());

    // 5. Use cases
    let aggregate = Arc::new(AggregateConfigUseCase::new(
        registry.clone(),
        resolver.clone(),
        cache.clone(),
        AggregatorConfig {
            batch_size: settings.aggregator.batch_size,
            cache_ttl: settings.cache_config().durable_ttl,
        },
    ));
    let health = Arc::new(HealthCheckUseCase::new(
        registry,
        resolver,
        settings.aggregator.batch_size,
    ));

    // 6. Start HTTP server
    let app = routes::routes(aggregate, health, cache);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
