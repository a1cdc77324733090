// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tvbox_aggregator::domain::repositories::cache_store::{CacheStore, StoreError};
use futures::future::join_all;
use tvbox_aggregator::infrastructure::cache::cache_manager::{CacheConfig, CacheManager};
use tvbox_aggregator::infrastructure::cache::cache_sweeper::CacheSweeper;
use tvbox_aggregator::infrastructure::cache::memory_store::MemoryStore;

fn manager(store: Arc<dyn CacheStore>) -> CacheManager {
    CacheManager::new(store, CacheConfig::default())
}

/// 统计批量读取次数的存储包装
struct CountingStore {
    inner: MemoryStore,
    get_many_calls: AtomicUsize,
}

#[async_trait]
impl CacheStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        self.inner.set(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        assert!(keys.len() <= 10, "batch of {} keys", keys.len());
        self.get_many_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_many(keys).await
    }

    async fn set_many(
        &self,
        entries: &[(String, String)],
        ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        self.inner.set_many(entries, ttl_seconds).await
    }

    async fn clear(&self, pattern: Option<&str>) -> Result<(), StoreError> {
        self.inner.clear(pattern).await
    }
}

/// 所有操作都失败的存储
struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Other("store unavailable".to_string())
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(unavailable())
    }

    async fn set(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn get_many(&self, _keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        Err(unavailable())
    }

    async fn set_many(
        &self,
        _entries: &[(String, String)],
        _ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn clear(&self, _pattern: Option<&str>) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

#[tokio::test(start_paused = true)]
async fn set_then_get_serves_from_memory() {
    let cache = manager(Arc::new(MemoryStore::new()));

    cache
        .set("aggregated:abc", "{\"v\":1}", Duration::from_secs(3600))
        .await
        .unwrap();

    assert!(cache.is_memory_resident("aggregated:abc"));
    assert_eq!(cache.get("aggregated:abc").await.as_deref(), Some("{\"v\":1}"));
    assert_eq!(cache.stats().l1_hits, 1);
}

#[tokio::test(start_paused = true)]
async fn memory_expiry_falls_back_to_durable_tier() {
    let store = Arc::new(MemoryStore::new());
    let cache = manager(store.clone());

    cache.set("k", "v", Duration::from_secs(3600)).await.unwrap();

    tokio::time::advance(Duration::from_secs(301)).await;
    assert!(!cache.is_memory_resident("k"));

    assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    // durable hit backfills the memory tier
    assert!(cache.is_memory_resident("k"));

    tokio::time::advance(Duration::from_secs(3300)).await;
    assert_eq!(cache.get("k").await, None);
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn short_ttl_is_not_extended_by_memory_cap() {
    let cache = manager(Arc::new(MemoryStore::new()));

    cache.set("k", "v", Duration::from_secs(60)).await.unwrap();

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(cache.get("k").await, None);
}

#[tokio::test(start_paused = true)]
async fn hit_rate_is_hits_per_resident_entry() {
    let cache = manager(Arc::new(MemoryStore::new()));
    cache.set("a", "1", Duration::from_secs(60)).await.unwrap();
    cache.set("b", "22", Duration::from_secs(60)).await.unwrap();

    for _ in 0..3 {
        cache.get("a").await;
    }
    cache.get("b").await;
    cache.get("missing").await;

    let stats = cache.stats();
    assert_eq!(stats.l1_size, 2);
    assert_eq!(stats.l1_hits, 4);
    assert!((stats.l1_hit_rate - 2.0).abs() < f64::EPSILON);
    assert_eq!(stats.memory_usage_bytes, "a1".len() + "b22".len());

    let body = serde_json::to_value(&stats).unwrap();
    assert_eq!(body["l1Size"], json!(2));
    assert!(body.get("l1HitRate").is_some());
}

#[tokio::test(start_paused = true)]
async fn pattern_clear_applies_to_both_tiers() {
    let store = Arc::new(MemoryStore::new());
    let cache = manager(store.clone());
    for key in ["aggregated:1", "aggregated:2", "health:1"] {
        cache.set(key, "v", Duration::from_secs(600)).await.unwrap();
    }

    cache.clear(Some("aggregated")).await.unwrap();

    assert!(!cache.is_memory_resident("aggregated:1"));
    assert_eq!(store.get("aggregated:2").await.unwrap(), None);
    assert_eq!(cache.get("health:1").await.as_deref(), Some("v"));

    cache.clear(None).await.unwrap();
    assert_eq!(cache.stats().l1_size, 0);
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn delete_removes_from_both_tiers() {
    let store = Arc::new(MemoryStore::new());
    let cache = manager(store.clone());
    cache.set("k", "v", Duration::from_secs(600)).await.unwrap();

    cache.delete("k").await.unwrap();

    assert!(!cache.is_memory_resident("k"));
    assert_eq!(cache.get("k").await, None);
}

#[tokio::test(start_paused = true)]
async fn warmup_reads_in_batches_of_ten() {
    let store = Arc::new(CountingStore {
        inner: MemoryStore::new(),
        get_many_calls: AtomicUsize::new(0),
    });
    let keys: Vec<String> = (0..26).map(|i| format!("key:{i}")).collect();
    for key in keys.iter().step_by(2) {
        store.set(key, "warm", 600).await.unwrap();
    }
    let cache = manager(store.clone());

    let warmed = cache.warmup(&keys).await;

    assert_eq!(warmed, 13);
    assert_eq!(store.get_many_calls.load(Ordering::SeqCst), 3);
    assert!(cache.is_memory_resident("key:0"));
    assert!(!cache.is_memory_resident("key:1"));
}

#[tokio::test(start_paused = true)]
async fn durable_failures_degrade_to_misses() {
    let cache = manager(Arc::new(FailingStore));

    assert!(cache.set("k", "v", Duration::from_secs(60)).await.is_err());
    // the memory tier was still written
    assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    assert_eq!(cache.get("other").await, None);
    assert_eq!(cache.warmup(&["a".to_string()]).await, 0);
}

#[tokio::test(start_paused = true)]
async fn json_round_trip_and_corrupt_values() {
    let store = Arc::new(MemoryStore::new());
    let cache = manager(store.clone());

    cache
        .set_json("doc", &json!({"sites": []}), Duration::from_secs(60))
        .await
        .unwrap();
    let value: Option<serde_json::Value> = cache.get_json("doc").await;
    assert_eq!(value, Some(json!({"sites": []})));

    store.set("corrupt", "{not json", 60).await.unwrap();
    let corrupt: Option<serde_json::Value> = cache.get_json("corrupt").await;
    assert!(corrupt.is_none());
}

#[tokio::test(start_paused = true)]
async fn purge_expired_drops_stale_memory_entries() {
    let cache = manager(Arc::new(MemoryStore::new()));
    cache.set("short", "v", Duration::from_secs(10)).await.unwrap();
    cache.set("long", "v", Duration::from_secs(200)).await.unwrap();

    tokio::time::advance(Duration::from_secs(11)).await;

    assert_eq!(cache.purge_expired(), 1);
    assert!(cache.is_memory_resident("long"));
}

#[tokio::test(start_paused = true)]
async fn sweep_bounds_both_tiers_after_expiry() {
    let store = Arc::new(MemoryStore::new());
    let cache = manager(store.clone());
    for i in 0..1000 {
        cache
            .set(&format!("key:{i}"), "v", Duration::from_secs(3600))
            .await
            .unwrap();
    }
    assert_eq!(cache.memory_len(), 1000);
    assert_eq!(store.stored_len(), 1000);

    tokio::time::advance(Duration::from_secs(7200)).await;
    // nothing read the keys, so they are still held
    assert_eq!(cache.memory_len(), 1000);
    assert_eq!(store.stored_len(), 1000);

    assert_eq!(cache.sweep().await, 2000);
    assert_eq!(cache.memory_len(), 0);
    assert_eq!(store.stored_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn sweeper_task_purges_on_interval() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(manager(store.clone()));
    cache.set("stale", "v", Duration::from_secs(30)).await.unwrap();
    cache.set("fresh", "v", Duration::from_secs(600)).await.unwrap();

    let handle = CacheSweeper::new(cache.clone(), Duration::from_secs(60)).start();
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert_eq!(cache.memory_len(), 1);
    assert_eq!(store.stored_len(), 1);
    assert!(cache.is_memory_resident("fresh"));
    handle.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_access_on_overlapping_keys() {
    let cache = Arc::new(manager(Arc::new(MemoryStore::new())));
    let keys: Vec<String> = (0..8).map(|i| format!("key:{i}")).collect();
    let written = |key: &str, worker: usize| format!("{key}|w{worker}");
    let is_written = |key: &str, value: &str| {
        value
            .strip_prefix(&format!("{key}|w"))
            .and_then(|worker| worker.parse::<usize>().ok())
            .is_some_and(|worker| worker < 16)
    };

    // mixed writers and readers on the same keys
    let tasks = (0..16).map(|worker| {
        let cache = cache.clone();
        let keys = keys.clone();
        tokio::spawn(async move {
            let mut observed = Vec::new();
            for round in 0..4 {
                for (i, key) in keys.iter().enumerate() {
                    if (worker + i + round) % 2 == 0 {
                        cache
                            .set(key, &written(key, worker), Duration::from_secs(600))
                            .await
                            .unwrap();
                    } else if let Some(value) = cache.get(key).await {
                        observed.push((key.clone(), value));
                    }
                }
            }
            observed
        })
    });
    for result in join_all(tasks).await {
        for (key, value) in result.unwrap() {
            assert!(is_written(&key, &value), "{key} read {value}");
        }
    }

    // a set resets the entry's hit count, so count hits over reads only
    for key in &keys {
        cache
            .set(key, &written(key, 0), Duration::from_secs(600))
            .await
            .unwrap();
    }
    let hits = Arc::new(AtomicUsize::new(0));
    let readers = (0..16).map(|_| {
        let cache = cache.clone();
        let keys = keys.clone();
        let hits = hits.clone();
        tokio::spawn(async move {
            for _ in 0..5 {
                for key in &keys {
                    let value = cache.get(key).await.expect("resident key");
                    assert!(is_written(key, &value));
                    hits.fetch_add(1, Ordering::SeqCst);
                }
            }
        })
    });
    for result in join_all(readers).await {
        result.unwrap();
    }

    let stats = cache.stats();
    assert_eq!(hits.load(Ordering::SeqCst), 16 * 5 * 8);
    assert_eq!(stats.l1_hits, (16 * 5 * 8) as u64);
    assert_eq!(stats.l1_size, keys.len());
}
