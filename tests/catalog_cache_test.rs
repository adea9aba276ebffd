// ABOUTME: Integration tests for the catalog metadata cache
// ABOUTME: Tests lazy fill, TTL expiry on a paused clock, and failed loads not being cached
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::advance;
use vitalis::cache::CatalogMetadataCache;
use vitalis::sources::CatalogMetadataStore;
use vitalis_core::errors::{AppError, AppResult};
use vitalis_core::models::MetricMetadata;

/// Store that counts loads and can be switched into failure
#[derive(Default)]
struct CountingStore {
    loads: AtomicUsize,
    failing: AtomicBool,
}

impl CountingStore {
    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogMetadataStore for CountingStore {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn load(&self) -> AppResult<HashMap<String, MetricMetadata>> {
        let load = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::internal("store offline"));
        }
        Ok(HashMap::from([(
            "weight".to_owned(),
            MetricMetadata {
                display_name: format!("Body Weight v{load}"),
                category: "body".to_owned(),
            },
        )]))
    }
}

fn cache_over(store: &Arc<CountingStore>, ttl_secs: u64) -> CatalogMetadataCache {
    CatalogMetadataCache::new(
        Arc::clone(store) as Arc<dyn CatalogMetadataStore>,
        Duration::from_secs(ttl_secs),
    )
}

#[tokio::test(start_paused = true)]
async fn test_first_get_fills_and_later_gets_share_snapshot() {
    let store = Arc::new(CountingStore::default());
    let cache = cache_over(&store, 300);
    assert!(!cache.is_fresh().await);

    let first = cache.get().await.unwrap();
    let second = cache.get().await.unwrap();

    assert_eq!(store.loads(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(cache.is_fresh().await);
}

#[tokio::test(start_paused = true)]
async fn test_expired_snapshot_is_reloaded() {
    let store = Arc::new(CountingStore::default());
    let cache = cache_over(&store, 300);

    let first = cache.get().await.unwrap();
    advance(Duration::from_secs(299)).await;
    cache.get().await.unwrap();
    assert_eq!(store.loads(), 1);

    advance(Duration::from_secs(2)).await;
    assert!(!cache.is_fresh().await);
    let refreshed = cache.get().await.unwrap();

    assert_eq!(store.loads(), 2);
    assert_eq!(first["weight"].display_name, "Body Weight v1");
    assert_eq!(refreshed["weight"].display_name, "Body Weight v2");
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_is_not_cached() {
    let store = Arc::new(CountingStore::default());
    store.failing.store(true, Ordering::SeqCst);
    let cache = cache_over(&store, 300);

    assert!(cache.get().await.is_err());
    assert!(!cache.is_fresh().await);

    store.failing.store(false, Ordering::SeqCst);
    let snapshot = cache.get().await.unwrap();

    assert_eq!(store.loads(), 2);
    assert!(snapshot.contains_key("weight"));
}

#[tokio::test(start_paused = true)]
async fn test_zero_ttl_reloads_every_time() {
    let store = Arc::new(CountingStore::default());
    let cache = cache_over(&store, 0);

    cache.get().await.unwrap();
    cache.get().await.unwrap();

    assert_eq!(store.loads(), 2);
    assert_eq!(cache.ttl(), Duration::ZERO);
}

#[tokio::test]
async fn test_concurrent_readers_trigger_single_load() {
    let store = Arc::new(CountingStore::default());
    let cache = Arc::new(cache_over(&store, 300));

    let readers: Vec<_> = (0..16)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get().await.map(|snapshot| snapshot.len()) })
        })
        .collect();
    for reader in readers {
        assert_eq!(reader.await.unwrap().unwrap(), 1);
    }

    assert_eq!(store.loads(), 1);
}
