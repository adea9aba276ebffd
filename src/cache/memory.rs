// ABOUTME: In-memory TTL snapshot of catalog metadata with lazy fill on first access
// ABOUTME: Readers share one Arc'd map; a writer refills it after expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use vitalis_core::errors::AppResult;
use vitalis_core::models::MetricMetadata;

use crate::sources::CatalogMetadataStore;

/// Shared metadata map handed to readers
pub type MetadataSnapshot = Arc<HashMap<String, MetricMetadata>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: MetadataSnapshot,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: MetadataSnapshot, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Read-mostly cache in front of a [`CatalogMetadataStore`]
pub struct CatalogMetadataCache {
    store: Arc<dyn CatalogMetadataStore>,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl CatalogMetadataCache {
    /// Wrap `store`; nothing is loaded until the first [`get`](Self::get)
    #[must_use]
    pub fn new(store: Arc<dyn CatalogMetadataStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Configured time to live
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current snapshot, loading from the store when empty or expired
    ///
    /// A failed load leaves the cache empty so the next call retries the store.
    ///
    /// # Errors
    ///
    /// Returns the store's error when a load is needed and fails
    pub async fn get(&self) -> AppResult<MetadataSnapshot> {
        if let Some(entry) = self.entry.read().await.as_ref() {
            if !entry.is_expired() {
                return Ok(Arc::clone(&entry.data));
            }
        }

        let mut guard = self.entry.write().await;
        // Another task may have refilled while we waited for the write lock
        if let Some(entry) = guard.as_ref() {
            if !entry.is_expired() {
                return Ok(Arc::clone(&entry.data));
            }
        }

        let data = Arc::new(self.store.load().await?);
        debug!(
            store = self.store.name(),
            entries = data.len(),
            ttl_secs = self.ttl.as_secs(),
            "Catalog metadata cache filled"
        );
        *guard = Some(CacheEntry::new(Arc::clone(&data), self.ttl));
        drop(guard);
        Ok(data)
    }

    /// Whether a non-expired snapshot is held
    pub async fn is_fresh(&self) -> bool {
        self.entry
            .read()
            .await
            .as_ref()
            .is_some_and(|entry| !entry.is_expired())
    }
}
