// ABOUTME: Catalog metadata store serving a fixed map of display names and categories
// ABOUTME: Defaults to the built-in canonical metric registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use vitalis_core::errors::AppResult;
use vitalis_core::models::MetricMetadata;
use vitalis_intelligence::builtin_metric_metadata;

use super::CatalogMetadataStore;

/// Metadata fixed at construction
#[derive(Debug, Clone)]
pub struct StaticCatalogMetadataStore {
    entries: Arc<HashMap<String, MetricMetadata>>,
}

impl StaticCatalogMetadataStore {
    /// Serve the given entries
    #[must_use]
    pub fn new(entries: HashMap<String, MetricMetadata>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Serve metadata for every built-in canonical metric
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_metric_metadata())
    }
}

impl Default for StaticCatalogMetadataStore {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl CatalogMetadataStore for StaticCatalogMetadataStore {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn load(&self) -> AppResult<HashMap<String, MetricMetadata>> {
        Ok(self.entries.as_ref().clone())
    }
}
