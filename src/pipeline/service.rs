// ABOUTME: Per-owner analysis entry point wiring measurement source, metadata cache, and provider
// ABOUTME: Shares one pipeline and one metadata snapshot across concurrent invocations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;
use vitalis_core::errors::AppResult;

use super::{AnalysisOutcome, HealthAnalysisPipeline, PreparedAnalysis};
use crate::cache::CatalogMetadataCache;
use crate::llm::LlmProvider;
use crate::sources::{CatalogMetadataStore, MeasurementSource};

/// Runs the pipeline for one owner at a time; cheap to clone and share
#[derive(Clone)]
pub struct HealthAnalysisService {
    pipeline: Arc<HealthAnalysisPipeline>,
    source: Arc<dyn MeasurementSource>,
    metadata: Arc<CatalogMetadataCache>,
    provider: Arc<dyn LlmProvider>,
}

impl HealthAnalysisService {
    /// Wire a service; the metadata cache TTL comes from the pipeline config
    #[must_use]
    pub fn new(
        pipeline: HealthAnalysisPipeline,
        source: Arc<dyn MeasurementSource>,
        metadata_store: Arc<dyn CatalogMetadataStore>,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        let ttl = pipeline.config().catalog_cache_ttl();
        Self {
            pipeline: Arc::new(pipeline),
            source,
            metadata: Arc::new(CatalogMetadataCache::new(metadata_store, ttl)),
            provider,
        }
    }

    /// Pipeline in use
    #[must_use]
    pub fn pipeline(&self) -> &HealthAnalysisPipeline {
        &self.pipeline
    }

    /// Shared metadata cache
    #[must_use]
    pub fn metadata_cache(&self) -> &CatalogMetadataCache {
        &self.metadata
    }

    /// Fetch rows and metadata, then run the synchronous stages
    ///
    /// # Errors
    ///
    /// Returns source or metadata errors, or an insufficient-data error
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn prepare_owner(&self, owner: Uuid) -> AppResult<PreparedAnalysis> {
        let limit = self.pipeline.config().max_measurements;
        let rows = self.source.fetch(owner, Some(limit)).await?;
        let metadata = self.metadata.get().await?;
        self.pipeline.prepare(&rows, &metadata)
    }

    /// Full analysis for `owner`
    ///
    /// # Errors
    ///
    /// Returns any preparation error before the provider is called, or the
    /// terminal inference error
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn analyze_owner(&self, owner: Uuid) -> AppResult<AnalysisOutcome> {
        let prepared = self.prepare_owner(owner).await?;
        let outcome = self
            .pipeline
            .complete(self.provider.as_ref(), &prepared)
            .await?;
        info!(
            %owner,
            measurements = prepared.measurement_count,
            kpis = outcome.result.kpis.calculated.len(),
            "Owner analysis complete"
        );
        Ok(outcome)
    }
}
