// ABOUTME: Input loading helpers for vitalis-cli
// ABOUTME: Builds the pipeline from the environment and reads measurement and response files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::info;
use uuid::Uuid;
use vitalis::config::PipelineConfig;
use vitalis::pipeline::HealthAnalysisPipeline;
use vitalis::sources::{JsonFileMeasurementSource, MeasurementSource};
use vitalis_core::models::RawMeasurement;

/// Pipeline over the built-in tables, configured from `VITALIS_*` variables
pub fn pipeline_from_env() -> Result<HealthAnalysisPipeline> {
    let config = PipelineConfig::from_env().context("Invalid pipeline configuration")?;
    Ok(HealthAnalysisPipeline::with_builtins(config)?)
}

/// Newest-first rows for `owner`, bounded by the configured maximum
pub async fn load_measurements(
    path: &Path,
    owner: Uuid,
    pipeline: &HealthAnalysisPipeline,
) -> Result<Vec<RawMeasurement>> {
    let source = JsonFileMeasurementSource::new(path);
    let rows = source
        .fetch(owner, Some(pipeline.config().max_measurements))
        .await?;
    info!(file = %path.display(), rows = rows.len(), "Loaded measurements");
    Ok(rows)
}

/// Whole file as text
pub async fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
