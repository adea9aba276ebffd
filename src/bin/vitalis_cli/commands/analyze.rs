// ABOUTME: `analyze` subcommand - full pipeline run against the configured inference endpoint
// ABOUTME: Wires the JSON-file source, built-in metadata store, and OpenAI-compatible provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use uuid::Uuid;
use vitalis::llm::{LlmProvider, OpenAiCompatibleProvider};
use vitalis::pipeline::HealthAnalysisService;
use vitalis::sources::{JsonFileMeasurementSource, StaticCatalogMetadataStore};

use crate::helpers::{display, input};

pub async fn run(file: PathBuf, owner: Uuid, result_only: bool) -> Result<()> {
    let pipeline = input::pipeline_from_env()?;
    let provider = OpenAiCompatibleProvider::from_env()?;
    info!(
        provider = provider.display_name(),
        model = provider.default_model(),
        "Using inference endpoint"
    );

    let service = HealthAnalysisService::new(
        pipeline,
        Arc::new(JsonFileMeasurementSource::new(file)),
        Arc::new(StaticCatalogMetadataStore::builtin()),
        Arc::new(provider),
    );

    let outcome = service.analyze_owner(owner).await?;
    display::display_outcome(&outcome, result_only)
}
