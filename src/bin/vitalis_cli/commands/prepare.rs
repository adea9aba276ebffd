// ABOUTME: `prepare` subcommand - runs every stage up to the inference call
// ABOUTME: Prints the payload text or the full prepared analysis as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use anyhow::Result;
use uuid::Uuid;
use vitalis::sources::{CatalogMetadataStore, StaticCatalogMetadataStore};

use crate::helpers::{display, input};
use crate::OutputFormat;

pub async fn run(file: &Path, owner: Uuid, format: OutputFormat) -> Result<()> {
    let pipeline = input::pipeline_from_env()?;
    let rows = input::load_measurements(file, owner, &pipeline).await?;
    let metadata = StaticCatalogMetadataStore::builtin().load().await?;
    let prepared = pipeline.prepare(&rows, &metadata)?;

    match format {
        OutputFormat::Text => {
            display::display_prepared(&prepared);
            Ok(())
        }
        OutputFormat::Json => display::print_json(&prepared),
    }
}
