// ABOUTME: `reconcile` subcommand - turns a saved inference response into the canonical result
// ABOUTME: The expected worklist comes from --kpis or from a measurement file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use anyhow::Result;
use tracing::warn;
use uuid::Uuid;
use vitalis::sources::{CatalogMetadataStore, StaticCatalogMetadataStore};
use vitalis_intelligence::ResponseReconciler;

use crate::helpers::{display, input};

pub async fn run(
    response: &Path,
    kpis: Vec<String>,
    measurements: Option<&Path>,
    owner: Uuid,
) -> Result<()> {
    let text = input::read_text(response).await?;

    let reconciler = match measurements {
        Some(file) => {
            let pipeline = input::pipeline_from_env()?;
            let rows = input::load_measurements(file, owner, &pipeline).await?;
            let metadata = StaticCatalogMetadataStore::builtin().load().await?;
            pipeline.prepare(&rows, &metadata)?.reconciler()
        }
        None => {
            if kpis.is_empty() {
                warn!("No KPI worklist given; every returned KPI will be reported as unexpected");
            }
            ResponseReconciler::new(kpis)
        }
    };

    let result = reconciler.reconcile_text(&text)?;
    display::print_json(&result)
}
