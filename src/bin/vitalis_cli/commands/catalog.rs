// ABOUTME: `catalog` subcommand - lists built-in KPIs, optionally one category
// ABOUTME: With a measurement file, marks which KPIs its latest values unlock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use anyhow::Result;
use uuid::Uuid;
use vitalis_intelligence::{
    AvailableMetrics, DerivedMetricCalculator, KpiCategory, KpiDefinition, MetricAliasTable,
};

use crate::helpers::{display, input};

pub async fn run(
    file: Option<&Path>,
    owner: Uuid,
    eligible_only: bool,
    category: Option<KpiCategory>,
) -> Result<()> {
    let pipeline = input::pipeline_from_env()?;

    let available = match file {
        Some(path) => {
            let rows = input::load_measurements(path, owner, &pipeline).await?;
            let points = MetricAliasTable::builtin().normalize_all(&rows);
            let mut available = AvailableMetrics::from_latest(&points);
            DerivedMetricCalculator::with_bootstrap_rules().apply(&mut available);
            Some(available)
        }
        None => None,
    };

    let catalog = pipeline.catalog();
    let entries: Vec<&KpiDefinition> = match category {
        Some(category) => catalog.by_category(category).collect(),
        None => catalog.iter().collect(),
    };

    display::display_catalog(&entries, catalog.len(), available.as_ref(), eligible_only);
    Ok(())
}
