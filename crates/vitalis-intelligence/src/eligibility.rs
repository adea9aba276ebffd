// ABOUTME: Filters the KPI catalog to entries whose required metrics are all available
// ABOUTME: Also reports near misses that lack exactly one required metric
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::available::AvailableMetrics;
use crate::catalog::{KpiCatalog, KpiDefinition};

/// Catalog entries whose required metrics are a subset of `available`
///
/// Catalog order is preserved so the rendered worklist is reproducible.
#[must_use]
pub fn resolve_eligible<'a>(
    catalog: &'a KpiCatalog,
    available: &HashSet<&str>,
) -> Vec<&'a KpiDefinition> {
    catalog
        .iter()
        .filter(|entry| entry.is_satisfied_by(available))
        .collect()
}

/// A KPI missing exactly one required metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearMiss {
    /// KPI id
    pub kpi_id: String,
    /// KPI name
    pub kpi_name: String,
    /// The one metric that would make it eligible
    pub missing_metric: String,
}

/// Eligible KPIs plus near misses, both in catalog order
#[derive(Debug, Clone, Default, Serialize)]
pub struct EligibilityReport {
    /// Entries with every required metric present
    pub eligible: Vec<KpiDefinition>,
    /// Entries lacking exactly one required metric
    pub near_misses: Vec<NearMiss>,
}

impl EligibilityReport {
    /// Eligible ids in catalog order
    #[must_use]
    pub fn eligible_ids(&self) -> Vec<&str> {
        self.eligible.iter().map(|entry| entry.id.as_str()).collect()
    }
}

/// Single scan over the catalog classifying each entry as eligible, a near
/// miss, or neither
#[must_use]
pub fn evaluate_eligibility(catalog: &KpiCatalog, available: &AvailableMetrics) -> EligibilityReport {
    let keys = available.key_set();
    let mut report = EligibilityReport::default();

    for entry in catalog {
        match entry.missing_from(&keys).as_slice() {
            [] => report.eligible.push(entry.clone()),
            [missing] => report.near_misses.push(NearMiss {
                kpi_id: entry.id.clone(),
                kpi_name: entry.name.clone(),
                missing_metric: (*missing).to_owned(),
            }),
            _ => {}
        }
    }

    debug!(
        catalog = catalog.len(),
        available = keys.len(),
        eligible = report.eligible.len(),
        near_misses = report.near_misses.len(),
        "KPI eligibility resolved"
    );
    report
}
