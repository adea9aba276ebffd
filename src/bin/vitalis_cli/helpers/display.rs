// ABOUTME: Output formatting helpers for vitalis-cli
// ABOUTME: Renders prepared payloads, analysis outcomes, and the KPI catalog to stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use serde::Serialize;
use vitalis::pipeline::{AnalysisOutcome, PreparedAnalysis};
use vitalis_intelligence::{AvailableMetrics, KpiDefinition};

const RULE_WIDTH: usize = 80;

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Display the payload text followed by its size counters
pub fn display_prepared(prepared: &PreparedAnalysis) {
    let payload = &prepared.payload;
    println!("{}", payload.user_message);
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Rows received:     {}", prepared.measurement_count);
    println!("Metrics:           {}", payload.counts.metrics);
    println!("Sampled points:    {}", payload.counts.points);
    println!("Derived values:    {}", prepared.derived.len());
    println!("KPI worklist:      {}", payload.counts.kpis);
    println!("Near misses:       {}", payload.counts.near_misses);
    println!("Estimated tokens:  {}", payload.estimated_tokens);
}

/// Display an analysis outcome as JSON
pub fn display_outcome(outcome: &AnalysisOutcome, result_only: bool) -> Result<()> {
    if result_only {
        return print_json(&outcome.result);
    }
    print_json(outcome)
}

/// Display catalog entries, with eligibility when measurements were given
pub fn display_catalog(
    entries: &[&KpiDefinition],
    catalog_size: usize,
    available: Option<&AvailableMetrics>,
    eligible_only: bool,
) {
    let keys = available.map(AvailableMetrics::key_set);
    let mut shown = 0_usize;

    println!("{:<28} {:<14} STATUS", "ID", "CATEGORY");
    println!("{}", "-".repeat(RULE_WIDTH));
    for kpi in entries {
        let status = match &keys {
            None => String::new(),
            Some(keys) => {
                let missing = kpi.missing_from(keys);
                if missing.is_empty() {
                    "eligible".to_owned()
                } else if eligible_only {
                    continue;
                } else {
                    format!("missing {}", missing.join(", "))
                }
            }
        };
        println!("{:<28} {:<14} {status}", kpi.id, kpi.category.as_str());
        shown += 1;
    }
    println!("{}", "-".repeat(RULE_WIDTH));
    println!("{shown} of {catalog_size} KPIs");
}
