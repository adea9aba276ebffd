// ABOUTME: Renders sampled history as a compact delimited table plus the KPI worklist
// ABOUTME: Produces an advisory token estimate; never evaluates KPI formulas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Payload Assembler
//!
//! The user message handed to the inference step is a set of plain-text
//! blocks, each a `|`-delimited table with a header row:
//!
//! - `DATA`: sampled points, `metric|value|unit|date`
//! - `LEGEND`: display name and category per metric, when metadata exists
//! - `DERIVED`: values computed locally by bootstrap rules
//! - `KPI WORKLIST`: eligible formulas with the current input values
//! - `DATA GAPS`: KPIs that one more measurement would unlock
//!
//! The token figure is `chars / 4` rounded up, good enough for cost
//! accounting but not an exact count.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vitalis_core::constants::payload::{
    CHARS_PER_TOKEN, DEFAULT_VALUE_PRECISION, FIELD_DELIMITER, MAX_VALUE_PRECISION,
};
use vitalis_core::errors::{AppError, AppResult};
use vitalis_core::models::MetricMetadata;

use crate::available::AvailableMetrics;
use crate::derived_metrics::DerivedValue;
use crate::eligibility::EligibilityReport;
use crate::sampler::SampledSeries;

/// How timestamps are rendered in the data table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateGranularity {
    /// RFC 3339 with second precision
    Full,
    /// `YYYY-MM-DD`
    #[default]
    DateOnly,
    /// Whole days before the reference time, e.g. `14d`
    #[serde(rename = "relative-day-count")]
    RelativeDays,
}

impl DateGranularity {
    /// Configuration string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::DateOnly => "date-only",
            Self::RelativeDays => "relative-day-count",
        }
    }

    /// Render a timestamp relative to `reference`
    #[must_use]
    pub fn render(self, at: DateTime<Utc>, reference: DateTime<Utc>) -> String {
        match self {
            Self::Full => at.to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::DateOnly => at.format("%Y-%m-%d").to_string(),
            Self::RelativeDays => format!("{}d", (reference - at).num_days()),
        }
    }
}

impl FromStr for DateGranularity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "date-only" | "date_only" | "date" => Ok(Self::DateOnly),
            "relative-day-count" | "relative" | "relative-days" => Ok(Self::RelativeDays),
            other => Err(AppError::config(format!(
                "Unknown date format '{other}' (expected full, date-only or relative-day-count)"
            ))),
        }
    }
}

/// Rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadOptions {
    precision: usize,
    date_granularity: DateGranularity,
    reference_time: DateTime<Utc>,
}

impl Default for PayloadOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_VALUE_PRECISION,
            date_granularity: DateGranularity::default(),
            reference_time: Utc::now(),
        }
    }
}

impl PayloadOptions {
    /// Validate rendering options
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `precision` exceeds the supported maximum.
    pub fn new(
        precision: usize,
        date_granularity: DateGranularity,
        reference_time: DateTime<Utc>,
    ) -> AppResult<Self> {
        if precision > MAX_VALUE_PRECISION {
            return Err(AppError::config(format!(
                "Value precision {precision} exceeds maximum {MAX_VALUE_PRECISION}"
            )));
        }
        Ok(Self {
            precision,
            date_granularity,
            reference_time,
        })
    }

    /// Decimal places for rendered values
    #[must_use]
    pub const fn precision(&self) -> usize {
        self.precision
    }

    /// Date rendering mode
    #[must_use]
    pub const fn date_granularity(&self) -> DateGranularity {
        self.date_granularity
    }

    /// Reference for relative day counts
    #[must_use]
    pub const fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }
}

/// Everything the assembler renders
#[derive(Debug, Clone, Copy)]
pub struct PayloadInput<'a> {
    /// Sampled history per metric
    pub sampled: &'a BTreeMap<String, SampledSeries>,
    /// Latest values, bootstrap derivations included
    pub available: &'a AvailableMetrics,
    /// Values computed by bootstrap rules
    pub derived: &'a [DerivedValue],
    /// Eligible KPIs and near misses
    pub eligibility: &'a EligibilityReport,
    /// Display metadata keyed by canonical metric key
    pub metadata: &'a HashMap<String, MetricMetadata>,
}

/// Size figures for caller-side accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PayloadCounts {
    /// Distinct metrics in the data table
    pub metrics: usize,
    /// Rows in the data table
    pub points: usize,
    /// Entries in the KPI worklist
    pub kpis: usize,
    /// Entries in the data-gap block
    pub near_misses: usize,
}

/// Rendered request text for the inference step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledPayload {
    /// Complete user message, all blocks joined
    pub user_message: String,
    /// `DATA` block
    pub data_table: String,
    /// `LEGEND` block, empty without metadata
    pub legend: String,
    /// `DERIVED` block, empty when nothing was derived
    pub derived_block: String,
    /// `KPI WORKLIST` block
    pub kpi_worklist: String,
    /// `DATA GAPS` block, empty without near misses
    pub data_gap_hints: String,
    /// Eligible KPI ids in worklist order
    pub kpi_ids: Vec<String>,
    /// Size figures
    pub counts: PayloadCounts,
    /// Advisory token estimate of `user_message`
    pub estimated_tokens: usize,
}

/// Renders pipeline state into the inference request text
#[derive(Debug, Clone, Default)]
pub struct PayloadAssembler {
    options: PayloadOptions,
}

impl PayloadAssembler {
    /// Create an assembler with validated options
    #[must_use]
    pub const fn new(options: PayloadOptions) -> Self {
        Self { options }
    }

    /// Rendering options
    #[must_use]
    pub const fn options(&self) -> &PayloadOptions {
        &self.options
    }

    /// Render every block and the joined user message
    #[must_use]
    pub fn assemble(&self, input: &PayloadInput<'_>) -> AssembledPayload {
        let data_table = self.render_data_table(input.sampled);
        let legend = render_legend(input.sampled, input.metadata);
        let derived_block = self.render_derived(input.derived);
        let kpi_worklist = self.render_worklist(input.eligibility, input.available);
        let data_gap_hints = render_data_gaps(input.eligibility);

        let mut user_message = String::new();
        for (title, block) in [
            ("DATA", &data_table),
            ("LEGEND", &legend),
            ("DERIVED", &derived_block),
            ("KPI WORKLIST", &kpi_worklist),
            ("DATA GAPS", &data_gap_hints),
        ] {
            if block.is_empty() {
                continue;
            }
            if !user_message.is_empty() {
                user_message.push('\n');
            }
            user_message.push_str("## ");
            user_message.push_str(title);
            user_message.push('\n');
            user_message.push_str(block);
        }

        let counts = PayloadCounts {
            metrics: input.sampled.len(),
            points: input.sampled.values().map(|series| series.points.len()).sum(),
            kpis: input.eligibility.eligible.len(),
            near_misses: input.eligibility.near_misses.len(),
        };
        let estimated_tokens = estimate_tokens(&user_message);

        debug!(
            metrics = counts.metrics,
            points = counts.points,
            kpis = counts.kpis,
            estimated_tokens,
            "Payload assembled"
        );

        AssembledPayload {
            user_message,
            data_table,
            legend,
            derived_block,
            kpi_worklist,
            data_gap_hints,
            kpi_ids: input
                .eligibility
                .eligible
                .iter()
                .map(|entry| entry.id.clone())
                .collect(),
            counts,
            estimated_tokens,
        }
    }

    fn value(&self, value: f64) -> String {
        format!("{value:.prec$}", prec = self.options.precision)
    }

    fn render_data_table(&self, sampled: &BTreeMap<String, SampledSeries>) -> String {
        let mut out = header(&["metric", "value", "unit", "date"]);
        for series in sampled.values() {
            for point in &series.points {
                let date = self
                    .options
                    .date_granularity
                    .render(point.measured_at, self.options.reference_time);
                push_row(
                    &mut out,
                    &[&series.metric, &self.value(point.value), &point.unit, &date],
                );
            }
        }
        out
    }

    fn render_derived(&self, derived: &[DerivedValue]) -> String {
        if derived.is_empty() {
            return String::new();
        }
        let mut out = header(&["metric", "value", "unit", "from"]);
        for value in derived {
            push_row(
                &mut out,
                &[
                    &value.metric,
                    &self.value(value.value),
                    &value.unit,
                    &value.inputs.join(","),
                ],
            );
        }
        out
    }

    fn render_worklist(&self, eligibility: &EligibilityReport, available: &AvailableMetrics) -> String {
        let mut out = header(&["id", "name", "formula", "inputs"]);
        for entry in &eligibility.eligible {
            let inputs = entry
                .required_metrics
                .iter()
                .filter_map(|key| {
                    available.get(key).map(|metric| {
                        if metric.unit.is_empty() {
                            format!("{key}={}", self.value(metric.value))
                        } else {
                            format!("{key}={} {}", self.value(metric.value), metric.unit)
                        }
                    })
                })
                .collect::<Vec<_>>()
                .join("; ");
            push_row(&mut out, &[&entry.id, &entry.name, &entry.formula, &inputs]);
        }
        out
    }
}

fn render_legend(
    sampled: &BTreeMap<String, SampledSeries>,
    metadata: &HashMap<String, MetricMetadata>,
) -> String {
    let rows: Vec<[String; 4]> = sampled
        .values()
        .filter_map(|series| {
            metadata.get(&series.metric).map(|meta| {
                [
                    series.metric.clone(),
                    meta.display_name.clone(),
                    meta.category.clone(),
                    format!("{}/{}", series.points.len(), series.total_points),
                ]
            })
        })
        .collect();
    if rows.is_empty() {
        return String::new();
    }

    let mut out = header(&["metric", "name", "category", "sampled/total"]);
    for row in &rows {
        push_row(&mut out, &[&row[0], &row[1], &row[2], &row[3]]);
    }
    out
}

fn render_data_gaps(eligibility: &EligibilityReport) -> String {
    if eligibility.near_misses.is_empty() {
        return String::new();
    }
    let mut out = header(&["id", "name", "missing"]);
    for miss in &eligibility.near_misses {
        push_row(&mut out, &[&miss.kpi_id, &miss.kpi_name, &miss.missing_metric]);
    }
    out
}

/// Advisory token estimate: characters divided by four, rounded up
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

fn header(columns: &[&str]) -> String {
    let mut out = String::new();
    push_row(&mut out, columns);
    out
}

fn push_row(out: &mut String, cells: &[&str]) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(FIELD_DELIMITER);
        }
        first = false;
        out.extend(cell.chars().map(|c| {
            if c == FIELD_DELIMITER || c == '\n' || c == '\r' {
                ' '
            } else {
                c
            }
        }));
    }
    out.push('\n');
}
