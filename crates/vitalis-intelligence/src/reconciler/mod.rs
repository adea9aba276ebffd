// ABOUTME: Maps untrusted inference output onto the canonical AnalysisResult schema
// ABOUTME: Extracts the JSON envelope, applies total defaults, and audits returned KPIs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Response Reconciler
//!
//! The inference step is asked for an abbreviated-key JSON object but nothing
//! guarantees it returns one. Reconciliation has two layers:
//!
//! 1. Envelope: [`extract_json_object`] finds the object in the raw text (bare,
//!    fenced, or embedded in prose). No object at all is a terminal
//!    inference-call failure.
//! 2. Content: [`AnalysisResult::from_loose`] maps whatever the object holds
//!    onto the canonical schema. Missing, extra, or mistyped fields resolve to
//!    typed defaults and never raise.
//!
//! The returned `kpis` array is compared against the locally eligible ids.
//! Mismatches are logged and reported, never treated as failures.

/// Loose JSON decoders
pub mod decode;
/// Canonical result types
pub mod types;

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use vitalis_core::constants::service_names;
use vitalis_core::errors::{AppError, AppResult};

use decode::{loose_list, pick};
pub use types::{
    keys, AnalysisResult, CalculatedKpi, CorrelationInsight, CurrentStateEntry,
    DerivedMetricInsight, Hypothesis, ParadoxInsight, QcIssue, Recommendation, RiskAssessment,
    TrendInsight,
};

/// Keys under which some responses nest the analysis object
///
/// The nested object is only used when the root carries no analysis field
/// of its own.
const ENVELOPE_KEYS: &[&str] = &["analysis", "result"];

/// Find the JSON object in raw inference text
///
/// Tries, in order: the whole text, a fenced code block, and the span from
/// the first `{` to the last `}`.
///
/// # Errors
///
/// Returns an external-service error when no JSON object can be found.
pub fn extract_json_object(response: &str) -> AppResult<Value> {
    let trimmed = response.trim();

    if let Some(value) = parse_object(trimmed) {
        return Ok(value);
    }

    if let Some(value) = fenced_block(trimmed).and_then(parse_object) {
        return Ok(value);
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Some(value) = parse_object(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(AppError::external_service(
        service_names::INFERENCE,
        "Could not extract a JSON object from the inference response",
    ))
}

fn parse_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip the language tag line (```json)
    let body_start = after_fence.find('\n').map_or(0, |newline| newline + 1);
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Comparison of returned KPI ids against the eligible list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KpiReconciliationReport {
    /// Number of eligible KPIs sent
    pub expected: usize,
    /// Number of KPI entries returned
    pub received: usize,
    /// Eligible ids absent from the response, in worklist order
    pub missing_ids: Vec<String>,
    /// Returned ids that were not on the worklist, in response order
    pub unexpected_ids: Vec<String>,
}

impl KpiReconciliationReport {
    /// Compare returned KPIs with the expected ids
    #[must_use]
    pub fn compare(expected_ids: &[String], kpis: &[CalculatedKpi]) -> Self {
        let expected: HashSet<&str> = expected_ids.iter().map(String::as_str).collect();
        let received: HashSet<&str> = kpis.iter().map(|kpi| kpi.id.as_str()).collect();

        let missing_ids = expected_ids
            .iter()
            .filter(|id| !received.contains(id.as_str()))
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        let unexpected_ids = kpis
            .iter()
            .map(|kpi| kpi.id.as_str())
            .filter(|id| !id.is_empty() && !expected.contains(id) && seen.insert(*id))
            .map(str::to_owned)
            .collect();

        Self {
            expected: expected_ids.len(),
            received: kpis.len(),
            missing_ids,
            unexpected_ids,
        }
    }

    /// Counts match and every id lines up
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.expected == self.received
            && self.missing_ids.is_empty()
            && self.unexpected_ids.is_empty()
    }
}

/// Returned KPIs with their audit report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiReconciliation {
    /// KPI values as returned, decoded loosely
    pub calculated: Vec<CalculatedKpi>,
    /// Audit against the eligible list
    pub report: KpiReconciliationReport,
}

/// Canonical analysis plus the separately reconciled KPI array
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciledResponse {
    /// Canonical analysis
    pub analysis: AnalysisResult,
    /// Returned KPIs and their audit
    pub kpis: KpiReconciliation,
}

/// Reconciles inference output against the KPI worklist that was sent
#[derive(Debug, Clone, Default)]
pub struct ResponseReconciler {
    expected_kpi_ids: Vec<String>,
}

impl ResponseReconciler {
    /// Create a reconciler for the eligible KPI ids in worklist order
    #[must_use]
    pub fn new(expected_kpi_ids: Vec<String>) -> Self {
        Self { expected_kpi_ids }
    }

    /// Eligible ids the response is audited against
    #[must_use]
    pub fn expected_kpi_ids(&self) -> &[String] {
        &self.expected_kpi_ids
    }

    /// Extract the JSON object from raw text, then reconcile it
    ///
    /// # Errors
    ///
    /// Returns an external-service error when the text holds no JSON object.
    pub fn reconcile_text(&self, response: &str) -> AppResult<ReconciledResponse> {
        let value = extract_json_object(response)?;
        Ok(self.reconcile(&value))
    }

    /// Reconcile an already-parsed value; never fails
    #[must_use]
    pub fn reconcile(&self, value: &Value) -> ReconciledResponse {
        let empty = Map::new();
        let root = value.as_object().unwrap_or(&empty);
        let nested = pick(root, ENVELOPE_KEYS).and_then(Value::as_object);

        let analysis = match nested {
            Some(nested) if !AnalysisResult::has_fields(root) => {
                debug!("Reading analysis from nested envelope");
                AnalysisResult::from_object(nested)
            }
            _ => AnalysisResult::from_loose(value),
        };

        let kpi_value =
            pick(root, keys::KPIS).or_else(|| nested.and_then(|nested| pick(nested, keys::KPIS)));
        let calculated: Vec<CalculatedKpi> = loose_list(kpi_value);
        let report = KpiReconciliationReport::compare(&self.expected_kpi_ids, &calculated);

        if report.is_consistent() {
            debug!(kpis = report.received, "Returned KPIs match the worklist");
        } else {
            warn!(
                expected = report.expected,
                received = report.received,
                missing = ?report.missing_ids,
                unexpected = ?report.unexpected_ids,
                "Returned KPIs differ from the eligible worklist"
            );
        }

        ReconciledResponse {
            analysis,
            kpis: KpiReconciliation { calculated, report },
        }
    }
}
