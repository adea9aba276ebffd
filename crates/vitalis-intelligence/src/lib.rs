// ABOUTME: Health-metrics intelligence engine: normalization through reconciliation
// ABOUTME: Pure CPU-bound pipeline stages with no I/O and no async
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Vitalis Intelligence
//!
//! Deterministic stages that turn free-text-labelled measurement history into
//! a bounded inference payload, and turn the untrusted inference output back
//! into a canonical result.
//!
//! Stages, in dependency order:
//!
//! 1. [`normalizer`]: free-text label to canonical metric key
//! 2. [`derived_metrics`]: bootstrap formulas (BMI, Non-HDL, HOMA-IR, ...)
//! 3. [`catalog`] + [`eligibility`]: KPI formulas whose inputs are all present
//! 4. [`sampler`]: bounded, representative subset of each metric's history
//! 5. [`payload`]: compact tabular text plus the KPI worklist
//! 6. [`reconciler`]: untrusted JSON to the canonical [`reconciler::AnalysisResult`]

/// Latest-value map keyed by canonical metric key
pub mod available;
/// KPI formula catalog
pub mod catalog;
/// Bootstrap derived-metric rules
pub mod derived_metrics;
/// Catalog filtering by available metrics
pub mod eligibility;
/// Free-text label normalization
pub mod normalizer;
/// Inference payload rendering
pub mod payload;
/// Inference output reconciliation
pub mod reconciler;
/// Time-series sampling
pub mod sampler;

pub use available::AvailableMetrics;
pub use catalog::{BuiltinKpi, KpiCatalog, KpiCategory, KpiDefinition, BUILTIN_KPIS};
pub use derived_metrics::{DerivationRule, DerivedMetricCalculator, DerivedValue, BOOTSTRAP_RULES};
pub use eligibility::{evaluate_eligibility, resolve_eligible, EligibilityReport, NearMiss};
pub use normalizer::{
    builtin_metric_metadata, clean_label, CanonicalMetric, MetricAliasTable, CANONICAL_METRICS,
};
pub use payload::{
    estimate_tokens, AssembledPayload, DateGranularity, PayloadAssembler, PayloadCounts,
    PayloadInput, PayloadOptions,
};
pub use reconciler::{
    extract_json_object, AnalysisResult, CalculatedKpi, KpiReconciliation,
    KpiReconciliationReport, ReconciledResponse, ResponseReconciler,
};
pub use sampler::{sample_by_metric, sample_series, SampledSeries, SamplingCap};
