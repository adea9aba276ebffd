// ABOUTME: Cross-stage property tests for the deterministic intelligence stages
// ABOUTME: Normalization idempotence, derivation unlocking, sampling shape, reconciler totality
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashSet;

use common::{base_time, raw};
use serde_json::json;
use vitalis_intelligence::{
    evaluate_eligibility, resolve_eligible, sample_series, AnalysisResult, AvailableMetrics,
    DerivedMetricCalculator, KpiCatalog, MetricAliasTable, ResponseReconciler, SamplingCap,
};

#[test]
fn test_normalization_is_idempotent() {
    let table = MetricAliasTable::builtin();
    for label in [
        "Body Weight",
        "  HDL-C ",
        "Total Cholesterol",
        "LDL",
        "Some Unlisted Marker (mg/dL)",
        "weight",
    ] {
        let once = table.normalize(label);
        assert_eq!(table.normalize(&once), once, "label {label:?}");
    }
    for key in table.canonical_keys() {
        assert_eq!(table.normalize(key), key);
    }
}

#[test]
fn test_bmi_derivation_unlocks_bmi_kpis() {
    let table = MetricAliasTable::builtin();
    let rows = vec![
        raw("Body Weight", 70.0, "kg", 0),
        raw("Height", 175.0, "cm", 0),
    ];
    let catalog = KpiCatalog::builtin().unwrap();

    let mut available = AvailableMetrics::from_latest(&table.normalize_all(&rows));
    let before: Vec<String> = evaluate_eligibility(&catalog, &available)
        .eligible
        .into_iter()
        .map(|kpi| kpi.id)
        .collect();
    assert!(!before.iter().any(|id| id == "bmi_class"));

    let derived = DerivedMetricCalculator::with_bootstrap_rules().apply(&mut available);
    assert_eq!(derived.len(), 1);
    let bmi = available.value("bmi").unwrap();
    assert!((bmi - 22.857).abs() < 0.01, "bmi was {bmi}");

    let report = evaluate_eligibility(&catalog, &available);
    assert!(report.eligible.iter().any(|kpi| kpi.id == "bmi_class"));
    assert!(report
        .near_misses
        .iter()
        .any(|miss| miss.kpi_id == "absi" && miss.missing_metric == "waist"));
}

#[test]
fn test_eligible_entries_only_require_available_metrics() {
    let table = MetricAliasTable::builtin();
    let rows = common::body_and_lipid_history();
    let mut available = AvailableMetrics::from_latest(&table.normalize_all(&rows));
    DerivedMetricCalculator::with_bootstrap_rules().apply(&mut available);
    let catalog = KpiCatalog::builtin().unwrap();
    let keys = available.key_set();

    let eligible = resolve_eligible(&catalog, &keys);
    assert!(!eligible.is_empty());
    for kpi in &eligible {
        let required: HashSet<&str> = kpi.required_metrics.iter().map(String::as_str).collect();
        assert!(required.is_subset(&keys), "{} requires {required:?}", kpi.id);
    }

    let eligible_ids: HashSet<&str> = eligible.iter().map(|kpi| kpi.id.as_str()).collect();
    for kpi in &catalog {
        if !eligible_ids.contains(kpi.id.as_str()) {
            assert!(!kpi.missing_from(&keys).is_empty());
        }
    }
}

#[test]
fn test_sampling_twelve_points_to_five_is_deterministic() {
    let table = MetricAliasTable::builtin();
    let rows: Vec<_> = (0..12_i64)
        .map(|day| raw("weight", 60.0 + day as f64, "kg", day))
        .collect();
    let mut points = table.normalize_all(&rows);
    let cap = SamplingCap::new(5).unwrap();

    let first = sample_series(&points, cap);
    points.reverse();
    let second = sample_series(&points, cap);

    let days: Vec<i64> = first
        .iter()
        .map(|point| (point.measured_at - base_time()).num_days())
        .collect();
    assert_eq!(days, vec![11, 8, 5, 2, 0]);
    assert_eq!(first, second);
}

#[test]
fn test_sampling_below_cap_keeps_everything() {
    let table = MetricAliasTable::builtin();
    let rows: Vec<_> = (0..3).map(|day| raw("weight", 70.0, "kg", day)).collect();
    let points = table.normalize_all(&rows);

    assert_eq!(sample_series(&points, SamplingCap::new(8).unwrap()).len(), 3);
    assert!(SamplingCap::new(0).is_err());
}

#[test]
fn test_empty_object_reconciles_to_defaults() {
    let reconciled = ResponseReconciler::new(vec!["bmi_class".to_owned()]).reconcile(&json!({}));

    assert_eq!(reconciled.analysis, AnalysisResult::default());
    assert!(reconciled.kpis.calculated.is_empty());
    assert_eq!(reconciled.kpis.report.missing_ids, vec!["bmi_class".to_owned()]);
}

#[test]
fn test_abbreviated_keys_map_to_canonical_fields() {
    let reconciled = ResponseReconciler::new(Vec::new()).reconcile(&json!({
        "sum": "stable",
        "qc": [{"item": "glucose", "type": "range", "detail": "implausible"}],
        "nn": ["merged weight labels"],
        "rec": [{"action": "repeat lipid panel", "priority": "medium"}],
        "unc": "single glucose reading",
        "k": [{"id": "extra_kpi", "value": "4.2 units"}]
    }));

    let analysis = &reconciled.analysis;
    assert_eq!(analysis.summary, "stable");
    assert_eq!(analysis.qc_issues[0].item, "glucose");
    assert_eq!(analysis.normalization_notes, vec!["merged weight labels".to_owned()]);
    assert_eq!(analysis.recommendations_next_steps[0].action, "repeat lipid panel");
    assert_eq!(analysis.uncertainties, vec!["single glucose reading".to_owned()]);
    assert_eq!(reconciled.kpis.calculated[0].value, Some(4.2));
    assert_eq!(reconciled.kpis.report.unexpected_ids, vec!["extra_kpi".to_owned()]);
}

#[test]
fn test_non_object_root_reconciles_to_defaults() {
    let reconciled =
        ResponseReconciler::new(Vec::new()).reconcile(&json!(["not", "an", "object"]));
    assert_eq!(reconciled.analysis, AnalysisResult::default());
}
