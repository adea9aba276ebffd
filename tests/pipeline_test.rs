// ABOUTME: Integration tests for the analysis pipeline and per-owner service
// ABOUTME: Covers preparation, timeout, provider failures, and reconciliation end to end
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::{
    body_and_lipid_history, default_pipeline, init_test_logging, raw, StubLlmProvider,
    ABBREVIATED_REPLY,
};
use uuid::Uuid;
use vitalis::config::PipelineConfig;
use vitalis::llm::{LlmProvider, MessageRole};
use vitalis::pipeline::{HealthAnalysisPipeline, HealthAnalysisService};
use vitalis::sources::{InMemoryMeasurementSource, StaticCatalogMetadataStore};
use vitalis_core::errors::ErrorCode;
use vitalis_intelligence::builtin_metric_metadata;

#[tokio::test]
async fn test_analyze_reconciles_abbreviated_reply() {
    init_test_logging();
    let pipeline = default_pipeline();
    let provider = StubLlmProvider::replying(ABBREVIATED_REPLY);

    let outcome = pipeline
        .analyze(&provider, &body_and_lipid_history(), &builtin_metric_metadata())
        .await
        .unwrap();

    assert_eq!(provider.calls(), 1);
    assert_eq!(
        outcome.result.analysis.summary,
        "Weight trending down; lipids within range."
    );
    assert_eq!(outcome.result.analysis.qc_issues.len(), 1);
    assert_eq!(outcome.result.analysis.qc_issues[0].issue_type, "duplicate");
    assert!(outcome.result.analysis.trends.is_empty());
    assert_eq!(outcome.model, "stub-model");
    assert_eq!(outcome.usage.unwrap().total_tokens, 150);

    let kpis = &outcome.result.kpis;
    assert_eq!(kpis.calculated.len(), 1);
    assert_eq!(kpis.calculated[0].id, "bmi_class");
    assert_eq!(kpis.report.received, 1);
    assert!(kpis.report.expected > 1);
    assert!(!kpis.report.is_consistent());
    assert!(kpis.report.unexpected_ids.is_empty());
}

#[tokio::test]
async fn test_request_carries_system_prompt_payload_and_json_mode() {
    let pipeline = default_pipeline();
    let provider = StubLlmProvider::replying("{}");

    pipeline
        .analyze(&provider, &body_and_lipid_history(), &HashMap::new())
        .await
        .unwrap();

    let request = provider.last_request().unwrap();
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, MessageRole::System);
    assert_eq!(request.messages[1].role, MessageRole::User);
    assert!(request.messages[1].content.contains("## KPI WORKLIST"));
    assert!(request.messages[1].content.contains("bmi_class|"));
    assert!(request.json_mode);
    assert!(request
        .temperature
        .is_some_and(|t| (t - 0.2).abs() < f32::EPSILON));
}

#[tokio::test]
async fn test_insufficient_data_never_calls_provider() {
    let pipeline = default_pipeline();
    let provider = StubLlmProvider::replying("{}");
    let rows = vec![raw("weight", 70.0, "kg", 0), raw("weight", 71.0, "kg", 1)];

    let err = pipeline
        .analyze(&provider, &rows, &HashMap::new())
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InsufficientData);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_provider_times_out() {
    let config = PipelineConfig {
        inference_timeout_secs: 1,
        ..PipelineConfig::default()
    };
    let pipeline = HealthAnalysisPipeline::with_builtins(config).unwrap();
    let provider = StubLlmProvider::replying("{}").with_delay(Duration::from_secs(30));

    let err = pipeline
        .analyze(&provider, &body_and_lipid_history(), &HashMap::new())
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalTimeout);
    assert!(err.code.is_transient());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_provider_inside_limit_completes() {
    let config = PipelineConfig {
        inference_timeout_secs: 60,
        ..PipelineConfig::default()
    };
    let pipeline = HealthAnalysisPipeline::with_builtins(config).unwrap();
    let provider = StubLlmProvider::replying(r#"{"sum": "late but fine"}"#)
        .with_delay(Duration::from_secs(59));

    let outcome = pipeline
        .analyze(&provider, &body_and_lipid_history(), &HashMap::new())
        .await
        .unwrap();

    assert_eq!(outcome.result.analysis.summary, "late but fine");
}

#[tokio::test]
async fn test_provider_error_is_terminal() {
    let pipeline = default_pipeline();
    let provider = StubLlmProvider::failing(ErrorCode::ExternalRateLimited);

    let err = pipeline
        .analyze(&provider, &body_and_lipid_history(), &HashMap::new())
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalRateLimited);
}

#[tokio::test]
async fn test_reply_without_json_object_is_an_error() {
    let pipeline = default_pipeline();
    let provider = StubLlmProvider::replying("I cannot help with that.");

    let err = pipeline
        .analyze(&provider, &body_and_lipid_history(), &HashMap::new())
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_non_object_fields_are_coerced_not_rejected() {
    let pipeline = default_pipeline();
    let provider = StubLlmProvider::replying(
        r#"{"sum": 42, "tr": "weight falling", "risk": "low", "k": {"id": "bmi_class"}}"#,
    );

    let outcome = pipeline
        .analyze(&provider, &body_and_lipid_history(), &HashMap::new())
        .await
        .unwrap();

    let analysis = &outcome.result.analysis;
    assert_eq!(analysis.summary, "42");
    assert_eq!(analysis.trends.len(), 1);
    assert_eq!(analysis.trends[0].note, "weight falling");
    assert_eq!(analysis.risk_assessment.rationale, "low");
    assert_eq!(outcome.result.kpis.calculated.len(), 1);
}

#[test]
fn test_prepare_is_deterministic_for_fixed_reference_time() {
    let pipeline = default_pipeline();
    let rows = body_and_lipid_history();
    let metadata = builtin_metric_metadata();
    let now = common::base_time();

    let first = pipeline.prepare_at(&rows, &metadata, now).unwrap();
    let second = pipeline.prepare_at(&rows, &metadata, now).unwrap();

    assert_eq!(first.payload.user_message, second.payload.user_message);
    assert_eq!(first.payload.kpi_ids, second.payload.kpi_ids);
}

#[test]
fn test_prepare_samples_each_metric_to_cap() {
    let config = PipelineConfig {
        sample_cap: 5,
        ..PipelineConfig::default()
    };
    let pipeline = HealthAnalysisPipeline::with_builtins(config).unwrap();
    let prepared = pipeline
        .prepare(&body_and_lipid_history(), &builtin_metric_metadata())
        .unwrap();

    let weight = &prepared.sampled["weight"];
    assert_eq!(weight.total_points, 12);
    assert_eq!(weight.points.len(), 5);
    assert_eq!(prepared.sampled["height"].points.len(), 1);
    assert!(prepared.payload.legend.contains("weight|"));
    assert!(prepared.payload.legend.contains("|5/12"));
}

#[test]
fn test_worklist_matches_eligible_catalog_entries() {
    let pipeline = default_pipeline();
    let prepared = pipeline
        .prepare(&body_and_lipid_history(), &HashMap::new())
        .unwrap();

    let eligible: Vec<&str> = prepared.eligibility.eligible_ids();
    let worklist: Vec<&str> = prepared
        .payload
        .kpi_ids
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(eligible, worklist);
    assert!(worklist.contains(&"bmi_class"));
    assert!(prepared.available.contains("non_hdl"));
}

#[tokio::test]
async fn test_service_analyzes_owner_rows_only() {
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let source = InMemoryMeasurementSource::with_measurements(owner, body_and_lipid_history());
    source
        .insert(stranger, raw("Glucose", 95.0, "mg/dL", 0))
        .await;

    let provider = Arc::new(StubLlmProvider::replying(ABBREVIATED_REPLY));
    let service = HealthAnalysisService::new(
        default_pipeline(),
        Arc::new(source),
        Arc::new(StaticCatalogMetadataStore::builtin()),
        Arc::clone(&provider) as Arc<dyn LlmProvider>,
    );

    let outcome = service.analyze_owner(owner).await.unwrap();
    assert_eq!(outcome.result.kpis.calculated[0].id, "bmi_class");
    assert!(service.metadata_cache().is_fresh().await);

    let request = provider.last_request().unwrap();
    assert!(!request.messages[1].content.contains("glucose|"));

    let err = service.analyze_owner(stranger).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientData);
    assert_eq!(provider.calls(), 1);
}
