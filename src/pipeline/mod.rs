// ABOUTME: Orchestrates one analysis invocation from raw rows to the reconciled result
// ABOUTME: Synchronous preparation stages, then a single timed inference await
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Health Analysis Pipeline
//!
//! ```text
//! raw rows -> normalize -> latest values -> bootstrap derivations
//!          -> KPI eligibility -> sampling -> payload
//!          -> inference (timed) -> reconcile
//! ```
//!
//! Everything before the inference call is a pure transform over the
//! invocation's own data. The inference await is the only suspension point;
//! a timeout or provider error ends the invocation with one terminal error
//! and nothing partial is returned.

/// Source + cache + provider wiring
pub mod service;

pub use service::HealthAnalysisService;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use vitalis_core::errors::{AppError, AppResult};
use vitalis_core::models::{MetricMetadata, RawMeasurement};
use vitalis_intelligence::{
    evaluate_eligibility, sample_by_metric, AssembledPayload, AvailableMetrics,
    DerivedMetricCalculator, DerivedValue, EligibilityReport, KpiCatalog, MetricAliasTable,
    PayloadAssembler, PayloadInput, ReconciledResponse, ResponseReconciler, SampledSeries,
    SamplingCap,
};

use crate::config::PipelineConfig;
use crate::llm::{get_analysis_system_prompt, ChatMessage, ChatRequest, LlmProvider, TokenUsage};

/// Everything computed before the inference call
#[derive(Debug, Clone, Serialize)]
pub struct PreparedAnalysis {
    /// Raw rows received
    pub measurement_count: usize,
    /// Latest value per metric, bootstrap derivations included
    pub available: AvailableMetrics,
    /// Values produced by bootstrap rules
    pub derived: Vec<DerivedValue>,
    /// Eligible KPIs and near misses
    pub eligibility: EligibilityReport,
    /// Sampled history per metric
    pub sampled: BTreeMap<String, SampledSeries>,
    /// Rendered request text
    pub payload: AssembledPayload,
}

impl PreparedAnalysis {
    /// Reconciler audited against this invocation's worklist
    #[must_use]
    pub fn reconciler(&self) -> ResponseReconciler {
        ResponseReconciler::new(self.payload.kpi_ids.clone())
    }
}

/// Result of a completed invocation
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    /// Canonical analysis plus the audited KPI array
    pub result: ReconciledResponse,
    /// Model that answered
    pub model: String,
    /// Token usage reported by the provider
    pub usage: Option<TokenUsage>,
    /// Advisory token estimate of the request payload
    pub estimated_tokens: usize,
}

/// Holds the immutable stage configuration for many invocations
#[derive(Debug, Clone)]
pub struct HealthAnalysisPipeline {
    config: PipelineConfig,
    sample_cap: SamplingCap,
    aliases: MetricAliasTable,
    calculator: DerivedMetricCalculator,
    catalog: KpiCatalog,
}

impl HealthAnalysisPipeline {
    /// Build a pipeline from explicit stage configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation
    pub fn new(
        config: PipelineConfig,
        aliases: MetricAliasTable,
        calculator: DerivedMetricCalculator,
        catalog: KpiCatalog,
    ) -> AppResult<Self> {
        config.validate()?;
        let sample_cap = config.sampling_cap()?;
        Ok(Self {
            config,
            sample_cap,
            aliases,
            calculator,
            catalog,
        })
    }

    /// Build a pipeline over the built-in alias table, rules, and catalog
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid or the built-in
    /// catalog fails validation
    pub fn with_builtins(config: PipelineConfig) -> AppResult<Self> {
        Self::new(
            config,
            MetricAliasTable::builtin(),
            DerivedMetricCalculator::with_bootstrap_rules(),
            KpiCatalog::builtin()?,
        )
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// KPI catalog in use
    #[must_use]
    pub const fn catalog(&self) -> &KpiCatalog {
        &self.catalog
    }

    /// Run every stage up to the inference call, rendering relative dates
    /// against the current time
    ///
    /// # Errors
    ///
    /// See [`prepare_at`](Self::prepare_at)
    pub fn prepare(
        &self,
        raw: &[RawMeasurement],
        metadata: &HashMap<String, MetricMetadata>,
    ) -> AppResult<PreparedAnalysis> {
        self.prepare_at(raw, metadata, Utc::now())
    }

    /// Run every stage up to the inference call
    ///
    /// # Errors
    ///
    /// Returns an insufficient-data error when fewer than the configured
    /// minimum of rows are given, checked before any other work
    pub fn prepare_at(
        &self,
        raw: &[RawMeasurement],
        metadata: &HashMap<String, MetricMetadata>,
        now: DateTime<Utc>,
    ) -> AppResult<PreparedAnalysis> {
        if raw.len() < self.config.min_measurements {
            return Err(AppError::insufficient_data(
                raw.len(),
                self.config.min_measurements,
            ));
        }

        let points = self.aliases.normalize_all(raw);
        let mut available = AvailableMetrics::from_latest(&points);
        let derived = self.calculator.apply(&mut available);
        let eligibility = evaluate_eligibility(&self.catalog, &available);
        let sampled = sample_by_metric(&points, self.sample_cap);

        let assembler = PayloadAssembler::new(self.config.payload_options(now)?);
        let payload = assembler.assemble(&PayloadInput {
            sampled: &sampled,
            available: &available,
            derived: &derived,
            eligibility: &eligibility,
            metadata,
        });

        debug!(
            rows = raw.len(),
            points = points.len(),
            metrics = available.len(),
            derived = derived.len(),
            eligible = eligibility.eligible.len(),
            near_misses = eligibility.near_misses.len(),
            estimated_tokens = payload.estimated_tokens,
            "Analysis prepared"
        );

        Ok(PreparedAnalysis {
            measurement_count: raw.len(),
            available,
            derived,
            eligibility,
            sampled,
            payload,
        })
    }

    /// Chat request for a prepared invocation
    #[must_use]
    pub fn build_request(&self, prepared: &PreparedAnalysis) -> ChatRequest {
        ChatRequest::new(vec![
            ChatMessage::system(get_analysis_system_prompt()),
            ChatMessage::user(prepared.payload.user_message.clone()),
        ])
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens)
        .with_json_mode()
    }

    /// Issue the inference call and reconcile its output
    ///
    /// # Errors
    ///
    /// Returns a timeout error when the call outlives the configured limit,
    /// the provider's error when the call fails, or an external-service
    /// error when the reply holds no JSON object
    pub async fn complete(
        &self,
        provider: &dyn LlmProvider,
        prepared: &PreparedAnalysis,
    ) -> AppResult<AnalysisOutcome> {
        let request = self.build_request(prepared);
        let limit = self.config.inference_timeout();

        info!(
            provider = provider.name(),
            kpis = prepared.payload.kpi_ids.len(),
            estimated_tokens = prepared.payload.estimated_tokens,
            timeout_secs = limit.as_secs(),
            "Issuing inference call"
        );

        let response = timeout(limit, provider.complete(&request))
            .await
            .map_err(|_| {
                warn!(timeout_secs = limit.as_secs(), "Inference call timed out");
                AppError::inference_timeout(limit.as_secs())
            })??;

        let result = prepared.reconciler().reconcile_text(&response.content)?;
        info!(
            model = %response.model,
            kpis_returned = result.kpis.report.received,
            kpis_consistent = result.kpis.report.is_consistent(),
            "Inference result reconciled"
        );

        Ok(AnalysisOutcome {
            result,
            model: response.model,
            usage: response.usage,
            estimated_tokens: prepared.payload.estimated_tokens,
        })
    }

    /// Prepare, call, and reconcile in one step
    ///
    /// # Errors
    ///
    /// Returns any error from [`prepare`](Self::prepare) or
    /// [`complete`](Self::complete); no inference call is made when
    /// preparation fails
    pub async fn analyze(
        &self,
        provider: &dyn LlmProvider,
        raw: &[RawMeasurement],
        metadata: &HashMap<String, MetricMetadata>,
    ) -> AppResult<AnalysisOutcome> {
        let prepared = self.prepare(raw, metadata)?;
        self.complete(provider, &prepared).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use vitalis_core::errors::ErrorCode;
    use vitalis_core::models::MeasurementOrigin;

    fn row(label: &str, value: f64, unit: &str, day: i64) -> RawMeasurement {
        RawMeasurement {
            label: label.to_owned(),
            value,
            unit: unit.to_owned(),
            measured_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + Duration::days(day),
            source: MeasurementOrigin::Manual,
        }
    }

    fn pipeline() -> HealthAnalysisPipeline {
        HealthAnalysisPipeline::with_builtins(PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_insufficient_data_before_any_work() {
        let err = pipeline()
            .prepare(&[row("weight", 70.0, "kg", 0)], &HashMap::new())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientData);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            sample_cap: 0,
            ..PipelineConfig::default()
        };
        let err = HealthAnalysisPipeline::with_builtins(config).unwrap_err();
        assert!(err.code.is_configuration());
    }

    #[test]
    fn test_prepare_derives_bmi_and_builds_worklist() {
        let raw = vec![
            row("Body Weight", 70.0, "kg", 0),
            row("Height", 175.0, "cm", 0),
            row("weight", 71.0, "kg", 1),
        ];
        let prepared = pipeline().prepare(&raw, &HashMap::new()).unwrap();

        assert!(prepared.available.contains("bmi"));
        assert_eq!(prepared.measurement_count, 3);
        assert!(prepared.payload.kpi_ids.iter().any(|id| id == "bmi_class"));
        assert_eq!(prepared.sampled["weight"].total_points, 2);
    }

    #[test]
    fn test_request_carries_prompt_and_payload() {
        let raw = vec![
            row("weight", 70.0, "kg", 0),
            row("weight", 71.0, "kg", 1),
            row("weight", 72.0, "kg", 2),
        ];
        let pipeline = pipeline();
        let prepared = pipeline.prepare(&raw, &HashMap::new()).unwrap();
        let request = pipeline.build_request(&prepared);

        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[1].content.contains("## DATA"));
        assert!(request.json_mode);
        assert_eq!(request.max_tokens, Some(4_096));
    }
}
