// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides measurement fixtures and a scripted inference provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `vitalis`
//!
//! Fixtures build raw rows on a fixed calendar so payload text is stable
//! across runs, and [`StubLlmProvider`] stands in for the inference endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as DayDuration, TimeZone, Utc};
use tokio::time::sleep;
use vitalis::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage};
use vitalis::config::PipelineConfig;
use vitalis::pipeline::HealthAnalysisPipeline;
use vitalis_core::errors::{AppError, ErrorCode};
use vitalis_core::models::{MeasurementOrigin, RawMeasurement};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}

/// Fixed reference day for fixtures
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
}

/// Raw row `day` days after [`base_time`]
pub fn raw(label: &str, value: f64, unit: &str, day: i64) -> RawMeasurement {
    RawMeasurement {
        label: label.to_owned(),
        value,
        unit: unit.to_owned(),
        measured_at: base_time() + DayDuration::days(day),
        source: MeasurementOrigin::Manual,
    }
}

/// Weight, height, and a lipid panel spread over a few weeks
pub fn body_and_lipid_history() -> Vec<RawMeasurement> {
    let mut rows = vec![
        raw("Height", 175.0, "cm", 0),
        raw("HDL Cholesterol", 52.0, "mg/dL", 14),
        raw("Total Cholesterol", 195.0, "mg/dL", 14),
        raw("Triglycerides", 120.0, "mg/dL", 14),
    ];
    for day in 0..12_i32 {
        rows.push(raw(
            "Body Weight",
            f64::from(day).mul_add(-0.2, 72.0),
            "kg",
            i64::from(day),
        ));
    }
    rows
}

/// Defaults-only pipeline
pub fn default_pipeline() -> HealthAnalysisPipeline {
    HealthAnalysisPipeline::with_builtins(PipelineConfig::default()).unwrap()
}

/// A compact inference reply using abbreviated keys
pub const ABBREVIATED_REPLY: &str = r#"Here is the analysis:
```json
{
  "sum": "Weight trending down; lipids within range.",
  "qc": [{"item": "weight", "type": "duplicate", "detail": "two readings on day 3"}],
  "k": [
    {"id": "bmi_class", "name": "BMI Classification", "value": 22.9, "unit": "kg/m²", "interpretation": "normal"}
  ]
}
```"#;

/// What the stub does when called
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Answer with this completion text
    Text(String),
    /// Fail with this error code
    Fail(ErrorCode),
}

/// Scripted inference provider that records every request it receives
pub struct StubLlmProvider {
    reply: StubReply,
    delay: Duration,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl StubLlmProvider {
    /// Answer every call with `content`
    pub fn replying(content: impl Into<String>) -> Self {
        Self::new(StubReply::Text(content.into()))
    }

    /// Fail every call with `code`
    pub fn failing(code: ErrorCode) -> Self {
        Self::new(StubReply::Fail(code))
    }

    fn new(reply: StubReply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Sleep before answering
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `complete` calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most recent request received
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for StubLlmProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn display_name(&self) -> &str {
        "Stub Provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::structured_output()
    }

    fn default_model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match &self.reply {
            StubReply::Text(content) => Ok(ChatResponse {
                content: content.clone(),
                model: "stub-model".to_owned(),
                usage: Some(TokenUsage {
                    prompt_tokens: 100,
                    completion_tokens: 50,
                    total_tokens: 150,
                }),
                finish_reason: Some("stop".to_owned()),
            }),
            StubReply::Fail(code) => Err(AppError::new(*code, "scripted failure")),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}
