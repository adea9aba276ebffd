// ABOUTME: Pipeline constants organized by concern (sampling, payload, inference, cache)
// ABOUTME: Defaults used by configuration loading and by the algorithms themselves
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Pipeline constants and defaults

/// Time-series sampling defaults
pub mod sampling {
    /// Default maximum points retained per metric
    pub const DEFAULT_SAMPLE_CAP: usize = 8;
}

/// Payload rendering defaults
pub mod payload {
    /// Default number of decimal places for rendered values
    pub const DEFAULT_VALUE_PRECISION: usize = 2;

    /// Upper bound on rendered precision
    pub const MAX_VALUE_PRECISION: usize = 6;

    /// Characters per token used by the advisory size estimate
    pub const CHARS_PER_TOKEN: usize = 4;

    /// Column delimiter in the compact data table
    pub const FIELD_DELIMITER: char = '|';
}

/// Measurement acquisition limits
pub mod measurements {
    /// Minimum raw measurement count before an inference call is worth issuing
    pub const DEFAULT_MIN_MEASUREMENTS: usize = 3;

    /// Count bound passed to the measurement source
    pub const DEFAULT_MAX_MEASUREMENTS: usize = 5_000;
}

/// Inference call defaults
pub mod inference {
    /// Hard timeout on the inference await
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Low temperature keeps the structured output stable
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;

    /// Completion budget for the structured analysis
    pub const DEFAULT_MAX_TOKENS: u32 = 4_096;
}

/// Catalog metadata cache defaults
pub mod cache {
    /// Catalog metadata changes rarely; a short TTL keeps edits visible
    pub const DEFAULT_CATALOG_TTL_SECS: u64 = 300; // 5 minutes
}

/// Environment variable names
pub mod env_config {
    /// Sampling cap per metric
    pub const SAMPLE_CAP: &str = "VITALIS_SAMPLE_CAP";
    /// Rendered value precision
    pub const VALUE_PRECISION: &str = "VITALIS_VALUE_PRECISION";
    /// Date granularity (`full`, `date-only`, `relative-day-count`)
    pub const DATE_FORMAT: &str = "VITALIS_DATE_FORMAT";
    /// Minimum measurement count
    pub const MIN_MEASUREMENTS: &str = "VITALIS_MIN_MEASUREMENTS";
    /// Measurement source count bound
    pub const MAX_MEASUREMENTS: &str = "VITALIS_MAX_MEASUREMENTS";
    /// Inference timeout in seconds
    pub const INFERENCE_TIMEOUT_SECS: &str = "VITALIS_INFERENCE_TIMEOUT_SECS";
    /// Catalog metadata cache TTL in seconds
    pub const CATALOG_CACHE_TTL_SECS: &str = "VITALIS_CATALOG_CACHE_TTL_SECS";
    /// Inference temperature
    pub const LLM_TEMPERATURE: &str = "VITALIS_LLM_TEMPERATURE";
    /// Inference completion budget
    pub const LLM_MAX_TOKENS: &str = "VITALIS_LLM_MAX_TOKENS";
    /// Inference endpoint base URL
    pub const LLM_BASE_URL: &str = "VITALIS_LLM_BASE_URL";
    /// Inference model name
    pub const LLM_MODEL: &str = "VITALIS_LLM_MODEL";
    /// Inference API key (optional)
    pub const LLM_API_KEY: &str = "VITALIS_LLM_API_KEY";
}

/// Service names for structured logging
pub mod service_names {
    /// Default service name
    pub const VITALIS: &str = "vitalis";

    /// External inference step, as named in errors and logs
    pub const INFERENCE: &str = "inference";
}
