// ABOUTME: Configuration module for the health-metrics pipeline
// ABOUTME: Environment-driven settings with typed defaults and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! Settings come from environment variables only. Every variable has a
//! default; a variable that is set but invalid is a fatal configuration error
//! rather than a silent fallback.

/// Configuration error types
pub mod error;
/// Pipeline settings
pub mod pipeline;

pub use error::ConfigError;
pub use pipeline::PipelineConfig;
