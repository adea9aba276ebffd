// ABOUTME: Main library entry point for the Vitalis health-metrics pipeline
// ABOUTME: Async plumbing around the pure stages: config, logging, sources, cache, inference
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Vitalis
//!
//! Turns free-text-labelled measurement history into a bounded inference
//! payload with a KPI worklist, calls an external inference endpoint once,
//! and reconciles whatever comes back into a canonical, always well-formed
//! analysis result.
//!
//! ## Architecture
//!
//! - **`vitalis-core`**: errors, constants, measurement models
//! - **`vitalis-intelligence`**: the deterministic stages (normalizer,
//!   derivations, catalog, eligibility, sampler, payload, reconciler)
//! - **this crate**: configuration, logging, data sources, the metadata
//!   cache, the inference provider, and orchestration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use vitalis::config::PipelineConfig;
//! use vitalis::llm::OpenAiCompatibleProvider;
//! use vitalis::pipeline::{HealthAnalysisPipeline, HealthAnalysisService};
//! use vitalis::sources::{JsonFileMeasurementSource, StaticCatalogMetadataStore};
//! use vitalis_core::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let pipeline = HealthAnalysisPipeline::with_builtins(PipelineConfig::from_env()?)?;
//!     let service = HealthAnalysisService::new(
//!         pipeline,
//!         Arc::new(JsonFileMeasurementSource::new("measurements.json")),
//!         Arc::new(StaticCatalogMetadataStore::builtin()),
//!         Arc::new(OpenAiCompatibleProvider::from_env()?),
//!     );
//!     let outcome = service.analyze_owner(Uuid::nil()).await?;
//!     println!("{}", outcome.result.analysis.summary);
//!     Ok(())
//! }
//! ```

/// Catalog metadata caching
pub mod cache;

/// Environment-driven configuration
pub mod config;

/// Inference provider abstraction and OpenAI-compatible client
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Invocation orchestration
pub mod pipeline;

/// Measurement and metadata sources
pub mod sources;

pub use vitalis_core::errors;
pub use vitalis_core::models;
