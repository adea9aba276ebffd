// ABOUTME: Read-only collaborators of the pipeline: measurement rows and catalog metadata
// ABOUTME: Async traits plus in-memory, JSON-file, and static built-in implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Sources
//!
//! The pipeline never writes upstream. It pulls measurement rows for one
//! owner and reads display metadata for canonical metric keys.
//!
//! All implementations must be `Send + Sync` so one instance can serve
//! concurrent invocations.

mod catalog;
mod json_file;
mod memory;

pub use catalog::StaticCatalogMetadataStore;
pub use json_file::JsonFileMeasurementSource;
pub use memory::InMemoryMeasurementSource;

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;
use vitalis_core::errors::AppResult;
use vitalis_core::models::{MetricMetadata, RawMeasurement};

/// Pull-only access to an owner's measurement history
#[async_trait]
pub trait MeasurementSource: Send + Sync {
    /// Source identifier for logs
    fn name(&self) -> &'static str;

    /// Rows for `owner`, newest first, at most `limit` when given
    async fn fetch(&self, owner: Uuid, limit: Option<usize>) -> AppResult<Vec<RawMeasurement>>;
}

/// Read-only display metadata keyed by canonical metric key
#[async_trait]
pub trait CatalogMetadataStore: Send + Sync {
    /// Store identifier for logs
    fn name(&self) -> &'static str;

    /// Full metadata snapshot
    async fn load(&self) -> AppResult<HashMap<String, MetricMetadata>>;
}

/// Sort newest first and apply the optional count bound
///
/// The sort is stable, so rows sharing a timestamp keep their stored order.
pub(crate) fn newest_first(mut rows: Vec<RawMeasurement>, limit: Option<usize>) -> Vec<RawMeasurement> {
    rows.sort_by(|a, b| b.measured_at.cmp(&a.measured_at));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}
