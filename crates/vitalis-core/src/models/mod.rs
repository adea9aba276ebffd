// ABOUTME: Measurement data model shared by every stage of the metrics pipeline
// ABOUTME: Raw free-text rows, canonical points, latest values, and catalog metadata
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Measurement models
//!
//! Rows arrive from the measurement source as [`RawMeasurement`] with a
//! free-text label. The normalizer turns them into [`MeasurementPoint`]s keyed
//! by a canonical metric key; everything downstream works on points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a measurement entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementOrigin {
    /// Typed in by the user
    #[default]
    Manual,
    /// Extracted from a scanned document
    Ocr,
}

impl MeasurementOrigin {
    /// String representation used in payloads and storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Ocr => "ocr",
        }
    }
}

impl fmt::Display for MeasurementOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A measurement row as stored upstream, labelled with free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurement {
    /// Free-text label ("Body Weight", "HbA1c", ...)
    #[serde(alias = "metric")]
    pub label: String,
    /// Measured value
    pub value: f64,
    /// Unit as recorded
    #[serde(default)]
    pub unit: String,
    /// When the measurement was taken
    pub measured_at: DateTime<Utc>,
    /// Entry channel
    #[serde(default)]
    pub source: MeasurementOrigin,
}

/// A measurement keyed by its canonical metric key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    /// Canonical metric key
    pub metric: String,
    /// Measured value
    pub value: f64,
    /// Unit as recorded
    pub unit: String,
    /// When the measurement was taken
    pub measured_at: DateTime<Utc>,
    /// Entry channel
    pub source: MeasurementOrigin,
}

impl MeasurementPoint {
    /// Create a point for an already-canonical metric key
    #[must_use]
    pub fn new(
        metric: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        measured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            metric: metric.into(),
            value,
            unit: unit.into(),
            measured_at,
            source: MeasurementOrigin::Manual,
        }
    }

    /// Override the entry channel
    #[must_use]
    pub const fn with_source(mut self, source: MeasurementOrigin) -> Self {
        self.source = source;
        self
    }
}

/// Latest value of a metric with its unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    /// Value
    pub value: f64,
    /// Unit
    pub unit: String,
}

impl MetricValue {
    /// Create a new metric value
    #[must_use]
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// Display metadata for a canonical metric key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricMetadata {
    /// Human-readable name
    pub display_name: String,
    /// Grouping category
    pub category: String,
}
