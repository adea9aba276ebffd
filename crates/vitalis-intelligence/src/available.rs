// ABOUTME: Latest-value map of canonical metrics for a single pipeline invocation
// ABOUTME: Seeded from normalized points, extended in place by bootstrap derivations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use vitalis_core::models::{MeasurementPoint, MetricValue};

/// Latest value per canonical metric key
///
/// Ordered by key so every rendering built from it is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailableMetrics {
    values: BTreeMap<String, MetricValue>,
}

impl AvailableMetrics {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the newest value of each metric
    ///
    /// When two points of a metric share the newest timestamp, the first one
    /// in input order wins.
    #[must_use]
    pub fn from_latest(points: &[MeasurementPoint]) -> Self {
        let mut newest: BTreeMap<&str, &MeasurementPoint> = BTreeMap::new();
        for point in points {
            match newest.get(point.metric.as_str()) {
                Some(current) if current.measured_at >= point.measured_at => {}
                _ => {
                    newest.insert(point.metric.as_str(), point);
                }
            }
        }

        let values = newest
            .into_iter()
            .map(|(metric, point)| {
                (
                    metric.to_owned(),
                    MetricValue::new(point.value, point.unit.clone()),
                )
            })
            .collect();

        Self { values }
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: MetricValue) -> Option<MetricValue> {
        self.values.insert(key.into(), value)
    }

    /// Value and unit for a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.values.get(key)
    }

    /// Bare value for a key
    #[must_use]
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).map(|metric| metric.value)
    }

    /// Whether a key is present
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Key set for membership scans
    #[must_use]
    pub fn key_set(&self) -> HashSet<&str> {
        self.keys().collect()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of metrics
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no metric is available
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_from_latest_keeps_newest_value() {
        let older = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let points = vec![
            MeasurementPoint::new("weight", 72.0, "kg", newer),
            MeasurementPoint::new("weight", 75.0, "kg", older),
            MeasurementPoint::new("height", 1.80, "m", older),
        ];

        let available = AvailableMetrics::from_latest(&points);
        assert_eq!(available.len(), 2);
        assert_eq!(available.value("weight"), Some(72.0));
        assert_eq!(available.get("height").unwrap().unit, "m");
    }

    #[test]
    fn test_from_latest_tie_keeps_first() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let points = vec![
            MeasurementPoint::new("glucose", 90.0, "mg/dL", at),
            MeasurementPoint::new("glucose", 95.0, "mg/dL", at),
        ];
        let available = AvailableMetrics::from_latest(&points);
        assert_eq!(available.value("glucose"), Some(90.0));
    }
}
