// ABOUTME: In-memory measurement source keyed by owner id
// ABOUTME: Serves tests and embedding callers that already hold rows in memory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;
use vitalis_core::errors::AppResult;
use vitalis_core::models::RawMeasurement;

use super::{newest_first, MeasurementSource};

/// Measurement rows held in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryMeasurementSource {
    rows: Arc<RwLock<HashMap<Uuid, Vec<RawMeasurement>>>>,
}

impl InMemoryMeasurementSource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding one owner's rows
    #[must_use]
    pub fn with_measurements(owner: Uuid, rows: Vec<RawMeasurement>) -> Self {
        let mut map = HashMap::new();
        map.insert(owner, rows);
        Self {
            rows: Arc::new(RwLock::new(map)),
        }
    }

    /// Append a row for `owner`
    pub async fn insert(&self, owner: Uuid, row: RawMeasurement) {
        self.rows.write().await.entry(owner).or_default().push(row);
    }

    /// Replace every row for `owner`
    pub async fn replace(&self, owner: Uuid, rows: Vec<RawMeasurement>) {
        self.rows.write().await.insert(owner, rows);
    }

    /// Number of rows stored for `owner`
    pub async fn count(&self, owner: Uuid) -> usize {
        self.rows.read().await.get(&owner).map_or(0, Vec::len)
    }
}

#[async_trait]
impl MeasurementSource for InMemoryMeasurementSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, owner: Uuid, limit: Option<usize>) -> AppResult<Vec<RawMeasurement>> {
        let rows = self.rows.read().await.get(&owner).cloned().unwrap_or_default();
        debug!(%owner, stored = rows.len(), ?limit, "Fetching in-memory measurements");
        Ok(newest_first(rows, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use vitalis_core::models::MeasurementOrigin;

    fn row(label: &str, days: i64) -> RawMeasurement {
        RawMeasurement {
            label: label.to_owned(),
            value: 1.0,
            unit: String::new(),
            measured_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap() + Duration::days(days),
            source: MeasurementOrigin::Manual,
        }
    }

    #[tokio::test]
    async fn test_fetch_newest_first_with_limit() {
        let owner = Uuid::new_v4();
        let source =
            InMemoryMeasurementSource::with_measurements(owner, vec![row("a", 0), row("b", 2), row("c", 1)]);

        let rows = source.fetch(owner, Some(2)).await.unwrap();
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_unknown_owner_is_empty() {
        let source = InMemoryMeasurementSource::new();
        assert!(source.fetch(Uuid::new_v4(), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_replace() {
        let owner = Uuid::new_v4();
        let source = InMemoryMeasurementSource::new();
        source.insert(owner, row("a", 0)).await;
        source.insert(owner, row("b", 1)).await;
        assert_eq!(source.count(owner).await, 2);

        source.replace(owner, vec![row("c", 0)]).await;
        assert_eq!(source.count(owner).await, 1);
    }
}
