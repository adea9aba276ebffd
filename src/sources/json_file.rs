// ABOUTME: Measurement source backed by a JSON export file
// ABOUTME: Accepts a single-owner row array or an object of rows keyed by owner id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;
use vitalis_core::errors::{AppError, AppResult};
use vitalis_core::models::RawMeasurement;

use super::{newest_first, MeasurementSource};

/// Accepted file layouts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MeasurementFile {
    /// One person's export; served for any owner
    Rows(Vec<RawMeasurement>),
    /// Rows keyed by owner id
    ByOwner(HashMap<Uuid, Vec<RawMeasurement>>),
}

/// Reads rows from a JSON file on every fetch
///
/// ```json
/// [{"label": "Body Weight", "value": 72.4, "unit": "kg",
///   "measured_at": "2024-05-01T07:30:00Z", "source": "manual"}]
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileMeasurementSource {
    path: PathBuf,
}

impl JsonFileMeasurementSource {
    /// Create a source for `path`; the file is not read until the first fetch
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File being served
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> AppResult<MeasurementFile> {
        let contents = fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::not_found(format!("Measurement file {}", self.path.display()))
            } else {
                AppError::internal(format!(
                    "Failed to read measurement file {}: {e}",
                    self.path.display()
                ))
            }
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            AppError::invalid_input(format!(
                "Measurement file {} is not a row array or owner map: {e}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl MeasurementSource for JsonFileMeasurementSource {
    fn name(&self) -> &'static str {
        "json-file"
    }

    async fn fetch(&self, owner: Uuid, limit: Option<usize>) -> AppResult<Vec<RawMeasurement>> {
        let rows = match self.read_file().await? {
            MeasurementFile::Rows(rows) => rows,
            MeasurementFile::ByOwner(mut by_owner) => by_owner.remove(&owner).unwrap_or_default(),
        };
        debug!(
            path = %self.path.display(),
            %owner,
            rows = rows.len(),
            "Loaded measurements from file"
        );
        Ok(newest_first(rows, limit))
    }
}
