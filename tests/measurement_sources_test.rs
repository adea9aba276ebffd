// ABOUTME: Integration tests for measurement sources and the static metadata store
// ABOUTME: Exercises JSON export layouts on disk, ordering, limits, and error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::io::Write;

use common::raw;
use serde_json::json;
use tempfile::NamedTempFile;
use uuid::Uuid;
use vitalis::sources::{
    CatalogMetadataStore, InMemoryMeasurementSource, JsonFileMeasurementSource,
    MeasurementSource, StaticCatalogMetadataStore,
};
use vitalis_core::errors::ErrorCode;
use vitalis_core::models::MeasurementOrigin;

fn write_json(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(value.to_string().as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_row_array_is_served_newest_first() {
    let file = write_json(&json!([
        {"label": "Body Weight", "value": 72.4, "unit": "kg", "measured_at": "2024-05-01T07:30:00Z"},
        {"metric": "Glucose", "value": 94, "unit": "mg/dL", "measured_at": "2024-05-03T07:30:00Z", "source": "ocr"},
        {"label": "Body Weight", "value": 72.0, "measured_at": "2024-05-02T07:30:00Z"}
    ]));
    let source = JsonFileMeasurementSource::new(file.path());

    let rows = source.fetch(Uuid::new_v4(), None).await.unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].label, "Glucose");
    assert_eq!(rows[0].source, MeasurementOrigin::Ocr);
    assert_eq!(rows[1].unit, "");
    assert_eq!(rows[2].source, MeasurementOrigin::Manual);
}

#[tokio::test]
async fn test_limit_keeps_newest_rows() {
    let file = write_json(&json!([
        {"label": "weight", "value": 70, "unit": "kg", "measured_at": "2024-05-01T00:00:00Z"},
        {"label": "weight", "value": 71, "unit": "kg", "measured_at": "2024-05-02T00:00:00Z"},
        {"label": "weight", "value": 72, "unit": "kg", "measured_at": "2024-05-03T00:00:00Z"}
    ]));
    let source = JsonFileMeasurementSource::new(file.path());

    let rows = source.fetch(Uuid::nil(), Some(2)).await.unwrap();

    let values: Vec<f64> = rows.iter().map(|row| row.value).collect();
    assert_eq!(values, vec![72.0, 71.0]);
}

#[tokio::test]
async fn test_owner_keyed_file_isolates_owners() {
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    let file = write_json(&json!({
        owner.to_string(): [
            {"label": "weight", "value": 70, "unit": "kg", "measured_at": "2024-05-01T00:00:00Z"}
        ],
        other.to_string(): [
            {"label": "glucose", "value": 90, "unit": "mg/dL", "measured_at": "2024-05-01T00:00:00Z"},
            {"label": "glucose", "value": 91, "unit": "mg/dL", "measured_at": "2024-05-02T00:00:00Z"}
        ]
    }));
    let source = JsonFileMeasurementSource::new(file.path());

    assert_eq!(source.fetch(owner, None).await.unwrap().len(), 1);
    assert_eq!(source.fetch(other, None).await.unwrap().len(), 2);
    assert!(source.fetch(Uuid::new_v4(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = JsonFileMeasurementSource::new(dir.path().join("absent.json"));

    let err = source.fetch(Uuid::nil(), None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_malformed_file_is_invalid_input() {
    let file = write_json(&json!({"rows": "not a list"}));
    let source = JsonFileMeasurementSource::new(file.path());

    let err = source.fetch(Uuid::nil(), None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_in_memory_source_replace_and_limit() {
    let owner = Uuid::new_v4();
    let source = InMemoryMeasurementSource::new();
    source
        .replace(
            owner,
            vec![
                raw("weight", 70.0, "kg", 0),
                raw("weight", 71.0, "kg", 2),
                raw("weight", 72.0, "kg", 1),
            ],
        )
        .await;

    assert_eq!(source.count(owner).await, 3);
    let rows = source.fetch(owner, Some(2)).await.unwrap();
    let values: Vec<f64> = rows.iter().map(|row| row.value).collect();
    assert_eq!(values, vec![71.0, 72.0]);
    assert_eq!(source.name(), "memory");
}

#[tokio::test]
async fn test_builtin_metadata_store_covers_canonical_metrics() {
    let store = StaticCatalogMetadataStore::builtin();
    let metadata = store.load().await.unwrap();

    let weight = &metadata["weight"];
    assert!(!weight.display_name.is_empty());
    assert!(!weight.category.is_empty());
    assert!(metadata.contains_key("hdl"));
    assert_eq!(store.name(), "static");
}
