// ABOUTME: Reduces per-metric history to a bounded subset keeping newest and oldest points
// ABOUTME: Middle points are taken at a fixed floor-divided stride across the sorted series
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Time-Series Sampler
//!
//! For a cap `N` and a series sorted newest-first:
//!
//! - `len <= N`: every point
//! - `N == 1`: the newest point
//! - `N == 2`: newest and oldest
//! - `N > 2`: newest, then the points at `i * step` for `i` in `1..=N-2`
//!   where `step = (len - 2) / (N - 2)` (floor, indices clamped to `len - 1`),
//!   then the oldest
//!
//! When `len - 2` is not a multiple of `N - 2` the stride leaves a wider gap
//! before the oldest point. Ties on timestamp keep input order.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use serde::Serialize;
use vitalis_core::constants::sampling::DEFAULT_SAMPLE_CAP;
use vitalis_core::errors::{AppError, AppResult};
use vitalis_core::models::MeasurementPoint;

/// Maximum number of points kept per metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplingCap(NonZeroUsize);

impl SamplingCap {
    /// Validate a cap
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a cap of zero.
    pub fn new(cap: usize) -> AppResult<Self> {
        NonZeroUsize::new(cap)
            .map(Self)
            .ok_or_else(|| AppError::config("Sampling cap must be at least 1"))
    }

    /// Cap as a plain count
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for SamplingCap {
    fn default() -> Self {
        NonZeroUsize::new(DEFAULT_SAMPLE_CAP).map_or(Self(NonZeroUsize::MIN), Self)
    }
}

impl TryFrom<usize> for SamplingCap {
    type Error = AppError;

    fn try_from(cap: usize) -> AppResult<Self> {
        Self::new(cap)
    }
}

/// Sampled history of one metric, newest-first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledSeries {
    /// Canonical metric key
    pub metric: String,
    /// Retained points, newest-first
    pub points: Vec<MeasurementPoint>,
    /// Length of the full history before sampling
    pub total_points: usize,
}

fn sort_newest_first(points: &mut [MeasurementPoint]) {
    points.sort_by(|a, b| b.measured_at.cmp(&a.measured_at));
}

/// Sample one metric's points, in any input order, down to `cap`
#[must_use]
pub fn sample_series(points: &[MeasurementPoint], cap: SamplingCap) -> Vec<MeasurementPoint> {
    let cap = cap.get();
    let mut sorted = points.to_vec();
    sort_newest_first(&mut sorted);

    let len = sorted.len();
    if len <= cap {
        return sorted;
    }

    let newest = 0;
    let oldest = len - 1;
    let indices: Vec<usize> = match cap {
        1 => vec![newest],
        2 => vec![newest, oldest],
        _ => {
            let middle_count = cap - 2;
            let step = (len - 2) / middle_count;
            let mut indices = Vec::with_capacity(cap);
            indices.push(newest);
            indices.extend((1..=middle_count).map(|i| (i * step).min(oldest)));
            indices.push(oldest);
            indices
        }
    };

    let mut sampled: Vec<MeasurementPoint> = indices
        .into_iter()
        .map(|index| sorted[index].clone())
        .collect();
    sort_newest_first(&mut sampled);
    sampled
}

/// Group points by metric and sample each group
///
/// Keyed by metric so iteration order is deterministic.
#[must_use]
pub fn sample_by_metric(
    points: &[MeasurementPoint],
    cap: SamplingCap,
) -> BTreeMap<String, SampledSeries> {
    let mut grouped: BTreeMap<&str, Vec<MeasurementPoint>> = BTreeMap::new();
    for point in points {
        grouped
            .entry(point.metric.as_str())
            .or_default()
            .push(point.clone());
    }

    grouped
        .into_iter()
        .map(|(metric, history)| {
            let series = SampledSeries {
                metric: metric.to_owned(),
                points: sample_series(&history, cap),
                total_points: history.len(),
            };
            (metric.to_owned(), series)
        })
        .collect()
}
