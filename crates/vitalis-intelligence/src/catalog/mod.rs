// ABOUTME: KPI formula catalog: immutable registry of descriptive formula definitions
// ABOUTME: Validated at construction and injected into the pipeline rather than held globally
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # KPI Catalog
//!
//! Each [`KpiDefinition`] names the canonical metrics it requires and carries
//! a formula as descriptive text. Formulas are never evaluated locally: the
//! payload hands them to the inference step as an instruction list. Only the
//! bootstrap rules in [`crate::derived_metrics`] run as code.

mod builtin;

use std::collections::HashSet;
use std::str::FromStr;
use std::{fmt, slice};

use serde::{Deserialize, Serialize};
use vitalis_core::errors::{AppError, AppResult};

use crate::normalizer::clean_label;

pub use builtin::{BuiltinKpi, BUILTIN_KPIS};

/// Clinical grouping of a KPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiCategory {
    /// Anthropometrics and body composition
    BodyComposition,
    /// Blood pressure, heart rate, fitness
    Cardiovascular,
    /// Lipid panel and lipoproteins
    Lipids,
    /// Glucose and insulin metabolism
    Glycemic,
    /// Kidney function
    Renal,
    /// Liver function and fibrosis scores
    Hepatic,
    /// Blood counts and iron studies
    Hematology,
    /// Inflammatory markers
    Inflammation,
    /// Thyroid axis
    Thyroid,
    /// Sex and stress hormones
    Hormonal,
    /// Vitamins and micronutrient stores
    Micronutrients,
    /// Electrolytes and osmolality
    Electrolytes,
    /// Sleep and activity
    Lifestyle,
}

impl KpiCategory {
    /// Every category, in declaration order
    pub const ALL: [Self; 13] = [
        Self::BodyComposition,
        Self::Cardiovascular,
        Self::Lipids,
        Self::Glycemic,
        Self::Renal,
        Self::Hepatic,
        Self::Hematology,
        Self::Inflammation,
        Self::Thyroid,
        Self::Hormonal,
        Self::Micronutrients,
        Self::Electrolytes,
        Self::Lifestyle,
    ];

    /// String representation used in payloads
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BodyComposition => "body_composition",
            Self::Cardiovascular => "cardiovascular",
            Self::Lipids => "lipids",
            Self::Glycemic => "glycemic",
            Self::Renal => "renal",
            Self::Hepatic => "hepatic",
            Self::Hematology => "hematology",
            Self::Inflammation => "inflammation",
            Self::Thyroid => "thyroid",
            Self::Hormonal => "hormonal",
            Self::Micronutrients => "micronutrients",
            Self::Electrolytes => "electrolytes",
            Self::Lifestyle => "lifestyle",
        }
    }
}

impl FromStr for KpiCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = clean_label(value).replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| {
                AppError::invalid_input(format!(
                    "Unknown KPI category '{value}' (expected one of: {})",
                    Self::ALL.map(|category| category.as_str()).join(", ")
                ))
            })
    }
}

impl fmt::Display for KpiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A KPI formula definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiDefinition {
    /// Stable identifier echoed back by the inference step
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Clinical grouping
    pub category: KpiCategory,
    /// Formula as descriptive text
    pub formula: String,
    /// Canonical metric keys the formula consumes
    #[serde(alias = "requiredMetrics")]
    pub required_metrics: Vec<String>,
    /// What the KPI indicates
    #[serde(default)]
    pub description: String,
}

impl KpiDefinition {
    /// Whether every required metric is among `available`
    #[must_use]
    pub fn is_satisfied_by(&self, available: &HashSet<&str>) -> bool {
        self.required_metrics
            .iter()
            .all(|metric| available.contains(metric.as_str()))
    }

    /// Required metrics absent from `available`, in declaration order
    #[must_use]
    pub fn missing_from<'a>(&'a self, available: &HashSet<&str>) -> Vec<&'a str> {
        self.required_metrics
            .iter()
            .map(String::as_str)
            .filter(|metric| !available.contains(metric))
            .collect()
    }
}

/// Validated, ordered, read-only KPI registry
#[derive(Debug, Clone)]
pub struct KpiCatalog {
    entries: Vec<KpiDefinition>,
}

impl KpiCatalog {
    /// Validate and wrap a list of definitions, keeping their order
    ///
    /// Duplicate required metrics within one entry are collapsed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the list is empty, an id repeats, an
    /// entry requires no metric, or a required key is not a clean canonical key.
    pub fn new(entries: Vec<KpiDefinition>) -> AppResult<Self> {
        if entries.is_empty() {
            return Err(AppError::config("KPI catalog is empty"));
        }

        let mut seen_ids = HashSet::new();
        let mut validated = Vec::with_capacity(entries.len());
        for mut entry in entries {
            if entry.id.trim().is_empty() {
                return Err(AppError::config("KPI catalog entry has an empty id"));
            }
            if !seen_ids.insert(entry.id.clone()) {
                return Err(AppError::config(format!(
                    "Duplicate KPI id '{}' in catalog",
                    entry.id
                )));
            }
            if entry.required_metrics.is_empty() {
                return Err(AppError::config(format!(
                    "KPI '{}' requires no metrics",
                    entry.id
                )));
            }
            if let Some(bad) = entry
                .required_metrics
                .iter()
                .find(|metric| metric.is_empty() || clean_label(metric) != **metric)
            {
                return Err(AppError::config(format!(
                    "KPI '{}' requires non-canonical metric key '{bad}'",
                    entry.id
                )));
            }

            let mut unique = HashSet::new();
            entry
                .required_metrics
                .retain(|metric| unique.insert(metric.clone()));
            validated.push(entry);
        }

        Ok(Self { entries: validated })
    }

    /// Catalog built from [`BUILTIN_KPIS`]
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the built-in table fails validation.
    pub fn builtin() -> AppResult<Self> {
        Self::new(BUILTIN_KPIS.iter().map(BuiltinKpi::to_definition).collect())
    }

    /// Parse a JSON array of definitions
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON and a configuration
    /// error if validation fails.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let entries: Vec<KpiDefinition> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Look up a definition by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&KpiDefinition> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Definitions in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &KpiDefinition> {
        self.entries.iter()
    }

    /// Definitions of one category, in catalog order
    pub fn by_category(&self, category: KpiCategory) -> impl Iterator<Item = &KpiDefinition> {
        self.entries
            .iter()
            .filter(move |entry| entry.category == category)
    }

    /// Number of definitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated catalog
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a KpiCatalog {
    type Item = &'a KpiDefinition;
    type IntoIter = slice::Iter<'a, KpiDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
