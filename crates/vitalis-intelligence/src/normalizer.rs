// ABOUTME: Maps free-text measurement labels to canonical metric keys via an alias table
// ABOUTME: Case/whitespace-insensitive, idempotent, and falls back to the cleaned label on miss
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Metric Normalizer
//!
//! Measurements arrive with whatever label the user typed or OCR produced
//! ("Body Weight", "HbA1c", "LDL-C"). Before any grouping, every label is
//! mapped to a canonical key so one real-world quantity never ends up split
//! across differently-spelled keys.
//!
//! Lookup cleans the label (lowercase, trim, collapse inner whitespace) and
//! consults the alias table. A miss returns the cleaned label itself, so
//! uncatalogued metrics remain usable under their own key.
//!
//! Every canonical key is registered as an alias of itself and an alias can
//! never point at two keys, which makes `normalize` idempotent.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;
use vitalis_core::errors::{AppError, AppResult};
use vitalis_core::models::{MeasurementPoint, MetricMetadata, RawMeasurement};

/// A canonical metric with its display metadata and known label variants
#[derive(Debug, Clone, Copy)]
pub struct CanonicalMetric {
    /// Canonical key
    pub key: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
    /// Grouping category
    pub category: &'static str,
    /// Free-text label variants
    pub aliases: &'static [&'static str],
}

/// Built-in canonical metric registry
pub static CANONICAL_METRICS: &[CanonicalMetric] = &[
    // Demographics
    CanonicalMetric { key: "age", display_name: "Age", category: "demographics", aliases: &["age (years)", "age years", "years old"] },
    // Body composition
    CanonicalMetric { key: "weight", display_name: "Body Weight", category: "body_composition", aliases: &["body weight", "bodyweight", "weight (kg)", "weight kg", "body mass", "wt", "peso"] },
    CanonicalMetric { key: "height", display_name: "Height", category: "body_composition", aliases: &["body height", "height (cm)", "height (m)", "stature", "ht"] },
    CanonicalMetric { key: "bmi", display_name: "Body Mass Index", category: "body_composition", aliases: &["body mass index", "bmi (kg/m2)", "quetelet index"] },
    CanonicalMetric { key: "waist", display_name: "Waist Circumference", category: "body_composition", aliases: &["waist circumference", "waist (cm)", "waist girth", "wc"] },
    CanonicalMetric { key: "hip", display_name: "Hip Circumference", category: "body_composition", aliases: &["hip circumference", "hips", "hip (cm)", "hip girth"] },
    CanonicalMetric { key: "body_fat_pct", display_name: "Body Fat", category: "body_composition", aliases: &["body fat", "body fat %", "body fat percentage", "bf%", "fat %", "fat percentage", "pbf"] },
    CanonicalMetric { key: "lean_mass", display_name: "Lean Body Mass", category: "body_composition", aliases: &["lean body mass", "lbm", "lean mass (kg)", "fat free mass", "ffm"] },
    CanonicalMetric { key: "muscle_mass", display_name: "Skeletal Muscle Mass", category: "body_composition", aliases: &["skeletal muscle mass", "smm", "muscle mass (kg)", "muscle"] },
    CanonicalMetric { key: "visceral_fat", display_name: "Visceral Fat Rating", category: "body_composition", aliases: &["visceral fat rating", "visceral fat level", "vfr", "vat"] },
    CanonicalMetric { key: "waist_to_height_ratio", display_name: "Waist-to-Height Ratio", category: "body_composition", aliases: &["waist to height ratio", "whtr", "waist/height"] },
    // Vitals
    CanonicalMetric { key: "systolic_bp", display_name: "Systolic Blood Pressure", category: "vitals", aliases: &["systolic", "systolic blood pressure", "sbp", "bp systolic", "blood pressure systolic"] },
    CanonicalMetric { key: "diastolic_bp", display_name: "Diastolic Blood Pressure", category: "vitals", aliases: &["diastolic", "diastolic blood pressure", "dbp", "bp diastolic", "blood pressure diastolic"] },
    CanonicalMetric { key: "mean_arterial_pressure", display_name: "Mean Arterial Pressure", category: "vitals", aliases: &["map", "mean arterial pressure", "mean bp"] },
    CanonicalMetric { key: "resting_hr", display_name: "Resting Heart Rate", category: "vitals", aliases: &["resting heart rate", "rhr", "resting pulse", "heart rate (resting)", "pulse"] },
    CanonicalMetric { key: "max_hr", display_name: "Maximum Heart Rate", category: "vitals", aliases: &["max heart rate", "maximum heart rate", "hr max", "hrmax", "mhr"] },
    CanonicalMetric { key: "hrv", display_name: "Heart Rate Variability", category: "vitals", aliases: &["heart rate variability", "hrv (rmssd)", "rmssd", "hrv rmssd"] },
    CanonicalMetric { key: "spo2", display_name: "Oxygen Saturation", category: "vitals", aliases: &["oxygen saturation", "spo2 %", "sp02", "o2 saturation", "blood oxygen"] },
    CanonicalMetric { key: "respiratory_rate", display_name: "Respiratory Rate", category: "vitals", aliases: &["respiration rate", "breathing rate", "rr", "breaths per minute"] },
    CanonicalMetric { key: "body_temp", display_name: "Body Temperature", category: "vitals", aliases: &["body temperature", "temperature", "temp"] },
    CanonicalMetric { key: "vo2max", display_name: "VO2 Max", category: "vitals", aliases: &["vo2 max", "vo2max (ml/kg/min)", "vo2", "maximal oxygen uptake"] },
    // Lipids
    CanonicalMetric { key: "total_cholesterol", display_name: "Total Cholesterol", category: "lipids", aliases: &["cholesterol", "total cholesterol", "tc", "chol", "cholesterol total"] },
    CanonicalMetric { key: "hdl", display_name: "HDL Cholesterol", category: "lipids", aliases: &["hdl cholesterol", "hdl-c", "hdl c", "high density lipoprotein", "cholesterol hdl"] },
    CanonicalMetric { key: "ldl", display_name: "LDL Cholesterol", category: "lipids", aliases: &["ldl cholesterol", "ldl-c", "ldl c", "low density lipoprotein", "cholesterol ldl", "ldl calculated"] },
    CanonicalMetric { key: "triglycerides", display_name: "Triglycerides", category: "lipids", aliases: &["triglyceride", "tg", "trigs", "triglycerides (tg)"] },
    CanonicalMetric { key: "non_hdl", display_name: "Non-HDL Cholesterol", category: "lipids", aliases: &["non-hdl", "non hdl", "non-hdl cholesterol", "non hdl cholesterol"] },
    CanonicalMetric { key: "tg_hdl_ratio", display_name: "Triglyceride/HDL Ratio", category: "lipids", aliases: &["tg/hdl", "tg:hdl", "triglyceride to hdl ratio"] },
    CanonicalMetric { key: "tc_hdl_ratio", display_name: "Total Cholesterol/HDL Ratio", category: "lipids", aliases: &["tc/hdl", "cholesterol/hdl ratio", "chol/hdl"] },
    CanonicalMetric { key: "ldl_hdl_ratio", display_name: "LDL/HDL Ratio", category: "lipids", aliases: &["ldl/hdl", "ldl:hdl"] },
    CanonicalMetric { key: "remnant_cholesterol", display_name: "Remnant Cholesterol", category: "lipids", aliases: &["remnant cholesterol", "rc"] },
    CanonicalMetric { key: "apob", display_name: "Apolipoprotein B", category: "lipids", aliases: &["apo b", "apo-b", "apolipoprotein b", "apob100"] },
    CanonicalMetric { key: "apoa1", display_name: "Apolipoprotein A1", category: "lipids", aliases: &["apo a1", "apo-a1", "apolipoprotein a1", "apoa-1"] },
    CanonicalMetric { key: "lp_a", display_name: "Lipoprotein(a)", category: "lipids", aliases: &["lp(a)", "lpa", "lipoprotein a", "lipoprotein(a)"] },
    // Glycemic
    CanonicalMetric { key: "glucose", display_name: "Fasting Glucose", category: "glycemic", aliases: &["fasting glucose", "blood glucose", "fasting blood glucose", "fbg", "fpg", "glucose fasting", "blood sugar"] },
    CanonicalMetric { key: "insulin", display_name: "Fasting Insulin", category: "glycemic", aliases: &["fasting insulin", "insulin fasting", "serum insulin"] },
    CanonicalMetric { key: "hba1c", display_name: "HbA1c", category: "glycemic", aliases: &["a1c", "hemoglobin a1c", "haemoglobin a1c", "glycated hemoglobin", "hb a1c", "glycohemoglobin"] },
    CanonicalMetric { key: "homa_ir", display_name: "HOMA-IR", category: "glycemic", aliases: &["homa-ir", "homa ir", "homa"] },
    // Renal
    CanonicalMetric { key: "creatinine", display_name: "Serum Creatinine", category: "renal", aliases: &["serum creatinine", "creat", "cr", "creatinine (serum)"] },
    CanonicalMetric { key: "egfr", display_name: "eGFR", category: "renal", aliases: &["gfr", "estimated gfr", "e-gfr", "glomerular filtration rate"] },
    CanonicalMetric { key: "bun", display_name: "Blood Urea Nitrogen", category: "renal", aliases: &["blood urea nitrogen", "urea nitrogen", "urea"] },
    CanonicalMetric { key: "uric_acid", display_name: "Uric Acid", category: "renal", aliases: &["urate", "serum uric acid", "ua"] },
    CanonicalMetric { key: "urine_albumin", display_name: "Urine Albumin", category: "renal", aliases: &["urine albumin", "microalbumin", "urine microalbumin"] },
    CanonicalMetric { key: "urine_creatinine", display_name: "Urine Creatinine", category: "renal", aliases: &["urine creatinine", "creatinine urine"] },
    CanonicalMetric { key: "cystatin_c", display_name: "Cystatin C", category: "renal", aliases: &["cystatin c", "cystatin-c", "cys c"] },
    // Hepatic
    CanonicalMetric { key: "alt", display_name: "ALT", category: "hepatic", aliases: &["alanine aminotransferase", "sgpt", "alt (sgpt)", "gpt"] },
    CanonicalMetric { key: "ast", display_name: "AST", category: "hepatic", aliases: &["aspartate aminotransferase", "sgot", "ast (sgot)", "got"] },
    CanonicalMetric { key: "ggt", display_name: "GGT", category: "hepatic", aliases: &["gamma gt", "gamma-glutamyl transferase", "gamma glutamyl transferase", "ggtp"] },
    CanonicalMetric { key: "albumin", display_name: "Serum Albumin", category: "hepatic", aliases: &["serum albumin", "alb"] },
    CanonicalMetric { key: "total_protein", display_name: "Total Protein", category: "hepatic", aliases: &["total protein", "protein total", "serum protein"] },
    // Hematology
    CanonicalMetric { key: "hemoglobin", display_name: "Hemoglobin", category: "hematology", aliases: &["haemoglobin", "hgb", "hb"] },
    CanonicalMetric { key: "hematocrit", display_name: "Hematocrit", category: "hematology", aliases: &["haematocrit", "hct", "pcv"] },
    CanonicalMetric { key: "rbc", display_name: "Red Blood Cells", category: "hematology", aliases: &["red blood cells", "red blood cell count", "erythrocytes"] },
    CanonicalMetric { key: "wbc", display_name: "White Blood Cells", category: "hematology", aliases: &["white blood cells", "white blood cell count", "leukocytes"] },
    CanonicalMetric { key: "platelets", display_name: "Platelets", category: "hematology", aliases: &["platelet count", "plt", "thrombocytes"] },
    CanonicalMetric { key: "neutrophils", display_name: "Neutrophils", category: "hematology", aliases: &["neutrophil count", "absolute neutrophils", "anc", "neut"] },
    CanonicalMetric { key: "lymphocytes", display_name: "Lymphocytes", category: "hematology", aliases: &["lymphocyte count", "absolute lymphocytes", "alc", "lymph"] },
    CanonicalMetric { key: "monocytes", display_name: "Monocytes", category: "hematology", aliases: &["monocyte count", "absolute monocytes", "mono"] },
    CanonicalMetric { key: "mcv", display_name: "Mean Corpuscular Volume", category: "hematology", aliases: &["mean corpuscular volume", "mean cell volume"] },
    CanonicalMetric { key: "ferritin", display_name: "Ferritin", category: "hematology", aliases: &["serum ferritin", "ferr"] },
    CanonicalMetric { key: "iron", display_name: "Serum Iron", category: "hematology", aliases: &["serum iron", "fe"] },
    CanonicalMetric { key: "tibc", display_name: "Total Iron Binding Capacity", category: "hematology", aliases: &["total iron binding capacity", "iron binding capacity"] },
    // Inflammation
    CanonicalMetric { key: "crp", display_name: "hs-CRP", category: "inflammation", aliases: &["hs-crp", "hscrp", "hs crp", "c-reactive protein", "c reactive protein", "high sensitivity crp"] },
    CanonicalMetric { key: "homocysteine", display_name: "Homocysteine", category: "inflammation", aliases: &["hcy", "plasma homocysteine"] },
    // Thyroid
    CanonicalMetric { key: "tsh", display_name: "TSH", category: "thyroid", aliases: &["thyroid stimulating hormone", "thyrotropin"] },
    CanonicalMetric { key: "free_t4", display_name: "Free T4", category: "thyroid", aliases: &["free t4", "ft4", "free thyroxine", "t4 free"] },
    CanonicalMetric { key: "free_t3", display_name: "Free T3", category: "thyroid", aliases: &["free t3", "ft3", "free triiodothyronine", "t3 free"] },
    // Hormones and nutrients
    CanonicalMetric { key: "testosterone", display_name: "Total Testosterone", category: "hormones", aliases: &["total testosterone", "testosterone total", "tt"] },
    CanonicalMetric { key: "shbg", display_name: "SHBG", category: "hormones", aliases: &["sex hormone binding globulin"] },
    CanonicalMetric { key: "cortisol", display_name: "Cortisol", category: "hormones", aliases: &["serum cortisol", "morning cortisol", "am cortisol"] },
    CanonicalMetric { key: "vitamin_d", display_name: "Vitamin D (25-OH)", category: "nutrients", aliases: &["vitamin d", "vit d", "25-oh vitamin d", "25(oh)d", "25-hydroxyvitamin d", "calcidiol"] },
    CanonicalMetric { key: "b12", display_name: "Vitamin B12", category: "nutrients", aliases: &["vitamin b12", "vit b12", "cobalamin"] },
    // Electrolytes
    CanonicalMetric { key: "sodium", display_name: "Sodium", category: "electrolytes", aliases: &["na", "serum sodium", "na+"] },
    CanonicalMetric { key: "potassium", display_name: "Potassium", category: "electrolytes", aliases: &["k", "serum potassium", "k+"] },
    CanonicalMetric { key: "chloride", display_name: "Chloride", category: "electrolytes", aliases: &["cl", "serum chloride", "cl-"] },
    CanonicalMetric { key: "bicarbonate", display_name: "Bicarbonate", category: "electrolytes", aliases: &["hco3", "co2", "total co2", "bicarb"] },
    CanonicalMetric { key: "calcium", display_name: "Calcium", category: "electrolytes", aliases: &["ca", "serum calcium", "total calcium"] },
    // Lifestyle
    CanonicalMetric { key: "sleep_duration", display_name: "Sleep Duration", category: "lifestyle", aliases: &["sleep", "sleep hours", "hours of sleep", "total sleep", "sleep time"] },
    CanonicalMetric { key: "steps", display_name: "Daily Steps", category: "lifestyle", aliases: &["daily steps", "step count", "steps per day"] },
];

/// Clean a free-text label: lowercase, trim, and collapse inner whitespace
#[must_use]
pub fn clean_label(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Alias table mapping cleaned labels to canonical metric keys
#[derive(Debug, Clone, Default)]
pub struct MetricAliasTable {
    aliases: HashMap<String, String>,
}

impl MetricAliasTable {
    /// Build a table from `(alias, canonical key)` pairs
    ///
    /// Canonical keys are registered as aliases of themselves first, then
    /// every alias is inserted.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a canonical key or alias is empty, or
    /// if one alias points at two different canonical keys.
    pub fn from_pairs<I, A, K>(pairs: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (A, K)>,
        A: AsRef<str>,
        K: AsRef<str>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(alias, key)| (clean_label(alias.as_ref()), clean_label(key.as_ref())))
            .collect();

        let mut table = Self::default();
        for (_, key) in &pairs {
            if key.is_empty() {
                return Err(AppError::config("Alias table contains an empty canonical key"));
            }
            table.aliases.insert(key.clone(), key.clone());
        }

        for (alias, key) in pairs {
            if alias.is_empty() {
                return Err(AppError::config(format!(
                    "Alias table contains an empty alias for '{key}'"
                )));
            }
            if let Some(existing) = table.aliases.get(&alias) {
                if *existing != key {
                    return Err(AppError::config(format!(
                        "Alias '{alias}' maps to both '{existing}' and '{key}'"
                    )));
                }
                continue;
            }
            table.aliases.insert(alias, key);
        }

        Ok(table)
    }

    /// Build a table from a canonical metric registry
    ///
    /// # Errors
    ///
    /// Returns a configuration error on conflicting aliases.
    pub fn from_registry(registry: &[CanonicalMetric]) -> AppResult<Self> {
        Self::from_pairs(registry_pairs(registry))
    }

    /// Table built from [`CANONICAL_METRICS`]
    ///
    /// Conflicting aliases keep their first mapping; canonical keys always map
    /// to themselves.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for metric in CANONICAL_METRICS {
            let key = clean_label(metric.key);
            table.aliases.insert(key.clone(), key);
        }
        for (alias, key) in registry_pairs(CANONICAL_METRICS) {
            let alias = clean_label(alias);
            let key = clean_label(key);
            match table.aliases.get(&alias) {
                Some(existing) if *existing != key => {
                    warn!(alias = %alias, existing = %existing, ignored = %key, "Conflicting metric alias");
                }
                Some(_) => {}
                None => {
                    table.aliases.insert(alias, key);
                }
            }
        }
        table
    }

    /// Map a free-text label to its canonical key
    ///
    /// Uncatalogued labels are returned cleaned but otherwise unchanged.
    #[must_use]
    pub fn normalize(&self, label: &str) -> String {
        let cleaned = clean_label(label);
        match self.aliases.get(&cleaned) {
            Some(key) => key.clone(),
            None => cleaned,
        }
    }

    /// Normalize a raw measurement row into a canonical point
    #[must_use]
    pub fn normalize_measurement(&self, raw: &RawMeasurement) -> MeasurementPoint {
        MeasurementPoint {
            metric: self.normalize(&raw.label),
            value: raw.value,
            unit: raw.unit.trim().to_owned(),
            measured_at: raw.measured_at,
            source: raw.source,
        }
    }

    /// Normalize a batch of raw rows, dropping non-finite values
    #[must_use]
    pub fn normalize_all(&self, raws: &[RawMeasurement]) -> Vec<MeasurementPoint> {
        raws.iter()
            .filter(|raw| {
                let finite = raw.value.is_finite();
                if !finite {
                    warn!(label = %raw.label, "Dropping non-finite measurement value");
                }
                finite
            })
            .map(|raw| self.normalize_measurement(raw))
            .collect()
    }

    /// Distinct canonical keys known to the table
    #[must_use]
    pub fn canonical_keys(&self) -> BTreeSet<&str> {
        self.aliases.values().map(String::as_str).collect()
    }

    /// Number of aliases, canonical self-mappings included
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Display metadata for every metric in [`CANONICAL_METRICS`]
#[must_use]
pub fn builtin_metric_metadata() -> HashMap<String, MetricMetadata> {
    CANONICAL_METRICS
        .iter()
        .map(|metric| {
            (
                metric.key.to_owned(),
                MetricMetadata {
                    display_name: metric.display_name.to_owned(),
                    category: metric.category.to_owned(),
                },
            )
        })
        .collect()
}

fn registry_pairs(registry: &[CanonicalMetric]) -> Vec<(&'static str, &'static str)> {
    registry
        .iter()
        .flat_map(|metric| metric.aliases.iter().map(move |alias| (*alias, metric.key)))
        .collect()
}
