// ABOUTME: Bootstrap derived-metric rules (BMI, Non-HDL, HOMA-IR, lipid ratios, MAP)
// ABOUTME: Single ordered pass that feeds results back into the available-value map
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Derived-Metric Calculator
//!
//! A small, hand-ordered list of formulas that run as code before KPI
//! eligibility is resolved. Each rule declares its raw inputs; it fires only
//! when all of them are present and inserts its result under its own
//! canonical key, which can make second-order catalog entries eligible in the
//! same invocation.
//!
//! The list is traversed exactly once. A rule that depends on another rule's
//! output only sees it if the producer comes earlier in the list.
//!
//! A rule never overwrites a value that was measured directly.

use serde::Serialize;
use tracing::debug;
use vitalis_core::models::MetricValue;

use crate::available::AvailableMetrics;

/// Computes a rule's value from the available metrics; `None` skips the rule
pub type DerivationFn = fn(&AvailableMetrics) -> Option<f64>;

/// A bootstrap formula with its declared inputs
#[derive(Debug, Clone, Copy)]
pub struct DerivationRule {
    /// Canonical key the result is stored under
    pub output: &'static str,
    /// Unit of the result
    pub unit: &'static str,
    /// Canonical keys that must be present for the rule to fire
    pub inputs: &'static [&'static str],
    /// Formula
    pub compute: DerivationFn,
}

/// Built-in bootstrap rules, in evaluation order
pub static BOOTSTRAP_RULES: &[DerivationRule] = &[
    DerivationRule {
        output: "bmi",
        unit: "kg/m²",
        inputs: &["weight", "height"],
        compute: compute_bmi,
    },
    DerivationRule {
        output: "non_hdl",
        unit: "mg/dL",
        inputs: &["total_cholesterol", "hdl"],
        compute: compute_non_hdl,
    },
    DerivationRule {
        output: "homa_ir",
        unit: "index",
        inputs: &["glucose", "insulin"],
        compute: compute_homa_ir,
    },
    DerivationRule {
        output: "tg_hdl_ratio",
        unit: "ratio",
        inputs: &["triglycerides", "hdl"],
        compute: compute_tg_hdl_ratio,
    },
    DerivationRule {
        output: "tc_hdl_ratio",
        unit: "ratio",
        inputs: &["total_cholesterol", "hdl"],
        compute: compute_tc_hdl_ratio,
    },
    DerivationRule {
        output: "ldl_hdl_ratio",
        unit: "ratio",
        inputs: &["ldl", "hdl"],
        compute: compute_ldl_hdl_ratio,
    },
    DerivationRule {
        output: "remnant_cholesterol",
        unit: "mg/dL",
        inputs: &["total_cholesterol", "ldl", "hdl"],
        compute: compute_remnant_cholesterol,
    },
    DerivationRule {
        output: "waist_to_height_ratio",
        unit: "ratio",
        inputs: &["waist", "height"],
        compute: compute_waist_to_height,
    },
    DerivationRule {
        output: "mean_arterial_pressure",
        unit: "mmHg",
        inputs: &["systolic_bp", "diastolic_bp"],
        compute: compute_mean_arterial_pressure,
    },
];

/// A value produced by a bootstrap rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedValue {
    /// Canonical key
    pub metric: String,
    /// Computed value
    pub value: f64,
    /// Unit
    pub unit: String,
    /// Inputs the rule consumed
    pub inputs: Vec<String>,
}

/// Runs an ordered list of bootstrap rules over the available metrics
#[derive(Debug, Clone)]
pub struct DerivedMetricCalculator {
    rules: Vec<DerivationRule>,
}

impl Default for DerivedMetricCalculator {
    fn default() -> Self {
        Self::with_bootstrap_rules()
    }
}

impl DerivedMetricCalculator {
    /// Create a calculator with an explicit rule order
    #[must_use]
    pub const fn new(rules: Vec<DerivationRule>) -> Self {
        Self { rules }
    }

    /// Create a calculator with [`BOOTSTRAP_RULES`]
    #[must_use]
    pub fn with_bootstrap_rules() -> Self {
        Self::new(BOOTSTRAP_RULES.to_vec())
    }

    /// Rules in evaluation order
    #[must_use]
    pub fn rules(&self) -> &[DerivationRule] {
        &self.rules
    }

    /// Apply every rule once, in order, inserting results into `available`
    ///
    /// Returns the values that were added.
    pub fn apply(&self, available: &mut AvailableMetrics) -> Vec<DerivedValue> {
        let mut derived = Vec::new();

        for rule in &self.rules {
            if available.contains(rule.output) {
                debug!(metric = rule.output, "Measured value present, skipping derivation");
                continue;
            }
            if !rule.inputs.iter().all(|input| available.contains(input)) {
                continue;
            }

            match (rule.compute)(available) {
                Some(value) if value.is_finite() => {
                    available.insert(rule.output, MetricValue::new(value, rule.unit));
                    derived.push(DerivedValue {
                        metric: rule.output.to_owned(),
                        value,
                        unit: rule.unit.to_owned(),
                        inputs: rule.inputs.iter().map(|&input| input.to_owned()).collect(),
                    });
                }
                _ => debug!(metric = rule.output, "Derivation produced no usable value"),
            }
        }

        debug!(count = derived.len(), "Bootstrap derivations applied");
        derived
    }
}

// ============================================================================
// Unit conversion
// ============================================================================

/// Cholesterol mmol/L to mg/dL
const CHOLESTEROL_MMOL_TO_MG: f64 = 38.67;

/// Triglycerides mmol/L to mg/dL
const TRIGLYCERIDE_MMOL_TO_MG: f64 = 88.57;

/// Glucose mmol/L to mg/dL
const GLUCOSE_MMOL_TO_MG: f64 = 18.0;

/// HOMA-IR constant for glucose in mg/dL and insulin in µU/mL
const HOMA_IR_DIVISOR: f64 = 405.0;

/// Pounds to kilograms
const LB_TO_KG: f64 = 0.453_592_37;

/// Heights above this without a unit are taken as centimetres
const HEIGHT_METRES_MAX: f64 = 3.0;

fn unit_is(unit: &str, candidates: &[&str]) -> bool {
    let unit = unit.trim();
    candidates
        .iter()
        .any(|candidate| unit.eq_ignore_ascii_case(candidate))
}

fn height_m(available: &AvailableMetrics) -> Option<f64> {
    let height = available.get("height")?;
    let metres = if unit_is(&height.unit, &["cm", "centimeters", "centimetres"]) {
        height.value / 100.0
    } else if unit_is(&height.unit, &["in", "inch", "inches"]) {
        height.value * 0.0254
    } else if unit_is(&height.unit, &["m", "meters", "metres"]) {
        height.value
    } else if height.value > HEIGHT_METRES_MAX {
        height.value / 100.0
    } else {
        height.value
    };
    (metres > 0.0).then_some(metres)
}

fn length_cm(available: &AvailableMetrics, key: &str) -> Option<f64> {
    let metric = available.get(key)?;
    let cm = if unit_is(&metric.unit, &["in", "inch", "inches"]) {
        metric.value * 2.54
    } else if unit_is(&metric.unit, &["m", "meters", "metres"]) {
        metric.value * 100.0
    } else {
        metric.value
    };
    (cm > 0.0).then_some(cm)
}

fn weight_kg(available: &AvailableMetrics) -> Option<f64> {
    let weight = available.get("weight")?;
    let kg = if unit_is(&weight.unit, &["lb", "lbs", "pound", "pounds"]) {
        weight.value * LB_TO_KG
    } else {
        weight.value
    };
    (kg > 0.0).then_some(kg)
}

fn mg_dl(available: &AvailableMetrics, key: &str, mmol_factor: f64) -> Option<f64> {
    let metric = available.get(key)?;
    if unit_is(&metric.unit, &["mmol/l", "mmol"]) {
        Some(metric.value * mmol_factor)
    } else {
        Some(metric.value)
    }
}

fn cholesterol(available: &AvailableMetrics, key: &str) -> Option<f64> {
    mg_dl(available, key, CHOLESTEROL_MMOL_TO_MG)
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator != 0.0).then(|| numerator / denominator)
}

// ============================================================================
// Formulas
// ============================================================================

fn compute_bmi(available: &AvailableMetrics) -> Option<f64> {
    let height = height_m(available)?;
    Some(weight_kg(available)? / (height * height))
}

fn compute_non_hdl(available: &AvailableMetrics) -> Option<f64> {
    Some(cholesterol(available, "total_cholesterol")? - cholesterol(available, "hdl")?)
}

fn compute_homa_ir(available: &AvailableMetrics) -> Option<f64> {
    let glucose = mg_dl(available, "glucose", GLUCOSE_MMOL_TO_MG)?;
    let insulin = available.value("insulin")?;
    Some(glucose * insulin / HOMA_IR_DIVISOR)
}

fn compute_tg_hdl_ratio(available: &AvailableMetrics) -> Option<f64> {
    ratio(
        mg_dl(available, "triglycerides", TRIGLYCERIDE_MMOL_TO_MG)?,
        cholesterol(available, "hdl")?,
    )
}

fn compute_tc_hdl_ratio(available: &AvailableMetrics) -> Option<f64> {
    ratio(
        cholesterol(available, "total_cholesterol")?,
        cholesterol(available, "hdl")?,
    )
}

fn compute_ldl_hdl_ratio(available: &AvailableMetrics) -> Option<f64> {
    ratio(cholesterol(available, "ldl")?, cholesterol(available, "hdl")?)
}

fn compute_remnant_cholesterol(available: &AvailableMetrics) -> Option<f64> {
    let remnant = cholesterol(available, "total_cholesterol")?
        - cholesterol(available, "ldl")?
        - cholesterol(available, "hdl")?;
    (remnant >= 0.0).then_some(remnant)
}

fn compute_waist_to_height(available: &AvailableMetrics) -> Option<f64> {
    let height_cm = height_m(available)? * 100.0;
    ratio(length_cm(available, "waist")?, height_cm)
}

fn compute_mean_arterial_pressure(available: &AvailableMetrics) -> Option<f64> {
    let systolic = available.value("systolic_bp")?;
    let diastolic = available.value("diastolic_bp")?;
    Some(diastolic + (systolic - diastolic) / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available(values: &[(&str, f64, &str)]) -> AvailableMetrics {
        let mut available = AvailableMetrics::new();
        for (key, value, unit) in values {
            available.insert(*key, MetricValue::new(*value, *unit));
        }
        available
    }

    #[test]
    fn test_bmi_from_metres() {
        let mut metrics = available(&[("weight", 70.0, "kg"), ("height", 1.75, "m")]);
        let derived = DerivedMetricCalculator::default().apply(&mut metrics);

        let bmi = metrics.get("bmi").unwrap();
        assert!((bmi.value - 22.857).abs() < 0.01);
        assert_eq!(bmi.unit, "kg/m²");
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].inputs, vec!["weight", "height"]);
    }

    #[test]
    fn test_bmi_from_centimetres_and_pounds() {
        let mut metrics = available(&[("weight", 154.324, "lb"), ("height", 175.0, "cm")]);
        DerivedMetricCalculator::default().apply(&mut metrics);
        assert!((metrics.value("bmi").unwrap() - 22.857).abs() < 0.01);
    }

    #[test]
    fn test_unitless_height_heuristic() {
        let mut metrics = available(&[("weight", 70.0, "kg"), ("height", 175.0, "")]);
        DerivedMetricCalculator::default().apply(&mut metrics);
        assert!((metrics.value("bmi").unwrap() - 22.857).abs() < 0.01);
    }

    #[test]
    fn test_homa_ir_mmol_glucose() {
        let mut metrics = available(&[("glucose", 5.0, "mmol/L"), ("insulin", 9.0, "uIU/mL")]);
        DerivedMetricCalculator::default().apply(&mut metrics);
        // 90 mg/dL * 9 / 405 = 2.0
        assert!((metrics.value("homa_ir").unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_hdl_and_ratios() {
        let mut metrics = available(&[
            ("total_cholesterol", 200.0, "mg/dL"),
            ("hdl", 50.0, "mg/dL"),
            ("ldl", 120.0, "mg/dL"),
            ("triglycerides", 150.0, "mg/dL"),
        ]);
        DerivedMetricCalculator::default().apply(&mut metrics);
        assert_eq!(metrics.value("non_hdl"), Some(150.0));
        assert_eq!(metrics.value("tc_hdl_ratio"), Some(4.0));
        assert_eq!(metrics.value("tg_hdl_ratio"), Some(3.0));
        assert_eq!(metrics.value("ldl_hdl_ratio"), Some(2.4));
        assert_eq!(metrics.value("remnant_cholesterol"), Some(30.0));
    }

    #[test]
    fn test_measured_value_not_overwritten() {
        let mut metrics = available(&[
            ("weight", 70.0, "kg"),
            ("height", 1.75, "m"),
            ("bmi", 23.5, "kg/m2"),
        ]);
        let derived = DerivedMetricCalculator::default().apply(&mut metrics);
        assert_eq!(metrics.value("bmi"), Some(23.5));
        assert!(derived.iter().all(|value| value.metric != "bmi"));
    }

    #[test]
    fn test_zero_denominator_skips_rule() {
        let mut metrics = available(&[("ldl", 120.0, "mg/dL"), ("hdl", 0.0, "mg/dL")]);
        DerivedMetricCalculator::default().apply(&mut metrics);
        assert!(!metrics.contains("ldl_hdl_ratio"));
    }

    #[test]
    fn test_missing_inputs_skip_rule() {
        let mut metrics = available(&[("weight", 70.0, "kg")]);
        let derived = DerivedMetricCalculator::default().apply(&mut metrics);
        assert!(derived.is_empty());
        assert!(!metrics.contains("bmi"));
    }

    fn compute_bmi_squared(available: &AvailableMetrics) -> Option<f64> {
        available.value("bmi").map(|bmi| bmi * bmi)
    }

    #[test]
    fn test_single_pass_is_order_sensitive() {
        let dependent = DerivationRule {
            output: "bmi_squared",
            unit: "",
            inputs: &["bmi"],
            compute: compute_bmi_squared,
        };

        // Dependent rule before its producer: not resolved in this pass
        let mut metrics = available(&[("weight", 70.0, "kg"), ("height", 1.75, "m")]);
        DerivedMetricCalculator::new(vec![dependent, BOOTSTRAP_RULES[0]]).apply(&mut metrics);
        assert!(metrics.contains("bmi"));
        assert!(!metrics.contains("bmi_squared"));

        // Producer first: resolved
        let mut metrics = available(&[("weight", 70.0, "kg"), ("height", 1.75, "m")]);
        DerivedMetricCalculator::new(vec![BOOTSTRAP_RULES[0], dependent]).apply(&mut metrics);
        assert!(metrics.contains("bmi_squared"));
    }
}
