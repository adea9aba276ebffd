// ABOUTME: Canonical analysis result schema and the abbreviated keys each field accepts
// ABOUTME: Every type decodes totally from loose JSON via LooseDecode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::decode::{
    loose_list, loose_text, loose_text_list, number_field, pick, text_field, LooseDecode,
};

/// Candidate keys per canonical field, canonical name included
pub mod keys {
    /// `summary`
    pub const SUMMARY: &[&str] = &["summary", "sum", "s"];
    /// `qc_issues`
    pub const QC_ISSUES: &[&str] = &["qc_issues", "qc"];
    /// `normalization_notes`
    pub const NORMALIZATION_NOTES: &[&str] = &["normalization_notes", "norm", "nn", "notes"];
    /// `derived_metrics`
    pub const DERIVED_METRICS: &[&str] = &["derived_metrics", "dm", "derived"];
    /// `current_state`
    pub const CURRENT_STATE: &[&str] = &["current_state", "cs", "state"];
    /// `trends`
    pub const TRENDS: &[&str] = &["trends", "tr"];
    /// `correlations`
    pub const CORRELATIONS: &[&str] = &["correlations", "corr", "cor"];
    /// `paradoxes`
    pub const PARADOXES: &[&str] = &["paradoxes", "px", "par"];
    /// `hypotheses`
    pub const HYPOTHESES: &[&str] = &["hypotheses", "hyp", "h"];
    /// `risk_assessment`
    pub const RISK_ASSESSMENT: &[&str] = &["risk_assessment", "risk", "ra"];
    /// `recommendations_next_steps`
    pub const RECOMMENDATIONS: &[&str] = &["recommendations_next_steps", "rec", "recs", "next"];
    /// `uncertainties`
    pub const UNCERTAINTIES: &[&str] = &["uncertainties", "unc", "u"];
    /// `data_gaps`
    pub const DATA_GAPS: &[&str] = &["data_gaps", "gaps", "dg", "missing"];
    /// Every analysis field, in canonical order
    pub const ANALYSIS_FIELDS: &[&[&str]] = &[
        SUMMARY,
        QC_ISSUES,
        NORMALIZATION_NOTES,
        DERIVED_METRICS,
        CURRENT_STATE,
        TRENDS,
        CORRELATIONS,
        PARADOXES,
        HYPOTHESES,
        RISK_ASSESSMENT,
        RECOMMENDATIONS,
        UNCERTAINTIES,
        DATA_GAPS,
    ];
    /// Calculated KPI array
    pub const KPIS: &[&str] = &["kpis", "calculated_kpis", "calculatedKPIs", "kpi", "k"];
}

/// A data-quality problem spotted in the input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcIssue {
    /// Metric or row concerned
    pub item: String,
    /// Kind of issue (range, unit, duplicate, ...)
    #[serde(rename = "type")]
    pub issue_type: String,
    /// Explanation
    pub detail: String,
}

impl LooseDecode for QcIssue {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            item: text_field(object, &["item", "i", "metric", "m"]),
            issue_type: text_field(object, &["type", "t", "kind"]),
            detail: text_field(object, &["detail", "d", "details", "text", "rationale"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            detail: text,
            ..Self::default()
        }
    }
}

/// A derived value as interpreted by the inference step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetricInsight {
    /// Metric name
    pub name: String,
    /// Value, `null` when not numeric
    pub value: Option<f64>,
    /// Unit
    pub unit: String,
    /// Interpretation
    pub interpretation: String,
}

impl LooseDecode for DerivedMetricInsight {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            name: text_field(object, &["name", "n", "metric", "m"]),
            value: number_field(object, &["value", "v"]),
            unit: text_field(object, &["unit", "un"]),
            interpretation: text_field(object, &["interpretation", "interp", "i", "text", "rationale"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            interpretation: text,
            ..Self::default()
        }
    }
}

/// Current status of a metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentStateEntry {
    /// Metric key or name
    pub metric: String,
    /// Latest value, `null` when not numeric
    pub value: Option<f64>,
    /// Unit
    pub unit: String,
    /// Status label (optimal, normal, borderline, high, ...)
    pub status: String,
    /// Free-text note
    pub note: String,
}

impl LooseDecode for CurrentStateEntry {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            metric: text_field(object, &["metric", "m", "name", "n"]),
            value: number_field(object, &["value", "v"]),
            unit: text_field(object, &["unit", "un"]),
            status: text_field(object, &["status", "st", "flag"]),
            note: text_field(object, &["note", "nt", "text", "rationale"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            note: text,
            ..Self::default()
        }
    }
}

/// Direction of a metric over time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendInsight {
    /// Metric key or name
    pub metric: String,
    /// Direction (up, down, stable)
    pub direction: String,
    /// Magnitude of the change as described
    pub change: String,
    /// Time window covered
    pub window: String,
    /// Free-text note
    pub note: String,
}

impl LooseDecode for TrendInsight {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            metric: text_field(object, &["metric", "m", "name"]),
            direction: text_field(object, &["direction", "dir", "d"]),
            change: text_field(object, &["change", "delta", "c"]),
            window: text_field(object, &["window", "w", "period"]),
            note: text_field(object, &["note", "nt", "text", "rationale"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            note: text,
            ..Self::default()
        }
    }
}

/// Relationship between metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationInsight {
    /// Metrics involved
    pub metrics: Vec<String>,
    /// Strength or direction as described
    pub strength: String,
    /// Explanation
    pub rationale: String,
}

impl LooseDecode for CorrelationInsight {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            metrics: loose_text_list(pick(object, &["metrics", "m", "pair", "vars"])),
            strength: text_field(object, &["strength", "str", "r"]),
            rationale: text_field(object, &["rationale", "why", "text", "note"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            rationale: text,
            ..Self::default()
        }
    }
}

/// An observation that contradicts the usual pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParadoxInsight {
    /// What was observed
    pub observation: String,
    /// Possible explanation
    pub rationale: String,
}

impl LooseDecode for ParadoxInsight {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            observation: text_field(object, &["observation", "obs", "o", "text"]),
            rationale: text_field(object, &["rationale", "why", "explanation"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            observation: text,
            ..Self::default()
        }
    }
}

/// A candidate explanation for the data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    /// Hypothesis
    pub statement: String,
    /// Confidence as described (low, moderate, high)
    pub confidence: String,
    /// Supporting reasoning
    pub rationale: String,
}

impl LooseDecode for Hypothesis {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            statement: text_field(object, &["statement", "stmt", "hypothesis", "text"]),
            confidence: text_field(object, &["confidence", "conf", "c"]),
            rationale: text_field(object, &["rationale", "why", "r"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            statement: text,
            ..Self::default()
        }
    }
}

/// Overall risk picture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Overall level (low, moderate, high)
    pub overall: String,
    /// Numeric score if one was given
    pub score: Option<f64>,
    /// Contributing factors
    pub factors: Vec<String>,
    /// Explanation
    pub rationale: String,
}

impl LooseDecode for RiskAssessment {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            overall: text_field(object, &["overall", "level", "lvl", "o"]),
            score: number_field(object, &["score", "sc"]),
            factors: loose_text_list(pick(object, &["factors", "f", "drivers"])),
            rationale: text_field(object, &["rationale", "why", "text", "r"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            rationale: text,
            ..Self::default()
        }
    }

    /// Arrays are read from their first object element; an array without
    /// one is taken as the factor list
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(object) => Self::from_object(object),
            Value::Array(items) => items.iter().find_map(Value::as_object).map_or_else(
                || Self {
                    factors: loose_text_list(Some(value)),
                    ..Self::default()
                },
                Self::from_object,
            ),
            Value::Null => Self::default(),
            other => Self::from_text(loose_text(Some(other))),
        }
    }
}

/// A suggested next step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// What to do
    pub action: String,
    /// Priority as described
    pub priority: String,
    /// Why
    pub rationale: String,
}

impl LooseDecode for Recommendation {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            action: text_field(object, &["action", "a", "step", "text"]),
            priority: text_field(object, &["priority", "p", "prio"]),
            rationale: text_field(object, &["rationale", "why", "r"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            action: text,
            ..Self::default()
        }
    }
}

/// A KPI value computed by the inference step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatedKpi {
    /// Catalog id
    pub id: String,
    /// Name as echoed back
    pub name: String,
    /// Value, `null` when not numeric
    pub value: Option<f64>,
    /// Unit
    pub unit: String,
    /// Interpretation
    pub interpretation: String,
}

impl LooseDecode for CalculatedKpi {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            id: text_field(object, &["id", "kpi_id", "kpi"]),
            name: text_field(object, &["name", "n"]),
            value: number_field(object, &["value", "v"]),
            unit: text_field(object, &["unit", "un"]),
            interpretation: text_field(object, &["interpretation", "interp", "i", "text", "rationale"]),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            interpretation: text,
            ..Self::default()
        }
    }
}

/// Canonical analysis output, every field always populated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Overall summary
    pub summary: String,
    /// Data-quality issues
    pub qc_issues: Vec<QcIssue>,
    /// Notes about unit or label normalization
    pub normalization_notes: Vec<String>,
    /// Interpreted derived values
    pub derived_metrics: Vec<DerivedMetricInsight>,
    /// Latest status per metric
    pub current_state: Vec<CurrentStateEntry>,
    /// Changes over time
    pub trends: Vec<TrendInsight>,
    /// Relationships between metrics
    pub correlations: Vec<CorrelationInsight>,
    /// Counter-intuitive observations
    pub paradoxes: Vec<ParadoxInsight>,
    /// Candidate explanations
    pub hypotheses: Vec<Hypothesis>,
    /// Overall risk picture
    pub risk_assessment: RiskAssessment,
    /// Suggested next steps
    pub recommendations_next_steps: Vec<Recommendation>,
    /// Stated uncertainties
    pub uncertainties: Vec<String>,
    /// Measurements that would sharpen the analysis
    pub data_gaps: Vec<String>,
}

impl AnalysisResult {
    /// Map an abbreviated object onto the canonical schema
    ///
    /// Anything other than an object yields the all-default result.
    #[must_use]
    pub fn from_loose(value: &Value) -> Self {
        value.as_object().map_or_else(Self::default, Self::from_object)
    }

    /// Whether any analysis field, canonical or abbreviated, is present
    #[must_use]
    pub fn has_fields(object: &Map<String, Value>) -> bool {
        keys::ANALYSIS_FIELDS
            .iter()
            .any(|candidates| pick(object, candidates).is_some())
    }

    /// Map an abbreviated object onto the canonical schema
    #[must_use]
    pub fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            summary: text_field(object, keys::SUMMARY),
            qc_issues: loose_list(pick(object, keys::QC_ISSUES)),
            normalization_notes: loose_text_list(pick(object, keys::NORMALIZATION_NOTES)),
            derived_metrics: loose_list(pick(object, keys::DERIVED_METRICS)),
            current_state: loose_list(pick(object, keys::CURRENT_STATE)),
            trends: loose_list(pick(object, keys::TRENDS)),
            correlations: loose_list(pick(object, keys::CORRELATIONS)),
            paradoxes: loose_list(pick(object, keys::PARADOXES)),
            hypotheses: loose_list(pick(object, keys::HYPOTHESES)),
            risk_assessment: pick(object, keys::RISK_ASSESSMENT)
                .map(RiskAssessment::from_value)
                .unwrap_or_default(),
            recommendations_next_steps: loose_list(pick(object, keys::RECOMMENDATIONS)),
            uncertainties: loose_text_list(pick(object, keys::UNCERTAINTIES)),
            data_gaps: loose_text_list(pick(object, keys::DATA_GAPS)),
        }
    }
}
