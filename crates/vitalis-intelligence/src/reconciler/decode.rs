// ABOUTME: Total decoders for loosely-typed JSON: text, numbers, lists, and structured items
// ABOUTME: Every branch ends in a typed default; nothing here can fail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::{Map, Value};

/// Nested properties consulted, in order, when an object stands in for text
pub const NESTED_TEXT_KEYS: [&str; 3] = ["rationale", "text", "action"];

/// Shape of a JSON value that should resolve to text
#[derive(Debug, Clone, Copy)]
pub enum LooseText<'a> {
    /// Key absent or `null`
    Absent,
    /// A JSON string
    Text(&'a str),
    /// A number or boolean
    Scalar(&'a Value),
    /// An object, resolved through [`NESTED_TEXT_KEYS`]
    Object(&'a Map<String, Value>),
    /// An array, resolved item by item
    List(&'a [Value]),
}

impl<'a> LooseText<'a> {
    /// Classify a possibly missing value
    #[must_use]
    pub fn classify(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::String(text)) => Self::Text(text),
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Self::Scalar(scalar),
            Some(Value::Object(object)) => Self::Object(object),
            Some(Value::Array(items)) => Self::List(items),
        }
    }

    /// Resolve to a string
    ///
    /// Objects prefer the first non-empty `rationale`, `text` or `action`
    /// property and otherwise fall back to their JSON rendering. Arrays join
    /// their resolved items with `"; "`.
    #[must_use]
    pub fn resolve(self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Text(text) => text.trim().to_owned(),
            Self::Scalar(value) => value.to_string(),
            Self::Object(object) => NESTED_TEXT_KEYS
                .iter()
                .map(|key| Self::classify(object.get(*key)).resolve())
                .find(|text| !text.is_empty())
                .unwrap_or_else(|| serde_json::to_string(object).unwrap_or_default()),
            Self::List(items) => items
                .iter()
                .map(|item| Self::classify(Some(item)).resolve())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

/// Resolve any value to text, `""` when absent
#[must_use]
pub fn loose_text(value: Option<&Value>) -> String {
    LooseText::classify(value).resolve()
}

/// Resolve a number or numeric string prefix (`"7.5 mg/dL"`), `None` otherwise
#[must_use]
pub fn loose_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => numeric_prefix(text),
        Value::Object(object) => loose_number(object.get("value")),
        _ => None,
    }
}

fn numeric_prefix(text: &str) -> Option<f64> {
    let text = text.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (index, c) in text.char_indices() {
        match c {
            '+' | '-' if index == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = index + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    text[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// List of strings from an array, a lone value, or nothing
#[must_use]
pub fn loose_text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| loose_text(Some(item)))
            .filter(|text| !text.is_empty())
            .collect(),
        Some(other) => {
            let text = loose_text(Some(other));
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
    }
}

/// First candidate key whose value is present and not `null`
#[must_use]
pub fn pick<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// Text under the first present candidate key
#[must_use]
pub fn text_field(object: &Map<String, Value>, keys: &[&str]) -> String {
    loose_text(pick(object, keys))
}

/// Number under the first present candidate key
#[must_use]
pub fn number_field(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    loose_number(pick(object, keys))
}

/// A structured item that can also arrive as bare text
pub trait LooseDecode: Default {
    /// Decode from an object
    fn from_object(object: &Map<String, Value>) -> Self;

    /// Decode from text that stands in for the whole item
    fn from_text(text: String) -> Self;

    /// Decode from any value
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(object) => Self::from_object(object),
            Value::Null => Self::default(),
            other => Self::from_text(loose_text(Some(other))),
        }
    }
}

/// List of items from an array, a lone value, or nothing
///
/// `null` array elements are skipped.
#[must_use]
pub fn loose_list<T: LooseDecode>(value: Option<&Value>) -> Vec<T> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(T::from_value)
            .collect(),
        Some(other) => vec![T::from_value(other)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loose_text_variants() {
        assert_eq!(loose_text(None), "");
        assert_eq!(loose_text(Some(&json!(null))), "");
        assert_eq!(loose_text(Some(&json!("  ok "))), "ok");
        assert_eq!(loose_text(Some(&json!(3.5))), "3.5");
        assert_eq!(loose_text(Some(&json!(true))), "true");
    }

    #[test]
    fn test_object_text_extraction_order() {
        let value = json!({"action": "walk", "text": "t", "rationale": "because"});
        assert_eq!(loose_text(Some(&value)), "because");

        let value = json!({"action": "walk", "text": ""});
        assert_eq!(loose_text(Some(&value)), "walk");

        let value = json!({"foo": 1});
        assert_eq!(loose_text(Some(&value)), r#"{"foo":1}"#);
    }

    #[test]
    fn test_array_text_joined() {
        let value = json!(["a", {"text": "b"}, null, ""]);
        assert_eq!(loose_text(Some(&value)), "a; b");
    }

    #[test]
    fn test_loose_number() {
        assert_eq!(loose_number(Some(&json!(7.5))), Some(7.5));
        assert_eq!(loose_number(Some(&json!("7.5 mg/dL"))), Some(7.5));
        assert_eq!(loose_number(Some(&json!(" -12"))), Some(-12.0));
        assert_eq!(loose_number(Some(&json!("3."))), Some(3.0));
        assert_eq!(loose_number(Some(&json!({"value": "42"}))), Some(42.0));
        assert_eq!(loose_number(Some(&json!("high"))), None);
        assert_eq!(loose_number(Some(&json!("-"))), None);
        assert_eq!(loose_number(Some(&json!(false))), None);
        assert_eq!(loose_number(None), None);
    }

    #[test]
    fn test_loose_text_list_wraps_single_value() {
        assert_eq!(loose_text_list(Some(&json!("one"))), vec!["one"]);
        assert_eq!(loose_text_list(Some(&json!(["a", 2, null]))), vec!["a", "2"]);
        assert!(loose_text_list(Some(&json!({}))).len() == 1);
        assert!(loose_text_list(None).is_empty());
    }

    #[test]
    fn test_pick_skips_null_candidates() {
        let object = json!({"sum": null, "summary": "x"});
        let object = object.as_object().unwrap();
        assert_eq!(pick(object, &["sum", "summary"]), Some(&json!("x")));
        assert_eq!(pick(object, &["missing"]), None);
    }
}
