//! Observed field values
//!
//! Every raw value is classified exactly once, when it enters a [`Cast`](crate::Cast):
//! either it reads as a finite number or it is kept verbatim as a category.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A single field value, decided at ingestion
///
/// Serialized as a bare number or string. Deserialization is not offered:
/// build values through [`FieldValue::parse`] or [`FieldValue::from_json`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Finite number, used for bounds, grouping and regression
    Numeric(f64),
    /// Anything that does not read as a finite number, matched exactly
    Categorical(String),
}

impl FieldValue {
    /// Classify text: trimmed text that parses as a finite `f64` is numeric,
    /// everything else (including empty text) stays categorical as written.
    pub fn parse(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => FieldValue::Numeric(number),
            _ => FieldValue::Categorical(text.to_string()),
        }
    }

    /// Classify a JSON value.
    ///
    /// Arrays stand for their first element and yield `None` when empty.
    /// Objects are kept as their compact JSON text.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(match n.as_f64() {
                Some(number) if number.is_finite() => FieldValue::Numeric(number),
                _ => FieldValue::Categorical(n.to_string()),
            }),
            Value::String(s) => Some(Self::parse(s)),
            Value::Bool(b) => Some(FieldValue::Categorical(b.to_string())),
            Value::Null => Some(FieldValue::Categorical("null".to_string())),
            Value::Array(items) => items.first().and_then(Self::from_json),
            Value::Object(_) => Some(FieldValue::Categorical(value.to_string())),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Numeric(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Numeric(number) => Some(*number),
            FieldValue::Categorical(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Numeric(_) => None,
            FieldValue::Categorical(text) => Some(text),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Numeric(number) => write!(f, "{}", number),
            FieldValue::Categorical(text) => f.write_str(text),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(number: f64) -> Self {
        if number.is_finite() {
            FieldValue::Numeric(number)
        } else {
            FieldValue::Categorical(number.to_string())
        }
    }
}

impl From<i32> for FieldValue {
    fn from(number: i32) -> Self {
        FieldValue::Numeric(f64::from(number))
    }
}

impl From<i64> for FieldValue {
    fn from(number: i64) -> Self {
        FieldValue::Numeric(number as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        match Self::parse(&text) {
            FieldValue::Numeric(number) => FieldValue::Numeric(number),
            FieldValue::Categorical(_) => FieldValue::Categorical(text),
        }
    }
}

impl From<&FieldValue> for FieldValue {
    fn from(value: &FieldValue) -> Self {
        value.clone()
    }
}
