//! Loose-typed JSON scalars as they appear in bbmodel files.
//!
//! Blockbench writes the same logical field as an integer, an integral float,
//! or a numeric string depending on version and code path. All numeric reads
//! go through here.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    #[error("value is missing")]
    Missing,
    #[error("expected a number, found {0}")]
    NotNumeric(&'static str),
    #[error("number {0} is not integral")]
    NotIntegral(f64),
    #[error("string {0:?} is not numeric")]
    BadString(String),
}

/// Integers, integral floats and numeric strings.
pub fn coerce_int(value: Option<&Value>) -> Result<i64, CoerceError> {
    match value {
        None | Some(Value::Null) => Err(CoerceError::Missing),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            let f = n.as_f64().unwrap_or(f64::NAN);
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Ok(f as i64)
            } else {
                Err(CoerceError::NotIntegral(f))
            }
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| CoerceError::BadString(s.clone())),
        Some(other) => Err(CoerceError::NotNumeric(kind_name(other))),
    }
}

pub fn coerce_f64(value: Option<&Value>) -> Result<f64, CoerceError> {
    match value {
        None | Some(Value::Null) => Err(CoerceError::Missing),
        Some(Value::Number(n)) => n.as_f64().ok_or(CoerceError::NotNumeric("number")),
        // JSON numbers are always finite; strings like "nan" or "inf" are not.
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| CoerceError::BadString(s.clone())),
        Some(other) => Err(CoerceError::NotNumeric(kind_name(other))),
    }
}

/// Positive integer or `default`; anything else falls back silently.
pub fn read_positive_int(value: Option<&Value>, default: i64) -> i64 {
    match coerce_int(value) {
        Ok(v) if v > 0 => v,
        _ => default,
    }
}

pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
