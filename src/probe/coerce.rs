//! Conversion of extracted JSON values into gauge readings.
//!
//! Only booleans and numbers can become a reading. Booleans map to
//! `1.0`/`0.0`; every other JSON kind is rejected.

use serde_json::Value;
use tracing::debug;

/// Error returned when a JSON value has no numeric reading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("value of kind '{kind}' cannot be used as a gauge reading")]
pub struct CoercionError {
    pub kind: &'static str,
}

/// Classification of a JSON value for coercion purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Bool(bool),
    Number(f64),
    Other(&'static str),
}

impl From<&Value> for Reading {
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Reading::Bool(*b),
            // Without arbitrary_precision every number has an f64 view.
            Value::Number(n) => match n.as_f64() {
                Some(f) => Reading::Number(f),
                None => Reading::Other("number"),
            },
            other => Reading::Other(json_kind(other)),
        }
    }
}

impl Reading {
    pub fn into_f64(self) -> Result<f64, CoercionError> {
        match self {
            Reading::Bool(b) => {
                debug!("Boolean value {} mapped to {}", b, if b { 1 } else { 0 });
                Ok(if b { 1.0 } else { 0.0 })
            }
            Reading::Number(n) => Ok(n),
            Reading::Other(kind) => Err(CoercionError { kind }),
        }
    }
}

/// Converts a JSON value into a gauge reading.
pub fn coerce(value: &Value) -> Result<f64, CoercionError> {
    Reading::from(value).into_f64()
}

/// Human readable name of a JSON value's kind.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booleans_map_to_one_and_zero() {
        assert_eq!(coerce(&json!(true)), Ok(1.0));
        assert_eq!(coerce(&json!(false)), Ok(0.0));
    }

    #[test]
    fn test_numbers_pass_through_unchanged() {
        assert_eq!(coerce(&json!(42)), Ok(42.0));
        assert_eq!(coerce(&json!(-7)), Ok(-7.0));
        assert_eq!(coerce(&json!(0.1)), Ok(0.1));
        assert_eq!(coerce(&json!(1.7976931348623157e308)), Ok(f64::MAX));
    }

    #[test]
    fn test_other_kinds_are_rejected() {
        for (value, kind) in [
            (json!("1"), "string"),
            (json!(null), "null"),
            (json!([1, 2]), "array"),
            (json!({"a": 1}), "object"),
        ] {
            assert_eq!(coerce(&value), Err(CoercionError { kind }));
        }
    }

    #[test]
    fn test_reading_classification() {
        assert_eq!(Reading::from(&json!(true)), Reading::Bool(true));
        assert_eq!(Reading::from(&json!(2.5)), Reading::Number(2.5));
        assert_eq!(Reading::from(&json!("x")), Reading::Other("string"));
    }
}
