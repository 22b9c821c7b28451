//! Tests and coercions behind the builtin type descriptors

use std::sync::OnceLock;

use regex::Regex;

use super::errors::{CastResult, ValidationError};
use crate::value::Value;

pub(crate) fn is_text(value: &Value) -> bool {
    matches!(value, Value::Text(_))
}

/// Stringifies any value.
pub(crate) fn to_text(value: Value) -> CastResult<Value> {
    match value {
        Value::Text(_) => Ok(value),
        other => Ok(Value::Text(other.to_string())),
    }
}

pub(crate) fn is_number(value: &Value) -> bool {
    matches!(value, Value::Number(n) if !n.is_nan())
}

/// Passes numbers through and parses the numeric prefix of text.
pub(crate) fn to_number(value: Value) -> CastResult<Value> {
    let parsed = match &value {
        Value::Number(n) => Some(*n),
        Value::Text(s) => parse_leading_float(s),
        _ => None,
    };

    match parsed {
        Some(n) if !n.is_nan() => Ok(Value::Number(n)),
        _ => Err(ValidationError::invalid_value(value).into()),
    }
}

fn leading_float_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?))")
            .expect("valid regex")
    })
}

/// Parses the longest numeric prefix of `text`, ignoring leading
/// whitespace. `"3.5kg"` yields 3.5, `"kg"` yields nothing.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let captures = leading_float_pattern().captures(text)?;
    captures.get(1)?.as_str().parse::<f64>().ok()
}

pub(crate) fn is_boolean(value: &Value) -> bool {
    matches!(value, Value::Bool(_))
}

pub(crate) fn to_boolean(value: Value) -> CastResult<Value> {
    match &value {
        Value::Bool(_) => Ok(value),
        Value::Number(n) if *n == 1.0 => Ok(Value::Bool(true)),
        Value::Number(n) if *n == 0.0 => Ok(Value::Bool(false)),
        Value::Text(s) if s == "1" || s == "true" => Ok(Value::Bool(true)),
        Value::Text(s) if s == "0" || s == "false" => Ok(Value::Bool(false)),
        _ => Err(ValidationError::invalid_value(value).into()),
    }
}

pub(crate) fn is_token(value: &Value) -> bool {
    matches!(value, Value::Token(_))
}

pub(crate) fn is_list(value: &Value) -> bool {
    matches!(value, Value::List(_))
}

pub(crate) fn is_set(value: &Value) -> bool {
    matches!(value, Value::Set(_))
}

pub(crate) fn is_map(value: &Value) -> bool {
    matches!(value, Value::Map(_))
}

pub(crate) fn is_record(value: &Value) -> bool {
    matches!(value, Value::Record(_))
}

/// Parses text as JSON; everything but tokens passes through.
pub(crate) fn to_json_document(value: Value) -> CastResult<Value> {
    match value {
        Value::Text(ref text) => match serde_json::from_str::<serde_json::Value>(text) {
            Ok(parsed) => Ok(Value::from(parsed)),
            Err(_) => Err(ValidationError::invalid_value(value).into()),
        },
        Value::Token(_) => Err(ValidationError::invalid_value(value).into()),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::ValidationErrorKind;

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("42"), Some(42.0));
        assert_eq!(parse_leading_float("  -123.456"), Some(-123.456));
        assert_eq!(parse_leading_float("3.5kg"), Some(3.5));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("1e3"), Some(1000.0));
        assert_eq!(parse_leading_float("1e"), Some(1.0));
        assert_eq!(parse_leading_float("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_leading_float("x1"), None);
        assert_eq!(parse_leading_float(""), None);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(Value::from("2")).unwrap(), Value::from(2));
        assert_eq!(to_number(Value::from(7)).unwrap(), Value::from(7));

        let error = to_number(Value::from("x")).unwrap_err();
        assert_eq!(error.kind(), Some(ValidationErrorKind::InvalidValue));
        assert!(to_number(Value::from(f64::NAN)).is_err());
        assert!(to_number(Value::Bool(true)).is_err());
    }

    #[test]
    fn test_is_number_rejects_nan() {
        assert!(is_number(&Value::from(1.5)));
        assert!(!is_number(&Value::from(f64::NAN)));
        assert!(!is_number(&Value::from("1")));
    }

    #[test]
    fn test_to_boolean() {
        for truthy in [Value::from(1), Value::from("1"), Value::from("true"), Value::Bool(true)] {
            assert_eq!(to_boolean(truthy).unwrap(), Value::Bool(true));
        }
        for falsy in [Value::from(0), Value::from("0"), Value::from("false"), Value::Bool(false)] {
            assert_eq!(to_boolean(falsy).unwrap(), Value::Bool(false));
        }
        assert!(to_boolean(Value::from("yes")).is_err());
        assert!(to_boolean(Value::from(2)).is_err());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(Value::from(123)).unwrap(), Value::from("123"));
        assert_eq!(to_text(Value::Bool(false)).unwrap(), Value::from("false"));
        assert_eq!(to_text(Value::Null).unwrap(), Value::from("null"));
    }

    #[test]
    fn test_to_json_document() {
        let parsed = to_json_document(Value::from(r#"{"a": [1, 2]}"#)).unwrap();
        assert_eq!(
            parsed,
            Value::record([("a", Value::List(vec![Value::from(1), Value::from(2)]))])
        );

        let record = Value::record([("b", Value::Null)]);
        assert_eq!(to_json_document(record.clone()).unwrap(), record);

        assert!(to_json_document(Value::from("{not json")).is_err());
    }
}
