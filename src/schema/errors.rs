//! Cast error types
//!
//! Two disjoint families:
//! - `ValidationError`: the input does not conform. Carries the offending
//!   value and the path to it. Error codes:
//!   - VALUE_INVALID
//!   - VALUE_MISSING
//!   - KEY_INVALID
//!   - KEY_MISSING
//!   - KEY_EXTRA
//! - `SchemaError`: the schema or the registries were misused. Never
//!   caught by the engine; always reaches the caller.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::value::Value;

/// Validation failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Value present but rejected
    InvalidValue,
    /// Value absent and not optional
    MissingValue,
    /// Key of a record or map rejected
    InvalidKey,
    /// Declared key absent
    MissingKey,
    /// Undeclared key present
    ExtraKey,
}

impl ValidationErrorKind {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorKind::InvalidValue => "VALUE_INVALID",
            ValidationErrorKind::MissingValue => "VALUE_MISSING",
            ValidationErrorKind::InvalidKey => "KEY_INVALID",
            ValidationErrorKind::MissingKey => "KEY_MISSING",
            ValidationErrorKind::ExtraKey => "KEY_EXTRA",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A value that failed validation, with the path to it.
///
/// Segments are pushed innermost first while the error unwinds through the
/// validator tree, so `path` is stored reversed.
#[derive(Debug, Clone)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    value: Option<Value>,
    reversed_path: Vec<String>,
    cause: Option<Box<ValidationError>>,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, value: Option<Value>) -> Self {
        Self {
            kind,
            value,
            reversed_path: Vec::new(),
            cause: None,
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(value: impl Into<Option<Value>>) -> Self {
        Self::new(ValidationErrorKind::InvalidValue, value.into())
    }

    /// Create a missing value error
    pub fn missing_value() -> Self {
        Self::new(ValidationErrorKind::MissingValue, None)
    }

    /// Create an invalid key error wrapping the failure raised for that key
    pub fn invalid_key(key: Value, cause: ValidationError) -> Self {
        Self {
            cause: Some(Box::new(cause)),
            ..Self::new(ValidationErrorKind::InvalidKey, Some(key))
        }
    }

    /// Create a missing key error
    pub fn missing_key(key: impl Into<Value>) -> Self {
        Self::new(ValidationErrorKind::MissingKey, Some(key.into()))
    }

    /// Create an extra key error
    pub fn extra_key(key: impl Into<Value>) -> Self {
        Self::new(ValidationErrorKind::ExtraKey, Some(key.into()))
    }

    /// Prepends a path segment.
    pub fn add_key(&mut self, key: impl fmt::Display) -> &mut Self {
        self.reversed_path.push(key.to_string());
        self
    }

    /// Prepends a path segment, by value.
    pub fn with_key(mut self, key: impl fmt::Display) -> Self {
        self.add_key(key);
        self
    }

    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// The offending value; for key errors, the key.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The failure raised for the key, for key-invalid errors.
    pub fn cause(&self) -> Option<&ValidationError> {
        self.cause.as_deref()
    }

    /// Raw path segments, outermost first.
    pub fn path(&self) -> Vec<&str> {
        self.reversed_path.iter().rev().map(String::as_str).collect()
    }

    /// Rendered path, e.g. `$.items[1]['content-type']`.
    pub fn rendered_path(&self) -> String {
        let mut out = String::from("$");
        for segment in self.reversed_path.iter().rev() {
            out.push_str(&render_segment(segment));
        }
        out
    }

    /// `on path $...` or `itself` when the failure is at the root.
    pub fn call_path(&self) -> String {
        if self.reversed_path.is_empty() {
            "itself".to_string()
        } else {
            format!("on path {}", self.rendered_path())
        }
    }

    fn key_text(&self) -> String {
        self.value
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_else(|| "undefined".to_string())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.call_path();
        match self.kind {
            ValidationErrorKind::InvalidValue => write!(f, "Value {} is not valid.", path),
            ValidationErrorKind::MissingValue => write!(f, "Value {} is missing.", path),
            ValidationErrorKind::InvalidKey => {
                write!(f, "Key {} of the object {} is not valid.", self.key_text(), path)
            }
            ValidationErrorKind::MissingKey => {
                write!(f, "Key {} of the object {} is missing.", self.key_text(), path)
            }
            ValidationErrorKind::ExtraKey => write!(
                f,
                "Key {} of the object {} is not allowed to be present.",
                self.key_text(),
                path
            ),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

fn plain_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").expect("valid regex"))
}

fn index_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+$").expect("valid regex"))
}

/// Renders one path segment: `.name`, `[3]` or `['any text']`.
pub fn render_segment(key: &str) -> String {
    if plain_key_pattern().is_match(key) {
        format!(".{}", key)
    } else if index_pattern().is_match(key) {
        format!("[{}]", key)
    } else {
        format!("['{}']", key)
    }
}

/// Usage and configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Type {0} does not support casting.")]
    NotCastable(String),

    #[error("Option \"{option}\" is allowed only on {allowed}, {type_name} given.")]
    UnsupportedOption {
        option: &'static str,
        allowed: &'static str,
        type_name: String,
    },

    #[error("Options \"values\" and \"entries\" cannot be declared on the same schema.")]
    ConflictingOptions,

    #[error("Type \"{0}\" is already registered.")]
    DuplicateType(String),

    #[error("Type \"{0}\" is not registered.")]
    UnknownType(String),

    #[error("Validator \"{0}\" is already registered.")]
    DuplicateValidator(String),

    #[error("Validator \"{0}\" is not registered.")]
    UnknownValidator(String),

    #[error("Schema \"{0}\" is already loaded.")]
    DuplicateSchema(String),

    #[error("Schema \"{0}\" is not loaded.")]
    UnknownSchema(String),

    #[error("Malformed schema '{source_name}': {reason}")]
    Malformed { source_name: String, reason: String },

    #[error("Registry lock poisoned")]
    Poisoned,
}

impl SchemaError {
    /// Create an error for a malformed schema document
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a cast: either the input or the schema is at fault.
#[derive(Debug, Clone, Error)]
pub enum CastError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl CastError {
    /// Prepends a path segment to a validation failure; schema errors pass
    /// through untouched.
    pub fn with_key(self, key: impl fmt::Display) -> Self {
        match self {
            CastError::Validation(error) => CastError::Validation(error.with_key(key)),
            other => other,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CastError::Validation(error) => Some(error),
            CastError::Schema(_) => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CastError::Validation(_))
    }

    /// Returns the validation kind, if this is a validation failure
    pub fn kind(&self) -> Option<ValidationErrorKind> {
        self.as_validation().map(ValidationError::kind)
    }
}

/// Result type for casts
pub type CastResult<T> = Result<T, CastError>;

/// Result type for schema construction and registry operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ValidationErrorKind::InvalidValue.code(), "VALUE_INVALID");
        assert_eq!(ValidationErrorKind::MissingValue.code(), "VALUE_MISSING");
        assert_eq!(ValidationErrorKind::InvalidKey.code(), "KEY_INVALID");
        assert_eq!(ValidationErrorKind::MissingKey.code(), "KEY_MISSING");
        assert_eq!(ValidationErrorKind::ExtraKey.code(), "KEY_EXTRA");
    }

    #[test]
    fn test_segment_rendering() {
        assert_eq!(render_segment("foo"), ".foo");
        assert_eq!(render_segment("_private1"), "._private1");
        assert_eq!(render_segment("12"), "[12]");
        assert_eq!(render_segment("content-type"), "['content-type']");
        assert_eq!(render_segment("1abc"), "['1abc']");
    }

    #[test]
    fn test_keys_are_prepended() {
        let error = ValidationError::invalid_value(Value::from(1))
            .with_key("bar")
            .with_key(1)
            .with_key("foo");
        assert_eq!(error.path(), vec!["foo", "1", "bar"]);
        assert_eq!(error.rendered_path(), "$.foo[1].bar");
        assert_eq!(error.to_string(), "Value on path $.foo[1].bar is not valid.");
    }

    #[test]
    fn test_root_messages_say_itself() {
        assert_eq!(
            ValidationError::missing_value().to_string(),
            "Value itself is missing."
        );
        assert_eq!(
            ValidationError::missing_key("baz").to_string(),
            "Key baz of the object itself is missing."
        );
        assert_eq!(
            ValidationError::extra_key("bar").with_key("inner").to_string(),
            "Key bar of the object on path $.inner is not allowed to be present."
        );
    }

    #[test]
    fn test_invalid_key_keeps_cause() {
        let cause = ValidationError::invalid_value(Value::from("x y"));
        let error = ValidationError::invalid_key(Value::from("x y"), cause);
        assert_eq!(error.kind(), ValidationErrorKind::InvalidKey);
        assert_eq!(error.to_string(), "Key x y of the object itself is not valid.");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_cast_error_with_key_skips_schema_errors() {
        let error = CastError::from(SchemaError::ConflictingOptions).with_key("foo");
        assert!(!error.is_validation());
        assert_eq!(error.kind(), None);

        let error = CastError::from(ValidationError::missing_value()).with_key("foo");
        assert_eq!(error.as_validation().unwrap().rendered_path(), "$.foo");
    }
}
