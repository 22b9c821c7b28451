//! Schema Invariant Tests
//!
//! - Absent values resolve to null, the default, or value-missing
//! - Casting a cast value changes nothing
//! - Multi-types pick the first accepting alternative
//! - Entries reject undeclared keys and fill declared defaults
//! - Failure paths name the offending member

use proptest::prelude::*;
use shapecast::schema::{
    parse_leading_float, Builtin, MultiValidator, Schema, SubSchema, Type, TypeRef,
};
use shapecast::{Cast, CastError, ValidationError, ValidationErrorKind, Validator, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn kind(result: Result<Value, CastError>) -> ValidationErrorKind {
    result
        .unwrap_err()
        .kind()
        .expect("expected a validation failure")
}

fn comma_numbers() -> TypeRef {
    Type::from_cast("comma_numbers", |value| {
        let text = match &value {
            Value::Text(text) => text,
            _ => return Err(ValidationError::invalid_value(value).into()),
        };
        let numbers: Option<Vec<Value>> = text
            .split(',')
            .map(|part| parse_leading_float(part).map(Value::from))
            .collect();
        numbers
            .map(Value::List)
            .ok_or_else(|| ValidationError::invalid_value(value.clone()).into())
    })
    .into_ref()
}

// =============================================================================
// Absent Value Tests
// =============================================================================

/// Optional without default: absence is null.
#[test]
fn test_optional_absent_is_null() {
    for builtin in Builtin::ALL {
        let validator = Validator::new(Schema::new(builtin).optional(true)).unwrap();
        assert_eq!(validator.cast(None).unwrap(), Value::Null, "{}", builtin);
    }
}

/// Neither optional nor defaulted: absence is value-missing.
#[test]
fn test_required_absent_is_missing() {
    for builtin in Builtin::ALL {
        let validator = Validator::new(Schema::new(builtin)).unwrap();
        assert_eq!(kind(validator.cast(None)), ValidationErrorKind::MissingValue);
    }
}

// =============================================================================
// Coercion Idempotence Tests
// =============================================================================

proptest! {
    #[test]
    fn prop_number_cast_is_idempotent(n in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let validator = Validator::new(Schema::new(Builtin::Number).cast(true)).unwrap();
        let once = validator.cast_value(n.to_string()).unwrap();
        let twice = validator.cast(Some(once.clone())).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_text_cast_is_idempotent(s in ".*") {
        let validator = Validator::new(Schema::new(Builtin::Text).cast(true)).unwrap();
        let once = validator.cast_value(s.as_str()).unwrap();
        let twice = validator.cast(Some(once.clone())).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_text_cast_of_numbers_is_idempotent(n in any::<i32>()) {
        let validator = Validator::new(Schema::new(Builtin::Text).cast(true)).unwrap();
        let once = validator.cast_value(n).unwrap();
        prop_assert_eq!(&once, &Value::from(n.to_string()));
        prop_assert_eq!(validator.cast(Some(once.clone())).unwrap(), once);
    }

    #[test]
    fn prop_boolean_cast_is_idempotent(input in prop_oneof![
        Just(Value::from(0)),
        Just(Value::from(1)),
        Just(Value::from("0")),
        Just(Value::from("1")),
        Just(Value::from("true")),
        Just(Value::from("false")),
        any::<bool>().prop_map(Value::Bool),
    ]) {
        let validator = Validator::new(Schema::new(Builtin::Boolean).cast(true)).unwrap();
        let once = validator.cast(Some(input)).unwrap();
        prop_assert_eq!(validator.cast(Some(once.clone())).unwrap(), once);
    }
}

// =============================================================================
// Multi-Type Tests
// =============================================================================

/// The first accepting alternative decides the result.
#[test]
fn test_multi_type_first_success() {
    let multi = MultiValidator::new([
        SubSchema::from(Schema::new(Builtin::Text)),
        Schema::new(Builtin::Number).cast(true).into(),
    ])
    .unwrap();

    assert_eq!(multi.cast(Some(Value::from("1"))).unwrap(), Value::from("1"));
    assert_eq!(multi.cast(Some(Value::from(1))).unwrap(), Value::from(1));

    let multi = MultiValidator::new([
        SubSchema::from(Schema::new(Builtin::Number).cast(true)),
        Schema::new(Builtin::Text).into(),
    ])
    .unwrap();
    assert_eq!(multi.cast(Some(Value::from("1"))).unwrap(), Value::from(1));
}

/// A multi-type can be the type of a schema.
#[test]
fn test_multi_type_as_schema_type() {
    let multi: TypeRef = std::sync::Arc::new(
        MultiValidator::new([Builtin::Number, Builtin::Boolean]).unwrap(),
    );
    let validator = Validator::list(Schema::new(multi)).unwrap();

    let input = Value::List(vec![Value::from(1), Value::Bool(false)]);
    assert_eq!(validator.cast_value(input.clone()).unwrap(), input);

    let error = validator
        .cast_value(Value::List(vec![Value::from(1), Value::from("no")]))
        .unwrap_err();
    let error = error.as_validation().unwrap();
    assert_eq!(error.kind(), ValidationErrorKind::InvalidValue);
    assert_eq!(error.rendered_path(), "$[1]");
}

// =============================================================================
// Entries Tests
// =============================================================================

/// Undeclared keys fail with key-extra.
#[test]
fn test_entries_reject_extra_key() {
    let validator = Validator::record([("foo", Builtin::Number)]).unwrap();

    let input = Value::record([("foo", Value::from(1)), ("bar", Value::from(2))]);
    let error = validator.cast_value(input).unwrap_err();
    let error = error.as_validation().unwrap();
    assert_eq!(error.kind(), ValidationErrorKind::ExtraKey);
    assert_eq!(error.value(), Some(&Value::from("bar")));
    assert_eq!(
        error.to_string(),
        "Key bar of the object itself is not allowed to be present."
    );
}

/// Absent declared keys take their defaults.
#[test]
fn test_entries_fill_defaults() {
    let validator = Validator::record([
        ("foo", SubSchema::from(Builtin::Number)),
        ("baz", Schema::new(Builtin::Text).default_value("ipsum").into()),
    ])
    .unwrap();

    let out = validator
        .cast_value(Value::record([("foo", Value::from(1))]))
        .unwrap();
    assert_eq!(
        out,
        Value::record([("foo", Value::from(1)), ("baz", Value::from("ipsum"))])
    );
}

/// Absent declared keys without a default fail with key-missing.
#[test]
fn test_entries_missing_key() {
    let validator = Validator::record([("foo", Builtin::Number)]).unwrap();
    let error = validator
        .cast_value(Value::record::<&str>([]))
        .unwrap_err();
    assert_eq!(error.kind(), Some(ValidationErrorKind::MissingKey));
}

// =============================================================================
// Path Tests
// =============================================================================

/// Nested failures render the full path.
#[test]
fn test_nested_path() {
    let validator =
        Validator::list(Validator::record([("foo", Builtin::Number)]).unwrap()).unwrap();

    let input = Value::List(vec![
        Value::record([("foo", Value::from(1))]),
        Value::record([("foo", Value::from("x"))]),
    ]);
    let error = validator.cast_value(input).unwrap_err();
    let error = error.as_validation().unwrap();
    assert_eq!(error.path(), vec!["1", "foo"]);
    assert_eq!(error.rendered_path(), "$[1].foo");
    assert_eq!(error.to_string(), "Value on path $[1].foo is not valid.");
}

/// Keys that are not identifiers render quoted.
#[test]
fn test_quoted_path_segment() {
    let validator = Validator::new(
        Schema::new(Builtin::Record).values(Schema::new(Builtin::Number)),
    )
    .unwrap();

    let input = Value::record([("content-type", Value::from("json"))]);
    let error = validator.cast_value(input).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Value on path $['content-type'] is not valid."
    );
}

// =============================================================================
// Values Tests
// =============================================================================

/// A list of numbers casts each member.
#[test]
fn test_list_of_numbers() {
    let validator = Validator::list(Schema::new(Builtin::Number).cast(true)).unwrap();

    let input = Value::List(vec![Value::from("1"), Value::from("2"), Value::from("3.5")]);
    assert_eq!(
        validator.cast_value(input).unwrap(),
        Value::List(vec![Value::from(1), Value::from(2), Value::from(3.5)])
    );

    let input = Value::List(vec![Value::from("1"), Value::from("x")]);
    let error = validator.cast_value(input).unwrap_err();
    let error = error.as_validation().unwrap();
    assert_eq!(error.kind(), ValidationErrorKind::InvalidValue);
    assert_eq!(error.path(), vec!["1"]);
}

/// A custom cast produces the canonical value.
#[test]
fn test_custom_comma_cast() {
    let validator = Validator::new(Schema::new(comma_numbers()).cast(true)).unwrap();

    assert_eq!(
        validator.cast_value("1,2,-4").unwrap(),
        Value::List(vec![Value::from(1), Value::from(2), Value::from(-4)])
    );

    let error = validator.cast_value("1,x").unwrap_err();
    let error = error.as_validation().unwrap();
    assert_eq!(error.kind(), ValidationErrorKind::InvalidValue);
    assert_eq!(error.value(), Some(&Value::from("1,x")));
}

/// Custom types do not declare members.
#[test]
fn test_custom_type_rejects_member_options() {
    let result = Validator::new(
        Schema::new(comma_numbers())
            .cast(true)
            .values(Schema::new(Builtin::Number)),
    );
    assert!(result.is_err());
}

/// Sets keep their kind through member casting.
#[test]
fn test_set_of_numbers() {
    let validator = Validator::set(Schema::new(Builtin::Number).cast(true)).unwrap();
    let input = Value::set(vec![Value::from("2"), Value::from("1")]);
    assert_eq!(
        validator.cast_value(input).unwrap(),
        Value::set(vec![Value::from(2), Value::from(1)])
    );
}

/// Map keys and values are cast independently.
#[test]
fn test_map_keys_and_values() {
    let validator = Validator::new(
        Schema::new(Builtin::Map)
            .keys(Schema::new(Builtin::Number).cast(true))
            .values(Schema::new(Builtin::Boolean).cast(true)),
    )
    .unwrap();

    let input = Value::map([(Value::from("1"), Value::from("true"))]);
    assert_eq!(
        validator.cast_value(input).unwrap(),
        Value::map([(Value::from(1), Value::Bool(true))])
    );

    let input = Value::map([(Value::from("k"), Value::from("true"))]);
    let error = validator.cast_value(input).unwrap_err();
    let error = error.as_validation().unwrap();
    assert_eq!(error.kind(), ValidationErrorKind::InvalidKey);
    assert_eq!(error.value(), Some(&Value::from("k")));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// A compiled validator is shared across threads.
#[test]
fn test_validator_is_shareable() {
    let validator = std::sync::Arc::new(
        Validator::list(Schema::new(Builtin::Number).cast(true)).unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let validator = std::sync::Arc::clone(&validator);
            std::thread::spawn(move || {
                validator
                    .cast_value(Value::List(vec![Value::from(i.to_string())]))
                    .unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(
            handle.join().unwrap(),
            Value::List(vec![Value::from(i as i32)])
        );
    }
}
