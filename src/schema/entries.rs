//! Per-key casting of records and maps (`entries`)

use super::errors::{CastError, CastResult, SchemaResult, ValidationError, ValidationErrorKind};
use super::types::{Cast, TypeRef};
use super::validator::SubSchema;
use crate::value::{OrderedMap, Value};

/// Casts each declared key through its own validator.
///
/// Output order: declared keys present in the input, in input order, then
/// declared keys absent from the input, in declaration order. Absent
/// optional keys come out as `Null`.
pub struct Entries {
    declared: Vec<(String, TypeRef)>,
}

impl Entries {
    pub fn new<K, S>(entries: impl IntoIterator<Item = (K, S)>) -> SchemaResult<Self>
    where
        K: Into<String>,
        S: Into<SubSchema>,
    {
        let mut declared: Vec<(String, TypeRef)> = Vec::new();
        for (key, schema) in entries {
            let key = key.into();
            let validator = schema.into().compile()?;
            match declared.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = validator,
                None => declared.push((key, validator)),
            }
        }
        Ok(Self { declared })
    }

    fn validator(&self, key: &str) -> Option<&TypeRef> {
        self.declared
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, validator)| validator)
    }

    /// Casts `(key, value)` pairs, returning them in output order.
    fn cast_pairs<I>(&self, pairs: I) -> CastResult<Vec<(String, Value)>>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut out: Vec<(String, Value)> = Vec::with_capacity(self.declared.len());

        for (key, member) in pairs {
            let (key, validator) = match &key {
                Value::Text(text) => match self.validator(text) {
                    Some(validator) => (text.clone(), validator),
                    None => return Err(ValidationError::extra_key(key).into()),
                },
                _ => return Err(ValidationError::extra_key(key).into()),
            };
            let cast = validator
                .cast(Some(member))
                .map_err(|e| e.with_key(&key))?;
            out.push((key, cast));
        }

        for (key, validator) in &self.declared {
            if out.iter().any(|(k, _)| k == key) {
                continue;
            }
            match validator.cast(None) {
                Ok(cast) => out.push((key.clone(), cast)),
                Err(CastError::Validation(error))
                    if error.kind() == ValidationErrorKind::MissingValue =>
                {
                    return Err(ValidationError::missing_key(key.as_str()).into());
                }
                Err(error) => return Err(error.with_key(key)),
            }
        }

        Ok(out)
    }
}

impl Cast for Entries {
    fn name(&self) -> &str {
        "Entries"
    }

    /// Accepts a record or a map and returns the same kind.
    fn cast(&self, value: Option<Value>) -> CastResult<Value> {
        match value {
            Some(Value::Record(record)) => {
                let pairs = record.into_iter().map(|(k, v)| (Value::Text(k), v));
                let out: OrderedMap<String> = self.cast_pairs(pairs)?.into_iter().collect();
                Ok(Value::Record(out))
            }
            Some(Value::Map(map)) => {
                let out: OrderedMap<Value> = self
                    .cast_pairs(map)?
                    .into_iter()
                    .map(|(k, v)| (Value::Text(k), v))
                    .collect();
                Ok(Value::Map(out))
            }
            Some(other) => Err(ValidationError::invalid_value(other).into()),
            None => Err(ValidationError::missing_value().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::Builtin;
    use crate::schema::validator::Schema;

    fn entries() -> Entries {
        Entries::new([
            ("foo", SubSchema::from(Schema::new(Builtin::Number).cast(true))),
            ("baz", Schema::new(Builtin::Text).default_value("ipsum").into()),
        ])
        .unwrap()
    }

    #[test]
    fn test_extra_key_is_rejected() {
        let input = Value::record([("foo", Value::from(1)), ("bar", Value::from(2))]);
        let error = entries().cast(Some(input)).unwrap_err();
        let error = error.as_validation().unwrap();
        assert_eq!(error.kind(), ValidationErrorKind::ExtraKey);
        assert_eq!(error.value(), Some(&Value::from("bar")));
    }

    #[test]
    fn test_absent_key_gets_default_after_present_keys() {
        let input = Value::record([("foo", Value::from("7"))]);
        let out = entries().cast(Some(input)).unwrap();
        assert_eq!(
            out,
            Value::record([("foo", Value::from(7)), ("baz", Value::from("ipsum"))])
        );
    }

    #[test]
    fn test_present_keys_keep_input_order() {
        let input = Value::record([("baz", Value::from("a")), ("foo", Value::from(1))]);
        let out = entries().cast(Some(input)).unwrap();
        let keys: Vec<&String> = out.as_record().unwrap().keys().collect();
        assert_eq!(keys, vec!["baz", "foo"]);
    }

    #[test]
    fn test_absent_required_key_is_missing_key() {
        let error = entries()
            .cast(Some(Value::record::<&str>([])))
            .unwrap_err();
        let error = error.as_validation().unwrap();
        assert_eq!(error.kind(), ValidationErrorKind::MissingKey);
        assert_eq!(error.to_string(), "Key foo of the object itself is missing.");
    }

    #[test]
    fn test_member_failure_is_tagged() {
        let input = Value::record([("foo", Value::from("x"))]);
        let error = entries().cast(Some(input)).unwrap_err();
        assert_eq!(error.as_validation().unwrap().rendered_path(), "$.foo");
    }

    #[test]
    fn test_nested_missing_key_is_tagged() {
        let outer = Entries::new([(
            "nested",
            Schema::new(Builtin::Record)
                .default_with(|| Value::record::<&str>([]))
                .entries([("a", Builtin::Text)]),
        )])
        .unwrap();

        let error = outer
            .cast(Some(Value::record::<&str>([])))
            .unwrap_err();
        let error = error.as_validation().unwrap();
        assert_eq!(error.kind(), ValidationErrorKind::MissingKey);
        assert_eq!(error.rendered_path(), "$.nested");
    }

    #[test]
    fn test_nested_missing_value_becomes_missing_key() {
        let entries = Entries::new([(
            "tags",
            Schema::new(Builtin::List)
                .default_with(|| Value::List(vec![Value::Null]))
                .values(Schema::new(Builtin::Text)),
        )])
        .unwrap();

        let error = entries
            .cast(Some(Value::record::<&str>([])))
            .unwrap_err();
        let error = error.as_validation().unwrap();
        assert_eq!(error.kind(), ValidationErrorKind::MissingKey);
        assert!(error.path().is_empty());
        assert_eq!(error.to_string(), "Key tags of the object itself is missing.");
    }

    #[test]
    fn test_map_input_needs_text_keys() {
        let input = Value::map([(Value::from(1), Value::from(1))]);
        let error = entries().cast(Some(input)).unwrap_err();
        assert_eq!(error.kind(), Some(ValidationErrorKind::ExtraKey));

        let input = Value::map([(Value::from("foo"), Value::from("2"))]);
        assert_eq!(
            entries().cast(Some(input)).unwrap(),
            Value::map([
                (Value::from("foo"), Value::from(2)),
                (Value::from("baz"), Value::from("ipsum")),
            ])
        );
    }

    #[test]
    fn test_absent_optional_key_is_null() {
        let entries = Entries::new([("note", Schema::new(Builtin::Text).optional(true))]).unwrap();
        assert_eq!(
            entries.cast(Some(Value::record::<&str>([]))).unwrap(),
            Value::record([("note", Value::Null)])
        );
    }
}
