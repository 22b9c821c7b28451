//! Homogeneous member casting (`values`)

use super::errors::{CastResult, SchemaResult, ValidationError};
use super::types::{Cast, TypeRef};
use super::validator::SubSchema;
use crate::value::{OrderedMap, Value};

/// Casts every member of a collection through one shared child validator.
///
/// A failure is tagged with the failing member's index (lists, sets) or
/// key (records, maps).
pub struct Values {
    validator: TypeRef,
}

impl Values {
    pub fn new(schema: impl Into<SubSchema>) -> SchemaResult<Self> {
        Ok(Self {
            validator: schema.into().compile()?,
        })
    }

    /// Casts a sequence, tagging failures with the position.
    pub fn cast_sequence(&self, items: Vec<Value>) -> CastResult<Vec<Value>> {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| self.cast_member(item).map_err(|e| e.with_key(index)))
            .collect()
    }

    pub(crate) fn cast_member(&self, item: Value) -> CastResult<Value> {
        self.validator.cast(Some(item))
    }

    /// Casts the members of a list, set, record or map, keeping the
    /// collection kind and member order.
    pub(crate) fn cast_members(&self, value: Value) -> CastResult<Value> {
        match value {
            Value::List(items) => Ok(Value::List(self.cast_sequence(items)?)),
            Value::Set(items) => Ok(Value::set(self.cast_sequence(items)?)),
            Value::Record(record) => {
                let mut out = OrderedMap::new();
                for (key, member) in record {
                    let cast = self.cast_member(member).map_err(|e| e.with_key(&key))?;
                    out.insert(key, cast);
                }
                Ok(Value::Record(out))
            }
            Value::Map(map) => {
                let mut out = OrderedMap::new();
                for (key, member) in map {
                    let cast = self.cast_member(member).map_err(|e| e.with_key(&key))?;
                    out.insert(key, cast);
                }
                Ok(Value::Map(out))
            }
            other => Err(ValidationError::invalid_value(other).into()),
        }
    }
}

impl Cast for Values {
    fn name(&self) -> &str {
        "Values"
    }

    /// Accepts a list or set and returns the cast members as a list.
    fn cast(&self, value: Option<Value>) -> CastResult<Value> {
        match value {
            Some(Value::List(items)) | Some(Value::Set(items)) => {
                Ok(Value::List(self.cast_sequence(items)?))
            }
            Some(other) => Err(ValidationError::invalid_value(other).into()),
            None => Err(ValidationError::missing_value().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::ValidationErrorKind;
    use crate::schema::types::Builtin;
    use crate::schema::validator::Schema;

    fn numbers() -> Values {
        Values::new(Schema::new(Builtin::Number).cast(true)).unwrap()
    }

    #[test]
    fn test_cast_sequence_tags_index() {
        let values = numbers();
        let cast = values
            .cast_sequence(vec![Value::from("1"), Value::from("2")])
            .unwrap();
        assert_eq!(cast, vec![Value::from(1), Value::from(2)]);

        let error = values
            .cast_sequence(vec![Value::from("1"), Value::from("x")])
            .unwrap_err();
        let error = error.as_validation().unwrap();
        assert_eq!(error.kind(), ValidationErrorKind::InvalidValue);
        assert_eq!(error.rendered_path(), "$[1]");
    }

    #[test]
    fn test_record_members_tagged_by_key() {
        let values = numbers();
        let record = Value::record([("a", Value::from("1")), ("b-c", Value::from("x"))]);
        let error = values.cast_members(record).unwrap_err();
        assert_eq!(error.as_validation().unwrap().rendered_path(), "$['b-c']");
    }

    #[test]
    fn test_map_members_keep_keys() {
        let values = numbers();
        let map = Value::map([(Value::from(1), Value::from("10"))]);
        assert_eq!(
            values.cast_members(map).unwrap(),
            Value::map([(Value::from(1), Value::from(10))])
        );
    }

    #[test]
    fn test_set_members_collapse_after_cast() {
        let values = numbers();
        let set = Value::set(vec![Value::from("1"), Value::from(1)]);
        assert_eq!(
            values.cast_members(set).unwrap(),
            Value::set(vec![Value::from(1)])
        );
    }

    #[test]
    fn test_standalone_cast() {
        let values = numbers();
        assert_eq!(
            Cast::cast(&values, Some(Value::set(vec![Value::from("3")]))).unwrap(),
            Value::List(vec![Value::from(3)])
        );
        assert!(Cast::cast(&values, Some(Value::from("3"))).is_err());
    }
}
