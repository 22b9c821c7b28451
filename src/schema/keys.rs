//! Key casting (`keys`)

use super::errors::{CastError, CastResult, SchemaResult, ValidationError};
use super::types::{Cast, TypeRef};
use super::validator::SubSchema;
use crate::value::{OrderedMap, Value};

/// Casts every key of a record or map through one child validator and
/// rebuilds the container under the cast keys.
///
/// A rejected key surfaces as a key-invalid error carrying the original
/// key, with the child failure as its cause. Keys that collapse onto the
/// same cast key keep the first position and the last value.
pub struct Keys {
    validator: TypeRef,
}

impl Keys {
    pub fn new(schema: impl Into<SubSchema>) -> SchemaResult<Self> {
        Ok(Self {
            validator: schema.into().compile()?,
        })
    }

    fn cast_key(&self, key: Value) -> CastResult<Value> {
        match self.validator.cast(Some(key.clone())) {
            Ok(cast) => Ok(cast),
            Err(CastError::Validation(cause)) => {
                Err(ValidationError::invalid_key(key, cause).into())
            }
            Err(error) => Err(error),
        }
    }

    pub(crate) fn rename(&self, value: Value) -> CastResult<Value> {
        match value {
            Value::Record(record) => {
                let mut out = OrderedMap::new();
                for (key, member) in record {
                    let cast = self.cast_key(Value::Text(key))?;
                    let key = match cast {
                        Value::Text(text) => text,
                        other => other.to_string(),
                    };
                    out.insert(key, member);
                }
                Ok(Value::Record(out))
            }
            Value::Map(map) => {
                let mut out = OrderedMap::new();
                for (key, member) in map {
                    out.insert(self.cast_key(key)?, member);
                }
                Ok(Value::Map(out))
            }
            other => Err(ValidationError::invalid_value(other).into()),
        }
    }
}
