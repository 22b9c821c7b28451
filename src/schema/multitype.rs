//! Multi-type combinator

use tracing::trace;

use super::errors::{CastError, CastResult, SchemaResult, ValidationError};
use super::types::{Cast, TypeRef};
use super::validator::SubSchema;
use crate::value::Value;

/// Tries alternatives in order and returns the first success.
///
/// Only validation failures move on to the next alternative. When every
/// alternative rejects, the result is value-invalid carrying the original
/// input.
pub struct MultiValidator {
    name: String,
    alternatives: Vec<TypeRef>,
}

impl MultiValidator {
    pub fn new<S>(alternatives: impl IntoIterator<Item = S>) -> SchemaResult<Self>
    where
        S: Into<SubSchema>,
    {
        let alternatives = alternatives
            .into_iter()
            .map(|alternative| alternative.into().compile())
            .collect::<SchemaResult<Vec<_>>>()?;

        let names: Vec<&str> = alternatives.iter().map(|a| a.name()).collect();
        let name = format!("AnyOf<{}>", names.join(" | "));

        Ok(Self { name, alternatives })
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl Cast for MultiValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn cast(&self, value: Option<Value>) -> CastResult<Value> {
        for (index, alternative) in self.alternatives.iter().enumerate() {
            match alternative.cast(value.clone()) {
                Ok(cast) => return Ok(cast),
                Err(CastError::Validation(error)) => {
                    trace!(
                        alternative = index,
                        name = alternative.name(),
                        code = error.kind().code(),
                        "alternative rejected"
                    );
                }
                Err(error) => return Err(error),
            }
        }

        Err(ValidationError::invalid_value(value).into())
    }
}
