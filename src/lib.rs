//! shapecast - runtime schema validation and value casting
//!
//! Declarative schemas compile into validators that test or coerce
//! dynamic values, recurse into composite members and report the path to
//! the first offending value.

pub mod cli;
pub mod schema;
pub mod value;

pub use schema::{
    Builtin, Cast, CastError, CastResult, MultiValidator, Registry, Schema, SchemaError,
    SchemaLoader, SchemaResult, Type, TypeRef, ValidationError, ValidationErrorKind, Validator,
};
pub use value::{Instance, OrderedMap, Token, Value};
