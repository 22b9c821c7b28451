//! Schema validation and casting
//!
//! A `Schema` describes the expected shape of a value. Compiling it yields
//! a `Validator`, which tests or coerces input values and recurses into
//! record entries, collection members and keys.
//!
//! # Design Principles
//!
//! - Schemas are compiled once; the compiled tree is immutable
//! - Misuse is reported at compile time as `SchemaError`
//! - Validation failures carry the path to the offending value
//! - Casting never mutates the input

mod coerce;
mod entries;
mod errors;
mod keys;
mod loader;
mod multitype;
mod registry;
mod types;
mod validator;
mod values;

pub use coerce::parse_leading_float;
pub use entries::Entries;
pub use errors::{
    render_segment, CastError, CastResult, SchemaError, SchemaResult, ValidationError,
    ValidationErrorKind,
};
pub use keys::Keys;
pub use loader::{EntryDefs, Names, SchemaDef, SchemaDocument, SchemaLoader};
pub use multitype::MultiValidator;
pub use registry::Registry;
pub use types::{Builtin, Cast, CastFn, SchemaType, TestFn, Type, TypeRef};
pub use validator::{DefaultValue, Predicate, Schema, SubSchema, Validator};
pub use values::Values;
