//! Type descriptors
//!
//! A descriptor pairs a predicate ("is this a T") with an optional
//! coercion ("make a T from this"). Builtin descriptors and class-instance
//! descriptors are interned, so resolving the same category twice yields
//! the same `Arc`.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use super::coerce;
use super::errors::{CastError, CastResult, SchemaError, SchemaResult, ValidationError};
use crate::value::Value;

/// Anything that can test and cast a value.
///
/// `cast` receives `None` when the value was not supplied at all.
pub trait Cast: Send + Sync {
    /// Diagnostic name
    fn name(&self) -> &str;

    /// Whether `cast` can produce values. Casting through a descriptor that
    /// reports `false` is a usage error.
    fn is_castable(&self) -> bool {
        true
    }

    fn cast(&self, value: Option<Value>) -> CastResult<Value>;

    /// Tests a value without keeping the cast result. Validation failures
    /// mean `false`; usage errors propagate.
    fn test(&self, value: &Value) -> SchemaResult<bool> {
        match self.cast(Some(value.clone())) {
            Ok(_) => Ok(true),
            Err(CastError::Validation(_)) => Ok(false),
            Err(CastError::Schema(error)) => Err(error),
        }
    }
}

/// Shared handle to a compiled descriptor or validator
pub type TypeRef = Arc<dyn Cast>;

/// Predicate half of a descriptor
pub type TestFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Coercion half of a descriptor
pub type CastFn = Arc<dyn Fn(Value) -> CastResult<Value> + Send + Sync>;

/// A named type descriptor.
///
/// Built only through constructors that supply at least one of the test
/// and cast functions.
pub struct Type {
    name: String,
    test: Option<TestFn>,
    cast: Option<CastFn>,
}

impl Type {
    /// A descriptor that can only test.
    pub fn from_test<T>(name: impl Into<String>, test: T) -> Self
    where
        T: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            test: Some(Arc::new(test)),
            cast: None,
        }
    }

    /// A descriptor whose test is derived from its coercion.
    pub fn from_cast<C>(name: impl Into<String>, cast: C) -> Self
    where
        C: Fn(Value) -> CastResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            test: None,
            cast: Some(Arc::new(cast)),
        }
    }

    /// A descriptor with both a test and a coercion.
    pub fn from_fns<T, C>(name: impl Into<String>, test: T, cast: C) -> Self
    where
        T: Fn(&Value) -> bool + Send + Sync + 'static,
        C: Fn(Value) -> CastResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            test: Some(Arc::new(test)),
            cast: Some(Arc::new(cast)),
        }
    }

    /// The "instance of `T`" descriptor. Interned per type.
    pub fn instance_of<T: Any + Send + Sync>() -> TypeRef {
        static CLASSES: OnceLock<Mutex<HashMap<TypeId, TypeRef>>> = OnceLock::new();

        let mut classes = CLASSES
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        classes
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                let descriptor: TypeRef = Arc::new(Type::from_test(
                    format!("[class {}]", std::any::type_name::<T>()),
                    |value: &Value| value.as_instance().is_some_and(|i| i.is::<T>()),
                ));
                descriptor
            })
            .clone()
    }

    pub fn into_ref(self) -> TypeRef {
        Arc::new(self)
    }
}

impl Cast for Type {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_castable(&self) -> bool {
        self.cast.is_some()
    }

    fn cast(&self, value: Option<Value>) -> CastResult<Value> {
        let cast = self
            .cast
            .as_ref()
            .ok_or_else(|| SchemaError::NotCastable(self.name.clone()))?;

        match value {
            Some(value) => cast(value),
            None => Err(ValidationError::missing_value().into()),
        }
    }

    fn test(&self, value: &Value) -> SchemaResult<bool> {
        if let Some(test) = &self.test {
            return Ok(test(value));
        }

        match self.cast(Some(value.clone())) {
            Ok(_) => Ok(true),
            Err(CastError::Validation(_)) => Ok(false),
            Err(CastError::Schema(error)) => Err(error),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.name)
            .field("testable", &self.test.is_some())
            .field("castable", &self.cast.is_some())
            .finish()
    }
}

/// Builtin value categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Text,
    Number,
    Boolean,
    Token,
    List,
    Set,
    Map,
    Record,
    Json,
}

impl Builtin {
    pub const ALL: [Builtin; 9] = [
        Builtin::Text,
        Builtin::Number,
        Builtin::Boolean,
        Builtin::Token,
        Builtin::List,
        Builtin::Set,
        Builtin::Map,
        Builtin::Record,
        Builtin::Json,
    ];

    /// Returns the name used in diagnostics and schema documents
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Text => "text",
            Builtin::Number => "number",
            Builtin::Boolean => "boolean",
            Builtin::Token => "token",
            Builtin::List => "list",
            Builtin::Set => "set",
            Builtin::Map => "map",
            Builtin::Record => "record",
            Builtin::Json => "json",
        }
    }

    /// Looks up a builtin by its document name
    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Returns the interned descriptor for this category
    pub fn descriptor(&self) -> TypeRef {
        static DESCRIPTORS: OnceLock<Vec<TypeRef>> = OnceLock::new();

        let descriptors = DESCRIPTORS.get_or_init(|| {
            Builtin::ALL
                .into_iter()
                .map(|builtin| builtin.build().into_ref())
                .collect()
        });
        descriptors[*self as usize].clone()
    }

    fn build(self) -> Type {
        let name = self.name();
        match self {
            Builtin::Text => Type::from_fns(name, coerce::is_text, coerce::to_text),
            Builtin::Number => Type::from_fns(name, coerce::is_number, coerce::to_number),
            Builtin::Boolean => Type::from_fns(name, coerce::is_boolean, coerce::to_boolean),
            Builtin::Token => Type::from_test(name, coerce::is_token),
            Builtin::List => Type::from_test(name, coerce::is_list),
            Builtin::Set => Type::from_test(name, coerce::is_set),
            Builtin::Map => Type::from_test(name, coerce::is_map),
            Builtin::Record => Type::from_test(name, coerce::is_record),
            Builtin::Json => Type::from_cast(name, coerce::to_json_document),
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The `type` option of a schema: a builtin category or any other
/// descriptor, resolved once when the schema is compiled.
#[derive(Clone)]
pub enum SchemaType {
    Builtin(Builtin),
    Custom(TypeRef),
}

impl SchemaType {
    pub fn resolve(&self) -> TypeRef {
        match self {
            SchemaType::Builtin(builtin) => builtin.descriptor(),
            SchemaType::Custom(type_ref) => Arc::clone(type_ref),
        }
    }

    pub fn builtin(&self) -> Option<Builtin> {
        match self {
            SchemaType::Builtin(builtin) => Some(*builtin),
            SchemaType::Custom(_) => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            SchemaType::Builtin(builtin) => builtin.name().to_string(),
            SchemaType::Custom(type_ref) => type_ref.name().to_string(),
        }
    }
}

impl fmt::Debug for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Builtin(builtin) => write!(f, "Builtin({})", builtin),
            SchemaType::Custom(type_ref) => write!(f, "Custom({})", type_ref.name()),
        }
    }
}

impl From<Builtin> for SchemaType {
    fn from(builtin: Builtin) -> Self {
        SchemaType::Builtin(builtin)
    }
}

impl From<TypeRef> for SchemaType {
    fn from(type_ref: TypeRef) -> Self {
        SchemaType::Custom(type_ref)
    }
}

impl From<Type> for SchemaType {
    fn from(descriptor: Type) -> Self {
        SchemaType::Custom(descriptor.into_ref())
    }
}
