//! Composite validator
//!
//! Compiles a declarative `Schema` into an immutable `Validator` and runs
//! the cast procedure:
//!
//! 1. Absent value: use the default, if any
//! 2. Absent or null: accepted only when optional
//! 3. Test or cast against the type
//! 4. Run `validator` predicates in declaration order
//! 5. Deep traversal: `keys`, then `values` or `entries`
//! 6. Run `content_validator` predicates
//!
//! Deep traversal builds a new value; the caller's input is consumed and
//! never aliased.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::entries::Entries;
use super::errors::{CastError, CastResult, SchemaError, SchemaResult, ValidationError};
use super::keys::Keys;
use super::types::{Builtin, Cast, SchemaType, TypeRef};
use super::values::Values;
use crate::value::Value;

/// User predicate run before or after deep traversal
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Default used when a value is not supplied
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    /// Invoked once per cast that needs it
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Producer(producer) => producer(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Producer(_) => write!(f, "Producer"),
        }
    }
}

/// A nested schema: declarative, or an already compiled descriptor used
/// as is.
#[derive(Clone)]
pub enum SubSchema {
    Schema(Box<Schema>),
    Compiled(TypeRef),
}

impl SubSchema {
    pub(crate) fn compile(self) -> SchemaResult<TypeRef> {
        match self {
            SubSchema::Schema(schema) => Ok(Arc::new(Validator::new(*schema)?)),
            SubSchema::Compiled(type_ref) => Ok(type_ref),
        }
    }
}

impl From<Schema> for SubSchema {
    fn from(schema: Schema) -> Self {
        SubSchema::Schema(Box::new(schema))
    }
}

impl From<TypeRef> for SubSchema {
    fn from(type_ref: TypeRef) -> Self {
        SubSchema::Compiled(type_ref)
    }
}

impl From<Validator> for SubSchema {
    fn from(validator: Validator) -> Self {
        SubSchema::Compiled(Arc::new(validator))
    }
}

/// A bare builtin is a test-only schema of that type.
impl From<Builtin> for SubSchema {
    fn from(builtin: Builtin) -> Self {
        SubSchema::Schema(Box::new(Schema::new(builtin)))
    }
}

/// Declarative description of one value.
#[derive(Clone)]
pub struct Schema {
    kind: SchemaType,
    cast: bool,
    optional: bool,
    default: Option<DefaultValue>,
    validators: Vec<Predicate>,
    value_validators: Vec<Predicate>,
    content_validators: Vec<Predicate>,
    keys: Option<SubSchema>,
    values: Option<SubSchema>,
    entries: Option<Vec<(String, SubSchema)>>,
}

impl Schema {
    pub fn new(kind: impl Into<SchemaType>) -> Self {
        Self {
            kind: kind.into(),
            cast: false,
            optional: false,
            default: None,
            validators: Vec::new(),
            value_validators: Vec::new(),
            content_validators: Vec::new(),
            keys: None,
            values: None,
            entries: None,
        }
    }

    /// Coerce through the type instead of only testing against it
    pub fn cast(mut self, cast: bool) -> Self {
        self.cast = cast;
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Producer(Arc::new(producer)));
        self
    }

    pub fn validator<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(predicate));
        self
    }

    pub fn value_validator<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.value_validators.push(Arc::new(predicate));
        self
    }

    pub fn content_validator<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.content_validators.push(Arc::new(predicate));
        self
    }

    /// Adds an already shared predicate to the `validator` list
    pub fn validator_ref(mut self, predicate: Predicate) -> Self {
        self.validators.push(predicate);
        self
    }

    pub fn value_validator_ref(mut self, predicate: Predicate) -> Self {
        self.value_validators.push(predicate);
        self
    }

    pub fn content_validator_ref(mut self, predicate: Predicate) -> Self {
        self.content_validators.push(predicate);
        self
    }

    pub fn keys(mut self, keys: impl Into<SubSchema>) -> Self {
        self.keys = Some(keys.into());
        self
    }

    pub fn values(mut self, values: impl Into<SubSchema>) -> Self {
        self.values = Some(values.into());
        self
    }

    /// Declares one entry; declaration order is kept.
    pub fn entry(mut self, key: impl Into<String>, schema: impl Into<SubSchema>) -> Self {
        self.entries
            .get_or_insert_with(Vec::new)
            .push((key.into(), schema.into()));
        self
    }

    pub fn entries<K, S>(mut self, entries: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<SubSchema>,
    {
        let declared = self.entries.get_or_insert_with(Vec::new);
        declared.extend(entries.into_iter().map(|(k, s)| (k.into(), s.into())));
        self
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type", &self.kind)
            .field("cast", &self.cast)
            .field("optional", &self.optional)
            .field("default", &self.default)
            .field("keys", &self.keys.is_some())
            .field("values", &self.values.is_some())
            .field(
                "entries",
                &self
                    .entries
                    .as_ref()
                    .map(|entries| entries.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>()),
            )
            .finish()
    }
}

/// Compiled, immutable form of a `Schema`.
pub struct Validator {
    name: String,
    kind: TypeRef,
    cast: bool,
    optional: bool,
    default: Option<DefaultValue>,
    main_runners: Vec<Predicate>,
    after_runners: Vec<Predicate>,
    deep_keys: Option<Keys>,
    deep_values: Option<Values>,
    deep_entries: Option<Entries>,
}

impl Validator {
    /// Compiles a schema, including every nested schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if:
    /// - `cast` is requested from a type without coercion
    /// - `keys` or `entries` is declared on anything but record or map
    /// - `values` is declared on anything but list, record, set or map
    /// - both `values` and `entries` are declared
    pub fn new(schema: Schema) -> SchemaResult<Self> {
        let kind = schema.kind.resolve();
        let builtin = schema.kind.builtin();
        let type_name = schema.kind.name();

        if schema.cast && !kind.is_castable() {
            return Err(SchemaError::NotCastable(type_name));
        }

        if schema.values.is_some() && schema.entries.is_some() {
            return Err(SchemaError::ConflictingOptions);
        }

        let deep_keys = match schema.keys {
            Some(keys) => {
                require(builtin, "keys", &[Builtin::Record, Builtin::Map], &type_name)?;
                Some(Keys::new(keys)?)
            }
            None => None,
        };

        let deep_values = match schema.values {
            Some(values) => {
                require(
                    builtin,
                    "values",
                    &[Builtin::List, Builtin::Record, Builtin::Set, Builtin::Map],
                    &type_name,
                )?;
                Some(Values::new(values)?)
            }
            None => None,
        };

        let deep_entries = match schema.entries {
            Some(entries) => {
                require(builtin, "entries", &[Builtin::Record, Builtin::Map], &type_name)?;
                Some(Entries::new(entries)?)
            }
            None => None,
        };

        let mut main_runners = schema.validators;
        main_runners.extend(schema.value_validators);

        let name = format!("Validator<{}>", type_name);
        debug!(
            validator = %name,
            cast = schema.cast,
            optional = schema.optional,
            keys = deep_keys.is_some(),
            values = deep_values.is_some(),
            entries = deep_entries.is_some(),
            "compiled validator"
        );

        Ok(Self {
            name,
            kind,
            cast: schema.cast,
            optional: schema.optional,
            default: schema.default,
            main_runners,
            after_runners: schema.content_validators,
            deep_keys,
            deep_values,
            deep_entries,
        })
    }

    /// Shorthand for a list schema with `values`
    pub fn list(values: impl Into<SubSchema>) -> SchemaResult<Self> {
        Self::new(Schema::new(Builtin::List).values(values))
    }

    /// Shorthand for a set schema with `values`
    pub fn set(values: impl Into<SubSchema>) -> SchemaResult<Self> {
        Self::new(Schema::new(Builtin::Set).values(values))
    }

    /// Shorthand for a record schema with `entries`
    pub fn record<K, S>(entries: impl IntoIterator<Item = (K, S)>) -> SchemaResult<Self>
    where
        K: Into<String>,
        S: Into<SubSchema>,
    {
        Self::new(Schema::new(Builtin::Record).entries(entries))
    }

    /// Shorthand for a map schema with `entries`
    pub fn map<K, S>(entries: impl IntoIterator<Item = (K, S)>) -> SchemaResult<Self>
    where
        K: Into<String>,
        S: Into<SubSchema>,
    {
        Self::new(Schema::new(Builtin::Map).entries(entries))
    }

    /// Validates and, where configured, coerces `value`.
    ///
    /// `None` means the value was not supplied.
    pub fn cast(&self, value: Option<Value>) -> CastResult<Value> {
        let value = match value {
            None => self.default.as_ref().map(DefaultValue::resolve),
            supplied => supplied,
        };

        let value = match value {
            None | Some(Value::Null) => {
                if self.optional {
                    return Ok(Value::Null);
                }
                return Err(ValidationError::missing_value().into());
            }
            Some(value) => value,
        };

        let mut value = if self.cast {
            self.kind.cast(Some(value))?
        } else if self.kind.test(&value)? {
            value
        } else {
            return Err(ValidationError::invalid_value(value).into());
        };

        run_predicates(&self.main_runners, &value)?;

        if let Some(keys) = &self.deep_keys {
            value = keys.rename(value)?;
        }
        if let Some(values) = &self.deep_values {
            value = values.cast_members(value)?;
        }
        if let Some(entries) = &self.deep_entries {
            value = entries.cast(Some(value))?;
        }

        run_predicates(&self.after_runners, &value)?;

        Ok(value)
    }

    /// Casts a supplied value.
    pub fn cast_value(&self, value: impl Into<Value>) -> CastResult<Value> {
        self.cast(Some(value.into()))
    }

    /// Tests a possibly absent value. Never fails for a well-formed schema.
    pub fn is_valid(&self, value: Option<Value>) -> SchemaResult<bool> {
        match self.cast(value) {
            Ok(_) => Ok(true),
            Err(CastError::Validation(_)) => Ok(false),
            Err(CastError::Schema(error)) => Err(error),
        }
    }
}

impl Cast for Validator {
    fn name(&self) -> &str {
        &self.name
    }

    fn cast(&self, value: Option<Value>) -> CastResult<Value> {
        Validator::cast(self, value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .field("cast", &self.cast)
            .field("optional", &self.optional)
            .finish()
    }
}

fn require(
    builtin: Option<Builtin>,
    option: &'static str,
    allowed: &[Builtin],
    type_name: &str,
) -> SchemaResult<()> {
    if builtin.is_some_and(|b| allowed.contains(&b)) {
        return Ok(());
    }
    Err(SchemaError::UnsupportedOption {
        option,
        allowed: match option {
            "values" => "list, record, set and map",
            _ => "record and map",
        },
        type_name: type_name.to_string(),
    })
}

fn run_predicates(predicates: &[Predicate], value: &Value) -> CastResult<()> {
    for predicate in predicates {
        if !predicate(value) {
            return Err(ValidationError::invalid_value(value.clone()).into());
        }
    }
    Ok(())
}
