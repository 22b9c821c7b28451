//! # Named type and validator registry
//!
//! Registration is expected to finish before validators are used from
//! several threads; lookups only take read locks.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use super::errors::{CastResult, SchemaError, SchemaResult};
use super::types::{Cast, Type, TypeRef};
use super::validator::Predicate;
use crate::value::Value;

/// Registry of named types and named predicates
#[derive(Default)]
pub struct Registry {
    /// Types by name
    types: RwLock<HashMap<String, TypeRef>>,

    /// Predicates by name
    validators: RwLock<HashMap<String, Predicate>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register a type under `name`
    pub fn register_type(&self, name: impl Into<String>, descriptor: TypeRef) -> SchemaResult<()> {
        let name = name.into();
        let mut types = self.types.write().map_err(|_| SchemaError::Poisoned)?;
        if types.contains_key(&name) {
            return Err(SchemaError::DuplicateType(name));
        }
        debug!(name = %name, descriptor = descriptor.name(), "registered type");
        types.insert(name, descriptor);
        Ok(())
    }

    /// Register a type built from a coercion function
    pub fn register_cast<C>(&self, name: impl Into<String>, cast: C) -> SchemaResult<()>
    where
        C: Fn(Value) -> CastResult<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let descriptor = Type::from_cast(name.clone(), cast).into_ref();
        self.register_type(name, descriptor)
    }

    /// Get a type by name
    pub fn get_type(&self, name: &str) -> SchemaResult<TypeRef> {
        let types = self.types.read().map_err(|_| SchemaError::Poisoned)?;
        types
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    /// Register a predicate under `name`
    pub fn register_validator<F>(&self, name: impl Into<String>, predicate: F) -> SchemaResult<()>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        let mut validators = self.validators.write().map_err(|_| SchemaError::Poisoned)?;
        if validators.contains_key(&name) {
            return Err(SchemaError::DuplicateValidator(name));
        }
        debug!(name = %name, "registered validator");
        validators.insert(name, Arc::new(predicate));
        Ok(())
    }

    /// Get a predicate by name
    pub fn get_validator(&self, name: &str) -> SchemaResult<Predicate> {
        let validators = self.validators.read().map_err(|_| SchemaError::Poisoned)?;
        validators
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownValidator(name.to_string()))
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .types
            .read()
            .map(|types| types.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Registered validator names, sorted
    pub fn validator_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .validators
            .read()
            .map(|validators| validators.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.type_names())
            .field("validators", &self.validator_names())
            .finish()
    }
}
