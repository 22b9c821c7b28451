//! Schema loader for declarative schema documents
//!
//! A document is a JSON object `{"name": ..., "schema": {...}}`. Schema
//! options mirror the builder:
//! - `type`: builtin name, an already loaded schema name, or a registry type
//! - `any_of`: list of schemas tried in order, used instead of `type`
//! - `cast`, `optional`, `default`
//! - `validator`, `value_validator`, `content_validator`: registry
//!   validator name or list of names
//! - `keys`, `values`, `entries` (object, order kept)
//!
//! Unknown options are ignored.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::errors::{SchemaError, SchemaResult};
use super::multitype::MultiValidator;
use super::registry::Registry;
use super::types::{Builtin, SchemaType, TypeRef};
use super::validator::{Schema, SubSchema, Validator};
use crate::value::Value;

/// One schema document
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    pub name: String,
    pub schema: SchemaDef,
}

/// Serde form of a schema
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaDef {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub any_of: Option<Vec<SchemaDef>>,
    #[serde(default)]
    pub cast: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub validator: Option<Names>,
    #[serde(default)]
    pub value_validator: Option<Names>,
    #[serde(default)]
    pub content_validator: Option<Names>,
    #[serde(default)]
    pub keys: Option<Box<SchemaDef>>,
    #[serde(default)]
    pub values: Option<Box<SchemaDef>>,
    #[serde(default)]
    pub entries: Option<EntryDefs>,
}

/// A single registry name or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Names {
    One(String),
    Many(Vec<String>),
}

impl Names {
    fn iter(&self) -> impl Iterator<Item = &str> {
        let names: &[String] = match self {
            Names::One(name) => std::slice::from_ref(name),
            Names::Many(names) => names,
        };
        names.iter().map(String::as_str)
    }
}

/// Declared entries in document order
#[derive(Debug, Clone, Default)]
pub struct EntryDefs(pub Vec<(String, SchemaDef)>);

impl<'de> Deserialize<'de> for EntryDefs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = EntryDefs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of entry schemas")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<EntryDefs, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, def)) = map.next_entry::<String, SchemaDef>()? {
                    entries.push((key, def));
                }
                Ok(EntryDefs(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Loads schema documents and keeps the compiled validators by name.
pub struct SchemaLoader<'r> {
    /// Directory scanned by `load_all`
    schema_dir: PathBuf,
    /// Source of named types and predicates
    registry: &'r Registry,
    /// Compiled validators by schema name
    schemas: HashMap<String, Arc<Validator>>,
}

impl<'r> SchemaLoader<'r> {
    /// Creates a loader for `schema_dir` backed by `registry`.
    pub fn new(schema_dir: &Path, registry: &'r Registry) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            registry,
            schemas: HashMap::new(),
        }
    }

    /// Creates a loader backed by the process-wide registry.
    pub fn with_global_registry(schema_dir: &Path) -> SchemaLoader<'static> {
        SchemaLoader::new(schema_dir, Registry::global())
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.json` file of the schema directory, in file name
    /// order, and returns how many schemas were loaded.
    ///
    /// A document may use schemas loaded from earlier files as its `type`.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        let dir_name = self.schema_dir.display().to_string();

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed(&dir_name, format!("Failed to read schema directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(&dir_name, format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }

        Ok(paths.len())
    }

    /// Loads a single schema file.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<String> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;
        self.load_str(&path.display().to_string(), &content)
    }

    /// Parses, compiles and registers one document. Returns its name.
    pub fn load_str(&mut self, source_name: &str, content: &str) -> SchemaResult<String> {
        let document: SchemaDocument = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed(source_name, format!("Invalid document: {}", e)))?;

        if document.name.is_empty() {
            return Err(SchemaError::malformed(source_name, "Schema name is empty"));
        }

        let schema = self.build(document.schema, source_name)?;
        let validator = Validator::new(schema)?;
        self.register(document.name.clone(), validator)?;

        debug!(name = %document.name, source = source_name, "loaded schema document");
        Ok(document.name)
    }

    /// Registers a compiled validator under `name`.
    pub fn register(&mut self, name: impl Into<String>, validator: Validator) -> SchemaResult<()> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::DuplicateSchema(name));
        }
        self.schemas.insert(name, Arc::new(validator));
        Ok(())
    }

    /// Gets a loaded validator by name.
    pub fn get(&self, name: &str) -> SchemaResult<Arc<Validator>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))
    }

    /// Loaded schema names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    fn build(&self, def: SchemaDef, source_name: &str) -> SchemaResult<Schema> {
        let kind = match (def.kind, def.any_of) {
            (Some(_), Some(_)) => {
                return Err(SchemaError::malformed(
                    source_name,
                    "Options \"type\" and \"any_of\" are exclusive",
                ))
            }
            (None, None) => {
                return Err(SchemaError::malformed(source_name, "Option \"type\" is required"))
            }
            (Some(name), None) => self.resolve_type(&name)?,
            (None, Some(alternatives)) => {
                let alternatives = alternatives
                    .into_iter()
                    .map(|alternative| self.build(alternative, source_name))
                    .collect::<SchemaResult<Vec<_>>>()?;
                let multi: TypeRef = Arc::new(MultiValidator::new(alternatives)?);
                SchemaType::Custom(multi)
            }
        };

        let mut schema = Schema::new(kind).cast(def.cast).optional(def.optional);

        if let Some(default) = def.default {
            schema = schema.default_value(Value::from(default));
        }
        for name in def.validator.iter().flat_map(Names::iter) {
            schema = schema.validator_ref(self.registry.get_validator(name)?);
        }
        for name in def.value_validator.iter().flat_map(Names::iter) {
            schema = schema.value_validator_ref(self.registry.get_validator(name)?);
        }
        for name in def.content_validator.iter().flat_map(Names::iter) {
            schema = schema.content_validator_ref(self.registry.get_validator(name)?);
        }
        if let Some(keys) = def.keys {
            schema = schema.keys(self.build(*keys, source_name)?);
        }
        if let Some(values) = def.values {
            schema = schema.values(self.build(*values, source_name)?);
        }
        if let Some(EntryDefs(entries)) = def.entries {
            let mut built: Vec<(String, SubSchema)> = Vec::with_capacity(entries.len());
            for (key, entry) in entries {
                built.push((key, self.build(entry, source_name)?.into()));
            }
            schema = schema.entries(built);
        }

        Ok(schema)
    }

    fn resolve_type(&self, name: &str) -> SchemaResult<SchemaType> {
        if let Some(builtin) = Builtin::from_name(name) {
            return Ok(SchemaType::Builtin(builtin));
        }
        if let Some(loaded) = self.schemas.get(name) {
            let loaded: TypeRef = loaded.clone();
            return Ok(SchemaType::Custom(loaded));
        }
        Ok(SchemaType::Custom(self.registry.get_type(name)?))
    }
}

impl fmt::Debug for SchemaLoader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaLoader")
            .field("schema_dir", &self.schema_dir)
            .field("schemas", &self.names())
            .finish()
    }
}
