//! CLI command implementations
//!
//! Every command loads the configuration, installs logging, then loads
//! the schema directory before touching stdin.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::schema::{CastError, SchemaLoader};
use crate::value::Value;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{error_response, ok_response, read_value, valid_response, write_json};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `*.json` schema documents (required)
    pub schema_dir: String,

    /// Log filter directive (optional, default "warn")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Pretty-print responses (optional, default false)
    #[serde(default)]
    pub pretty: bool,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.schema_dir.trim().is_empty() {
            return Err(CliError::config_error("schema_dir must not be empty"));
        }

        EnvFilter::try_new(&self.log_filter).map_err(|e| {
            CliError::config_error(format!("Invalid log_filter '{}': {}", self.log_filter, e))
        })?;

        Ok(())
    }

    /// Get schema directory as Path
    pub fn schema_path(&self) -> &Path {
        Path::new(&self.schema_dir)
    }
}

/// Outcome of applying a schema to one value
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The cast value
    Cast(Value),
    /// Whether the value passed
    Valid(bool),
    /// The value was rejected
    Rejected { code: &'static str, message: String },
}

impl Outcome {
    /// Response object written to stdout
    pub fn to_response(&self) -> serde_json::Value {
        match self {
            Outcome::Cast(value) => ok_response(value),
            Outcome::Valid(valid) => valid_response(*valid),
            Outcome::Rejected { code, message } => error_response(code, message),
        }
    }
}

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command, cli.verbose)
}

/// Run a specific command
pub fn run_command(cmd: Command, verbose: u8) -> CliResult<()> {
    match cmd {
        Command::Cast { config, schema } => cast(&config, &schema, verbose),
        Command::Test { config, schema } => check(&config, &schema, verbose),
        Command::List { config } => list(&config, verbose),
    }
}

/// Install the log subscriber. `-v` flags override the configured filter.
fn init_logging(config: &Config, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new(&config.log_filter),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // A second install in the same process keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn prepare(config_path: &Path, verbose: u8) -> CliResult<(Config, SchemaLoader<'static>)> {
    let config = Config::load(config_path)?;
    init_logging(&config, verbose);

    let mut loader = SchemaLoader::with_global_registry(config.schema_path());
    let count = loader.load_all()?;
    info!(schema_dir = %config.schema_dir, count, "loaded schema directory");

    Ok((config, loader))
}

/// Apply the named schema to `input`.
///
/// With `test_only`, a passing value yields `Valid(true)` and a rejected
/// one `Valid(false)`.
pub fn apply(
    loader: &SchemaLoader<'_>,
    schema: &str,
    input: Value,
    test_only: bool,
) -> CliResult<Outcome> {
    let validator = loader.get(schema)?;
    debug!(schema, "applying schema");

    match validator.cast(Some(input)) {
        Ok(_) if test_only => Ok(Outcome::Valid(true)),
        Ok(value) => Ok(Outcome::Cast(value)),
        Err(CastError::Validation(_)) if test_only => Ok(Outcome::Valid(false)),
        Err(CastError::Validation(error)) => Ok(Outcome::Rejected {
            code: error.kind().code(),
            message: error.to_string(),
        }),
        Err(CastError::Schema(error)) => Err(error.into()),
    }
}

/// Cast command: cast stdin through a schema.
pub fn cast(config_path: &Path, schema: &str, verbose: u8) -> CliResult<()> {
    let (config, loader) = prepare(config_path, verbose)?;
    let input = read_value()?;

    let outcome = apply(&loader, schema, input, false)?;
    write_json(&outcome.to_response(), config.pretty)
}

/// Test command: report whether stdin passes a schema.
pub fn check(config_path: &Path, schema: &str, verbose: u8) -> CliResult<()> {
    let (config, loader) = prepare(config_path, verbose)?;
    let input = read_value()?;

    let outcome = apply(&loader, schema, input, true)?;
    write_json(&outcome.to_response(), config.pretty)
}

/// List command: print the loaded schema names.
pub fn list(config_path: &Path, verbose: u8) -> CliResult<()> {
    let (config, loader) = prepare(config_path, verbose)?;

    let response = json!({
        "status": "ok",
        "data": loader.names(),
    });
    write_json(&response, config.pretty)
}
