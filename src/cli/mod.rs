//! CLI module for shapecast
//!
//! Provides command-line interface for:
//! - cast: Cast a JSON value through a named schema
//! - test: Check a JSON value against a named schema
//! - list: List the loaded schemas

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{apply, cast, check, list, run, run_command, Config, Outcome};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_value, read_value_from, write_json, write_json_to};
