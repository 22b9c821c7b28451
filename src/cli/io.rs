//! JSON I/O handling for CLI
//!
//! - Input: a single JSON value via stdin
//! - Output: a single JSON object via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{json, Value as Json};

use super::errors::{CliError, CliResult};
use crate::value::Value;

/// Read one JSON value from `reader`
pub fn read_value_from(mut reader: impl Read) -> CliResult<Value> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(&input)?;
    Ok(value)
}

/// Read one JSON value from stdin
pub fn read_value() -> CliResult<Value> {
    read_value_from(io::stdin().lock())
}

/// Success response carrying the cast value
pub fn ok_response(data: &Value) -> Json {
    json!({
        "status": "ok",
        "data": data.to_json()
    })
}

/// Success response of a test
pub fn valid_response(valid: bool) -> Json {
    json!({
        "status": "ok",
        "valid": valid
    })
}

/// Error response
pub fn error_response(code: &str, message: &str) -> Json {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a response object to `writer`, followed by a newline
pub fn write_json_to(mut writer: impl Write, response: &Json, pretty: bool) -> CliResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, response)?;
    } else {
        serde_json::to_writer(&mut writer, response)?;
    }
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

/// Write a response object to stdout
pub fn write_json(response: &Json, pretty: bool) -> CliResult<()> {
    write_json_to(io::stdout().lock(), response, pretty)
}
