//! JSON I/O handling for CLI
//!
//! - Schema input: inline JSON argument or a JSON document on stdin
//! - Output: single JSON object via stdout
//! - Logs never go to stdout

use std::io::{self, Read, Write};

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::errors::{CliError, CliResult};

/// Successful command result: a message plus response fields
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub message: String,
    pub fields: Map<String, Value>,
}

impl Response {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Adds a response field
    pub fn with(mut self, key: &str, value: impl Serialize) -> CliResult<Self> {
        self.fields.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// The envelope written to stdout
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("status".into(), json!("success"));
        body.insert("message".into(), json!(self.message));
        for (key, value) in &self.fields {
            body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}

/// Error envelope for a failed command
pub fn error_json(error: &CliError) -> Value {
    json!({
        "status": "error",
        "code": error.code_str(),
        "http_status": error.status_code(),
        "message": error.message(),
    })
}

/// Parses a schema argument; `-` reads the document from stdin
pub fn read_schema(raw: &str) -> CliResult<Value> {
    let text = if raw == "-" {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        buf
    } else {
        raw.to_string()
    };

    parse_schema(&text)
}

pub(crate) fn parse_schema(text: &str) -> CliResult<Value> {
    if text.trim().is_empty() {
        return Err(CliError::invalid_argument("Empty schema input"));
    }

    serde_json::from_str(text)
        .map_err(|e| CliError::invalid_argument(format!("Schema is not valid JSON: {}", e)))
}

/// Write a success response to stdout
pub fn write_response(response: &Response) -> CliResult<()> {
    write_json(&response.to_json())
}

/// Write an error response to stdout
pub fn write_error(error: &CliError) -> CliResult<()> {
    write_json(&error_json(error))
}

fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;

    #[test]
    fn test_success_envelope_merges_fields() {
        let response = Response::new("done")
            .with("collections", vec!["a", "b"])
            .unwrap();

        assert_eq!(
            response.to_json(),
            json!({"status": "success", "message": "done", "collections": ["a", "b"]})
        );
    }

    #[test]
    fn test_error_envelope() {
        let err = CliError::invalid_argument("bad");
        let value = error_json(&err);

        assert_eq!(value["status"], "error");
        assert_eq!(value["code"], "CLI_INVALID_ARGUMENT");
        assert_eq!(value["http_status"], 400);
        assert_eq!(value["message"], "bad");
    }

    #[test]
    fn test_parse_schema_rejects_bad_json() {
        let err = parse_schema("{not json").unwrap_err();
        assert_eq!(err.code(), CliErrorCode::InvalidArgument);

        let err = parse_schema("   ").unwrap_err();
        assert_eq!(err.code(), CliErrorCode::InvalidArgument);

        assert_eq!(parse_schema(r#"{"a": {"type": "str"}}"#).unwrap()["a"]["type"], "str");
    }
}
