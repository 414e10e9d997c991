// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Small JSON helpers shared across the toolkit.

use serde_json::Value;
use thiserror::Error;

/// Errors raised by strict JSON decoding
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("Malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode `text` as JSON, failing loudly on malformed input.
pub fn json_decode_strict(text: &str) -> Result<Value, JsonError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode `text` as JSON, returning `None` when it is not JSON.
pub fn json_decode_lenient(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Loose truthiness: null, false, zero, `""`, `"0"` and empty
/// collections are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Type label for a dynamic value, used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
