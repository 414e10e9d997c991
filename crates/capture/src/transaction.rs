// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Captured transaction records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

/// One mocked HTTP exchange
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedTransaction {
    /// Sequence number
    pub seq: u64,

    /// Wall-clock timestamp
    pub timestamp: SystemTime,

    /// Elapsed time since capture started
    #[serde(with = "crate::duration_serde")]
    pub elapsed: Duration,

    /// Request as the client sent it
    pub request: CapturedRequest,

    /// Response the mock handed back
    pub response: CapturedResponse,

    /// Flattened call trace, when transaction tracing is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<BTreeMap<String, String>>,
}

/// Header values; a header sent once collapses to a single string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValues {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValues {
    /// Build from the raw list of values for one header name.
    pub fn from_values(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            HeaderValues::Single(values.remove(0))
        } else {
            HeaderValues::Multiple(values)
        }
    }

    /// First value, if any
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderValues::Single(value) => Some(value),
            HeaderValues::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

/// Captured outbound request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedRequest {
    pub method: String,
    pub uri: String,
    #[serde(default)]
    pub headers: BTreeMap<String, HeaderValues>,
    /// Form-decoded body (object), bare string body, or null
    #[serde(default)]
    pub body: serde_json::Value,
}

impl CapturedRequest {
    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
    }
}

/// Captured mocked response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub status: u16,
    /// Form-decoded body (object), bare string body, or null
    #[serde(default)]
    pub body: serde_json::Value,
    #[serde(default)]
    pub headers: BTreeMap<String, HeaderValues>,
}

impl CapturedResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
