// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Conversions between `http` values and captured snapshots, plus builders
//! for canned requests and responses.

use super::HttpError;
use http::{HeaderMap, Method, Request, Response, StatusCode};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use test_helper_capture::{CapturedRequest, CapturedResponse, HeaderValues};

/// Body of a canned request or response
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MockBody {
    #[default]
    Empty,
    Raw(Vec<u8>),
    /// Form-encoded on build
    Form(Vec<(String, String)>),
}

impl MockBody {
    fn encode(self) -> Vec<u8> {
        match self {
            MockBody::Empty => Vec::new(),
            MockBody::Raw(bytes) => bytes,
            MockBody::Form(pairs) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish()
                .into_bytes(),
        }
    }
}

impl From<&str> for MockBody {
    fn from(text: &str) -> Self {
        MockBody::Raw(text.as_bytes().to_vec())
    }
}

impl From<String> for MockBody {
    fn from(text: String) -> Self {
        MockBody::Raw(text.into_bytes())
    }
}

impl From<Vec<u8>> for MockBody {
    fn from(bytes: Vec<u8>) -> Self {
        MockBody::Raw(bytes)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for MockBody {
    fn from(pairs: Vec<(K, V)>) -> Self {
        MockBody::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for MockBody {
    fn from(map: BTreeMap<K, V>) -> Self {
        MockBody::Form(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Canned request; defaults to `GET /` with no body
#[derive(Clone, Debug, Default)]
pub struct MockRequest {
    method: Option<Method>,
    uri: Option<String>,
    headers: Vec<(String, String)>,
    body: MockBody,
}

impl MockRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<MockBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request<Vec<u8>>, HttpError> {
        let mut builder = Request::builder()
            .method(self.method.unwrap_or(Method::GET))
            .uri(self.uri.as_deref().unwrap_or("/"));
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        Ok(builder.body(self.body.encode())?)
    }
}

/// Canned response; defaults to `200` with no body
#[derive(Clone, Debug, Default)]
pub struct MockResponse {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: MockBody,
}

impl MockResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<MockBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Response<Vec<u8>>, HttpError> {
        let mut builder = Response::builder().status(self.status.unwrap_or(StatusCode::OK.as_u16()));
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        Ok(builder.body(self.body.encode())?)
    }
}

/// Snapshot of an outgoing request; form bodies decode into maps
pub fn request_to_snapshot(request: &Request<Vec<u8>>) -> CapturedRequest {
    CapturedRequest {
        method: request.method().to_string(),
        uri: request.uri().to_string(),
        headers: headers_to_snapshot(request.headers()),
        body: parse_form(request.body()),
    }
}

/// Snapshot of a response.
///
/// A body that decodes to a single key without a value (plain text such as
/// `dummy-response`) collapses to that key.
pub fn response_to_snapshot(response: &Response<Vec<u8>>) -> CapturedResponse {
    let body = match parse_form(response.body()) {
        Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
            Some((key, value)) if is_blank(&value) => Value::String(key),
            Some((key, value)) => {
                let mut single = Map::new();
                single.insert(key, value);
                Value::Object(single)
            }
            None => Value::Null,
        },
        other => other,
    };

    CapturedResponse {
        status: response.status().as_u16(),
        body,
        headers: headers_to_snapshot(response.headers()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty() || s == "0",
        Value::Null => true,
        _ => false,
    }
}

/// Headers by name; one value collapses to a string
pub fn headers_to_snapshot(headers: &HeaderMap) -> BTreeMap<String, HeaderValues> {
    headers
        .keys()
        .map(|name| {
            let values = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect();
            (name.as_str().to_string(), HeaderValues::from_values(values))
        })
        .collect()
}

/// Decode an `application/x-www-form-urlencoded` body.
///
/// `key[]` appends to a list and `key[sub]` nests one level; later plain keys
/// win. An empty body decodes to null.
pub fn parse_form(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }

    let mut form = Map::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        let value = Value::String(value.into_owned());
        match split_bracket(&key) {
            Some((base, "")) => {
                let slot = form
                    .entry(base.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                match slot {
                    Value::Array(items) => items.push(value),
                    other => *other = Value::Array(vec![value]),
                }
            }
            Some((base, sub)) => {
                let slot = form
                    .entry(base.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                match slot {
                    Value::Object(map) => {
                        map.insert(sub.to_string(), value);
                    }
                    other => {
                        let mut map = Map::new();
                        map.insert(sub.to_string(), value);
                        *other = Value::Object(map);
                    }
                }
            }
            None => {
                form.insert(key.to_string(), value);
            }
        }
    }
    Value::Object(form)
}

// `a[b]` -> ("a", "b"); `a[]` -> ("a", "")
fn split_bracket(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    let rest = key.get(open + 1..)?;
    let close = rest.find(']')?;
    if open == 0 {
        return None;
    }
    Some((&key[..open], &rest[..close]))
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
