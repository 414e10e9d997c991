// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Response body decoding.

use super::ResponseError;
use crate::json::{is_truthy, json_decode_lenient};
use crate::xml::XmlParser;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;

fn between_tags() -> Option<&'static Regex> {
    static BETWEEN_TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    BETWEEN_TAGS
        .get_or_init(|| Regex::new(r">\s+<").ok())
        .as_ref()
}

/// Drop whitespace that only separates tags
pub fn collapse_whitespace(body: &str) -> Cow<'_, str> {
    match between_tags() {
        Some(re) => re.replace_all(body, "><"),
        None => Cow::Borrowed(body),
    }
}

/// Decode a response body for assertions.
///
/// - an empty body is `""`
/// - a JSON body is that JSON
/// - HTML whose first `<p>` holds JSON is that JSON
/// - anything else is the normalized HTML document
///
/// A decoded object carrying a `code` field has it replaced by `status`.
pub fn parse_response(status: u16, body: &str) -> Result<Value, ResponseError> {
    let body = collapse_whitespace(body);
    if body.is_empty() {
        return Ok(Value::String(String::new()));
    }

    let mut output = match json_decode_lenient(&body).filter(is_truthy) {
        Some(json) => json,
        None => {
            let mut parser = XmlParser::html(&body);
            let paragraph = parser.where_children(["p"]).first("")?;
            match json_decode_lenient(paragraph.text()).filter(is_truthy) {
                Some(json) => json,
                None => Value::String(parser.document().save_html()),
            }
        }
    };

    if let Value::Object(map) = &mut output {
        if let Some(code) = map.get_mut("code") {
            *code = Value::from(status);
        }
    }
    Ok(output)
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
