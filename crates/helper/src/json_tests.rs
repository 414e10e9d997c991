// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use serde_json::json;
use yare::parameterized;

#[test]
fn test_strict_decodes_valid_json() {
    let value = json_decode_strict(r#"{"ok": true, "items": [1, 2]}"#).unwrap();
    assert_eq!(value, json!({"ok": true, "items": [1, 2]}));
}

#[test]
fn test_strict_rejects_malformed_json() {
    let err = json_decode_strict("{not json").unwrap_err();
    assert!(err.to_string().starts_with("Malformed JSON"));
}

#[test]
fn test_lenient_returns_none_for_html() {
    assert!(json_decode_lenient("<p>hello</p>").is_none());
    assert_eq!(json_decode_lenient("42"), Some(json!(42)));
}

#[parameterized(
    null = { json!(null), "NULL" },
    boolean = { json!(true), "boolean" },
    integer = { json!(7), "integer" },
    double = { json!(1.5), "double" },
    string = { json!("x"), "string" },
    array = { json!([1]), "array" },
    object = { json!({"a": 1}), "object" },
)]
fn test_type_name(value: Value, expected: &str) {
    assert_eq!(type_name(&value), expected);
}

#[parameterized(
    null = { json!(null), false },
    falsy_bool = { json!(false), false },
    zero = { json!(0), false },
    zero_float = { json!(0.0), false },
    empty_string = { json!(""), false },
    zero_string = { json!("0"), false },
    empty_array = { json!([]), false },
    empty_object = { json!({}), false },
    number = { json!(3), true },
    text = { json!("no"), true },
    array = { json!([0]), true },
    object = { json!({"code": 0}), true },
)]
fn test_is_truthy(value: Value, expected: bool) {
    assert_eq!(is_truthy(&value), expected);
}
