// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use proptest::prelude::*;
use serde_json::json;

fn make_request(uri: &str) -> CapturedRequest {
    let mut headers = BTreeMap::new();
    headers.insert(
        "Content-Type".to_string(),
        HeaderValues::Single("application/x-www-form-urlencoded".to_string()),
    );
    CapturedRequest {
        method: "POST".to_string(),
        uri: uri.to_string(),
        headers,
        body: json!({"name": "widget"}),
    }
}

#[test]
fn test_single_header_serializes_as_string() {
    let request = make_request("https://api.test/widgets");
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(
        json["headers"]["Content-Type"],
        "application/x-www-form-urlencoded"
    );
}

#[test]
fn test_multiple_header_serializes_as_list() {
    let values = HeaderValues::from_values(vec!["a=1".to_string(), "b=2".to_string()]);
    let json = serde_json::to_value(&values).unwrap();
    assert_eq!(json, json!(["a=1", "b=2"]));
    assert_eq!(values.first(), Some("a=1"));
}

#[test]
fn test_from_values_collapses_single() {
    let values = HeaderValues::from_values(vec!["only".to_string()]);
    assert_eq!(values, HeaderValues::Single("only".to_string()));
}

#[test]
fn test_header_lookup_is_case_insensitive() {
    let request = make_request("/");
    assert_eq!(
        request.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(request.header("accept"), None);
}

#[test]
fn test_response_success_range() {
    let ok = CapturedResponse {
        status: 204,
        body: serde_json::Value::Null,
        headers: BTreeMap::new(),
    };
    let missing = CapturedResponse {
        status: 404,
        ..ok.clone()
    };
    assert!(ok.is_success());
    assert!(!missing.is_success());
}

#[test]
fn test_trace_omitted_when_absent() {
    let transaction = CapturedTransaction {
        seq: 3,
        timestamp: SystemTime::now(),
        elapsed: Duration::from_millis(12),
        request: make_request("/ping"),
        response: CapturedResponse {
            status: 200,
            body: json!("pong"),
            headers: BTreeMap::new(),
        },
        trace: None,
    };

    let json = serde_json::to_string(&transaction).unwrap();
    assert!(!json.contains("\"trace\""));

    let parsed: CapturedTransaction = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.seq, 3);
    assert_eq!(parsed.elapsed, Duration::from_millis(12));
    assert_eq!(parsed.response.body, json!("pong"));
}

proptest! {
    #[test]
    fn elapsed_keeps_microsecond_precision(micros in 0u64..10_000_000_000) {
        let transaction = CapturedTransaction {
            seq: 0,
            timestamp: SystemTime::now(),
            elapsed: Duration::from_micros(micros),
            request: make_request("/"),
            response: CapturedResponse {
                status: 200,
                body: serde_json::Value::Null,
                headers: BTreeMap::new(),
            },
            trace: None,
        };

        let json = serde_json::to_string(&transaction).unwrap();
        let parsed: CapturedTransaction = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed.elapsed.as_micros() as u64, micros);
    }
}
