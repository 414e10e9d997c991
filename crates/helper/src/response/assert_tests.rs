// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use serde_json::json;

#[test]
fn test_equal_to_passes() {
    assert!(assert_that(&json!({"a": 1}), &equal_to(json!({"a": 1})), "").is_ok());
    assert!(assert_that(&vec![1, 2], &equal_to([1, 2]), "").is_ok());
}

#[test]
fn test_equal_to_reports_expected_and_actual() {
    let report = assert_that(&5, &equal_to(6), "counts differ").unwrap_err();

    assert_eq!(report.error.expected, Some(json!(6)));
    assert_eq!(report.error.actual, Some(json!(5)));
    assert!(report.error.message.starts_with("counts differ\n"));
    assert!(report.error.message.contains("Failed asserting that 5 is equal to 6."));
    assert!(report.route.is_none());
    assert!(report.transmission.is_none());
}

#[test]
fn test_contains_string() {
    assert!(assert_that("hello world", &contains_string("world"), "").is_ok());

    let report = assert_that("hello", &contains_string("bye"), "").unwrap_err();
    assert_eq!(
        report.error.message,
        "Failed asserting that 'hello' contains \"bye\"."
    );
    assert_eq!(report.error.expected, None);
}

#[test]
fn test_satisfies() {
    let positive = satisfies("is positive", |n: &i32| *n > 0);
    assert!(assert_that(&3, &positive, "").is_ok());

    let report = assert_that(&-1, &positive, "").unwrap_err();
    assert_eq!(report.error.message, "Failed asserting that -1 is positive.");
}

#[test]
fn test_report_display_is_pretty_json() {
    let report = assert_that(&1, &equal_to(2), "").unwrap_err();
    let rendered = report.to_string();

    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed["error"]["expected"], json!(2));
    assert!(parsed.get("route").is_none());
    assert!(rendered.contains('\n'));
}
