// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use rstest::rstest;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[error("outer failure")]
struct Outer {
    #[source]
    inner: std::io::Error,
}

#[rstest]
#[case(json!("short"), "\"short\"")]
#[case(json!("exactly sixteen!"), "\"exactly sixteen!\"")]
#[case(json!("a string longer than sixteen"), "\"a string longer ...\"")]
#[case(json!([1, 2, 3]), "array(3)")]
#[case(json!({"a": 1}), "array(1)")]
#[case(json!(true), "true")]
#[case(json!(false), "false")]
#[case(json!(null), "null")]
#[case(json!(42), "42")]
fn test_stringify(#[case] value: Value, #[case] expected: &str) {
    assert_eq!(stringify(&value, TRUNCATE_AT), expected);
}

#[test]
fn test_stringify_counts_characters() {
    let value = json!("ééééé");
    assert_eq!(stringify(&value, 3), "\"ééé...\"");
}

#[test]
fn test_normalize_objects_to_type_names() {
    let arg = FrameArg::List(vec![
        FrameArg::Object("app::Order".to_string()),
        json!(1).into(),
        FrameArg::List(vec![FrameArg::Object("app::Line".to_string())]),
    ]);
    assert_eq!(arg.normalize(), json!(["app::Order", 1, ["app::Line"]]));
}

#[test]
fn test_apply_parameter_names_pads_and_positions() {
    let params = vec!["request".to_string(), "options".to_string()];

    let named = apply_parameter_names(vec![json!("r")], &params);
    assert_eq!(
        named,
        vec![
            ("request".to_string(), json!("r")),
            ("options".to_string(), json!(null)),
        ]
    );

    let extra = apply_parameter_names(vec![json!(1), json!(2), json!(3)], &params[..1]);
    let names: Vec<&str> = extra.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["request", "1", "2"]);
}

#[test]
fn test_qualified_name() {
    assert_eq!(Frame::new("send").class("Client").qualified_name(), "Client::send");
    assert_eq!(
        Frame::new("send")
            .class("Client")
            .object("Client")
            .qualified_name(),
        "Client::send"
    );
    assert_eq!(
        Frame::new("send")
            .class("Base")
            .object("Derived")
            .qualified_name(),
        "Derived::Base::send"
    );
    assert_eq!(Frame::new("main").qualified_name(), "main");
}

#[test]
fn test_location_keys() {
    assert_eq!(Frame::new("f").at("src/a.rs", 12).location_key(), "src/a.rs:12");

    let a = Frame::new("f").location_key();
    let b = Frame::new("f").location_key();
    assert!(a.starts_with("closure_"));
    assert_ne!(a, b);
}

#[test]
fn test_with_frames_and_truncate() {
    let frames = vec![
        Frame::new("send")
            .class("Client")
            .at("src/client.rs", 40)
            .params(["request", "retries"])
            .arg(json!("POST /oauth/token/issue"))
            .arg(json!(3)),
        Frame::new("run").at("src/main.rs", 7).arg(FrameArg::Object("Config".into())),
    ];

    let trace = DebugTrace::with_frames(Map::new(), &frames);
    let truncated = trace.truncate();

    assert_eq!(trace.trace().len(), 2);
    assert_eq!(
        truncated.trace["src/client.rs:40"],
        "Client::send(request:\"POST /oauth/toke...\", retries:3)"
    );
    assert_eq!(truncated.trace["src/main.rs:7"], "run(0:\"Config\")");
}

#[test]
fn test_duplicate_locations_keep_latest() {
    let frames = vec![
        Frame::new("first").at("src/a.rs", 1),
        Frame::new("second").at("src/a.rs", 1),
    ];
    let trace = DebugTrace::with_frames(Map::new(), &frames);
    assert_eq!(trace.trace().len(), 1);
    assert_eq!(trace.trace()[0].function, "second");
}

#[test]
fn test_for_error_describes_type_and_causes() {
    let error = Outer {
        inner: std::io::Error::new(std::io::ErrorKind::Other, "disk gone"),
    };

    let trace = DebugTrace::for_error("error", &error);

    let described = trace.debug()["error"].as_str().unwrap();
    assert!(described.ends_with("Outer: \"outer failure\""), "{}", described);
    assert_eq!(trace.debug()["caused_by"], json!(["disk gone"]));
}

#[test]
fn test_here_captures_frames() {
    let trace = DebugTrace::here();
    assert!(trace.debug().is_empty());
    // Frame symbols depend on debug info; only the shape is checked.
    for line in trace.trace() {
        assert!(!line.location.is_empty());
    }
}

#[test]
fn test_parse_backtrace() {
    let rendered = "\
   0: test_helper::trace::capture_frames
             at ./crates/helper/src/trace.rs:280:5
   1: <test_helper::http::MockHttpClient as test_helper::http::HttpClient>::send
             at ./crates/helper/src/http/mock.rs:91:29
   2: core::ops::function::FnOnce::call_once::h0123456789abcdef
   3: main
";

    let frames = parse_backtrace(rendered);

    assert_eq!(frames.len(), 4);
    assert_eq!(frames[0].function, "capture_frames");
    assert_eq!(frames[0].class.as_deref(), Some("test_helper::trace"));
    assert_eq!(frames[0].file.as_deref(), Some("./crates/helper/src/trace.rs"));
    assert_eq!(frames[0].line, Some(280));
    assert_eq!(frames[1].function, "send");
    assert_eq!(frames[1].line, Some(91));
    assert_eq!(frames[2].function, "call_once");
    assert_eq!(frames[2].file, None);
    assert_eq!(frames[3].function, "main");
    assert_eq!(frames[3].class, None);
}

#[test]
fn test_render_error_body() {
    let error = std::io::Error::new(std::io::ErrorKind::Other, "boom");
    let body = ErrorBody::from_error(&error)
        .code(7)
        .frames(vec![Frame::new("handle")
            .class("Kernel")
            .at("src/kernel.rs", 9)
            .arg(json!("x".repeat(60)))
            .arg(json!(null))
            .arg(FrameArg::Object("Request".into()))])
        .render();

    assert!(body["type"].as_str().unwrap().ends_with("Error"));
    assert_eq!(body["code"], json!(7));
    assert_eq!(body["message"], json!("boom"));
    assert_eq!(body["debug"], json!([]));
    assert_eq!(body["trace"][0]["location"], json!("src/kernel.rs:9"));
    assert_eq!(
        body["trace"][0]["function"],
        json!(format!("Kernel::handle(\"{}...\", null, \"Request\")", "x".repeat(50)))
    );
}

#[test]
fn test_render_error_captures_trace() {
    let error = std::io::Error::new(std::io::ErrorKind::Other, "boom");
    let body = render_error(&error);
    assert!(body["trace"].is_array());
    assert_eq!(body["code"], json!(0));
}
