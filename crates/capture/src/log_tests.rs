// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::transaction::HeaderValues;
use proptest::prelude::*;
use rstest::rstest;
use std::thread;

fn make_request(method: &str, uri: &str) -> CapturedRequest {
    CapturedRequest {
        method: method.to_string(),
        uri: uri.to_string(),
        headers: BTreeMap::new(),
        body: serde_json::Value::Null,
    }
}

fn make_response(status: u16) -> CapturedResponse {
    let mut headers = BTreeMap::new();
    headers.insert(
        "Content-Type".to_string(),
        HeaderValues::Single("text/plain".to_string()),
    );
    CapturedResponse {
        status,
        body: serde_json::Value::String("dummy-response".to_string()),
        headers,
    }
}

#[test]
fn test_record_and_retrieve() {
    let log = TransactionLog::new();

    let seq = log.record(make_request("GET", "/users"), make_response(200), None);

    assert_eq!(seq, 0);
    assert_eq!(log.len(), 1);
    let transactions = log.transactions();
    assert_eq!(transactions[0].seq, 0);
    assert_eq!(transactions[0].request.uri, "/users");
}

#[test]
fn test_latest() {
    let log = TransactionLog::new();
    assert!(log.latest().is_none());

    log.record(make_request("GET", "/first"), make_response(200), None);
    log.record(make_request("GET", "/second"), make_response(200), None);

    assert_eq!(log.latest().unwrap().request.uri, "/second");
}

#[rstest]
#[case(1, 1)]
#[case(5, 2)]
#[case(10, 5)]
#[case(3, 10)]
fn test_last_n(#[case] total: usize, #[case] n: usize) {
    let log = TransactionLog::new();

    for i in 0..total {
        log.record(
            make_request("GET", &format!("/item/{}", i)),
            make_response(200),
            None,
        );
    }

    let last = log.last(n);
    let expected_len = n.min(total);
    assert_eq!(last.len(), expected_len);

    let start = total.saturating_sub(n);
    for (i, transaction) in last.iter().enumerate() {
        assert_eq!(transaction.request.uri, format!("/item/{}", start + i));
    }
}

#[test]
fn test_find_by_uri_and_method() {
    let log = TransactionLog::new();

    log.record(make_request("GET", "/orders/1"), make_response(200), None);
    log.record(make_request("post", "/orders"), make_response(201), None);
    log.record(make_request("GET", "/users/1"), make_response(200), None);

    assert_eq!(log.find_by_uri("/orders").len(), 2);
    assert_eq!(log.find_by_method("POST").len(), 1);
    assert!(log.find_by_uri("/missing").is_empty());
}

#[test]
fn test_find_failures() {
    let log = TransactionLog::new();

    log.record(make_request("GET", "/a"), make_response(200), None);
    log.record(make_request("GET", "/b"), make_response(500), None);
    log.record(make_request("GET", "/c"), make_response(404), None);

    assert_eq!(log.find_failures().len(), 2);
    assert_eq!(log.count(|t| t.response.status == 500), 1);
}

#[test]
fn test_trace_is_kept() {
    let log = TransactionLog::new();
    let mut trace = BTreeMap::new();
    trace.insert("src/lib.rs:10".to_string(), "run()".to_string());

    log.record(make_request("GET", "/"), make_response(200), Some(trace));

    let recorded = log.latest().unwrap();
    assert_eq!(
        recorded.trace.unwrap().get("src/lib.rs:10").map(String::as_str),
        Some("run()")
    );
}

#[test]
fn test_clear() {
    let log = TransactionLog::new();

    log.record(make_request("GET", "/"), make_response(200), None);

    assert!(!log.is_empty());
    log.clear();
    assert!(log.is_empty());
    assert_eq!(log.len(), 0);
}

#[test]
fn test_clone_shares_state() {
    let log1 = TransactionLog::new();
    let log2 = log1.clone();

    log1.record(make_request("GET", "/one"), make_response(200), None);
    assert_eq!(log2.len(), 1);

    log2.record(make_request("GET", "/two"), make_response(200), None);
    assert_eq!(log1.len(), 2);
}

#[test]
fn test_file_capture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transactions.jsonl");

    {
        let log = TransactionLog::with_file(&path).unwrap();
        log.record(make_request("GET", "/one"), make_response(200), None);
        log.record(make_request("DELETE", "/two"), make_response(204), None);
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let t1: CapturedTransaction = serde_json::from_str(lines[0]).unwrap();
    let t2: CapturedTransaction = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(t1.request.uri, "/one");
    assert_eq!(t2.response.status, 204);
}

#[cfg(target_os = "linux")]
#[test]
fn test_file_capture_write_failure_keeps_memory_log() {
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let sink = Sink::default();
    let writer = sink.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let log = TransactionLog::with_file(std::path::Path::new("/dev/full")).unwrap();

    let (first, second) = tracing::subscriber::with_default(subscriber, || {
        (
            log.record(make_request("GET", "/a"), make_response(200), None),
            log.record(make_request("GET", "/b"), make_response(500), None),
        )
    });

    assert_eq!((first, second), (0, 1));
    assert_eq!(log.len(), 2);
    assert_eq!(log.find_failures().len(), 1);
    let logged = String::from_utf8(sink.0.lock().clone()).unwrap();
    assert!(logged.contains("failed to append transaction to capture file"));
}

#[test]
fn test_file_capture_invalid_path() {
    let result = TransactionLog::with_file(std::path::Path::new("/nonexistent/dir/file.jsonl"));
    assert!(result.is_err());
}

#[test]
fn test_thread_safety() {
    let log = TransactionLog::new();
    let log_clone = log.clone();

    let handle = thread::spawn(move || {
        for i in 0..100 {
            log_clone.record(
                make_request("GET", &format!("/thread/{}", i)),
                make_response(200),
                None,
            );
        }
    });

    for i in 0..100 {
        log.record(
            make_request("GET", &format!("/main/{}", i)),
            make_response(200),
            None,
        );
    }

    handle.join().unwrap();

    assert_eq!(log.len(), 200);
    let seqs: Vec<u64> = log.transactions().iter().map(|t| t.seq).collect();
    assert_eq!(seqs, (0..200).collect::<Vec<u64>>());
}

proptest! {
    #[test]
    fn len_equals_record_count(count in 0usize..100) {
        let log = TransactionLog::new();
        for _ in 0..count {
            log.record(make_request("GET", "/"), make_response(200), None);
        }
        prop_assert_eq!(log.len(), count);
    }

    #[test]
    fn failures_consistent(ok in 0usize..20, failed in 0usize..20) {
        let log = TransactionLog::new();
        for _ in 0..ok {
            log.record(make_request("GET", "/"), make_response(200), None);
        }
        for _ in 0..failed {
            log.record(make_request("GET", "/"), make_response(503), None);
        }
        prop_assert_eq!(log.find_failures().len(), failed);
        prop_assert_eq!(log.len(), ok + failed);
    }
}
