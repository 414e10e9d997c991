// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use parking_lot::Mutex;
use serde_json::json;

fn recording_listener(id: &str, seen: &Arc<Mutex<Vec<String>>>) -> Listener {
    let seen = Arc::clone(seen);
    let tag = id.to_string();
    Listener::new(id, move |event, _| {
        seen.lock().push(format!("{}:{}", tag, event.name()));
        None
    })
}

#[test]
fn test_dispatch_calls_listeners_in_order() {
    let dispatcher = EventDispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    dispatcher.listen("orders.created", recording_listener("First", &seen));
    dispatcher.listen("orders.created", recording_listener("Second", &seen));

    dispatcher.dispatch(Event::named("orders.created"), Vec::new());

    assert_eq!(
        *seen.lock(),
        vec!["First:orders.created", "Second:orders.created"]
    );
}

#[test]
fn test_dispatch_collects_responses() {
    let dispatcher = EventDispatcher::new();
    dispatcher.listen("e", Listener::new("A", |_, _| Some(json!(1))));
    dispatcher.listen("e", Listener::new("B", |_, _| None));
    dispatcher.listen("e", Listener::new("C", |_, _| Some(json!(3))));

    let responses = dispatcher.fire(Event::named("e"), Vec::new());

    assert_eq!(responses, vec![json!(1), json!(3)]);
}

#[test]
fn test_until_stops_at_first_response() {
    let dispatcher = EventDispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    dispatcher.listen("e", Listener::new("A", |_, _| Some(json!("halt"))));
    dispatcher.listen("e", recording_listener("B", &seen));

    let response = dispatcher.until(Event::named("e"), Vec::new());

    assert_eq!(response, Some(json!("halt")));
    assert!(seen.lock().is_empty());
}

#[test]
fn test_listeners_receive_args() {
    let dispatcher = EventDispatcher::new();
    dispatcher.listen(
        "e",
        Listener::new("Echo", |_, args: &[EventArg]| Some(args[0].to_value())),
    );

    let responses = dispatcher.dispatch(Event::named("e"), vec![json!({"id": 4}).into()]);

    assert_eq!(responses, vec![json!({"id": 4})]);
}

#[test]
fn test_wildcard_listener() {
    let dispatcher = EventDispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    dispatcher.listen("orders.*", recording_listener("Audit", &seen));

    dispatcher.dispatch(Event::named("orders.shipped"), Vec::new());
    dispatcher.dispatch(Event::named("users.created"), Vec::new());

    assert_eq!(*seen.lock(), vec!["Audit:orders.shipped"]);
    assert!(dispatcher.has_listeners("orders.created"));
    assert!(!dispatcher.has_listeners("users.created"));
}

#[test]
fn test_forget_removes_exact_and_matching_wildcards() {
    let dispatcher = EventDispatcher::new();
    dispatcher.listen("orders.created", Listener::new("Exact", |_, _| None));
    dispatcher.listen("orders.*", Listener::new("Wild", |_, _| None));
    dispatcher.listen("users.*", Listener::new("Other", |_, _| None));

    dispatcher.forget("orders.created");

    assert!(!dispatcher.has_listeners("orders.created"));
    assert!(dispatcher.has_listeners("users.created"));
}

#[test]
fn test_typed_event_uses_type_name() {
    #[derive(serde::Serialize)]
    struct OrderPlaced {
        id: u32,
    }

    let event = Event::of(&OrderPlaced { id: 9 }).unwrap();
    assert!(event.name().ends_with("OrderPlaced"));
    assert_eq!(event.payload(), Some(&json!({"id": 9})));

    let dispatcher = EventDispatcher::new();
    dispatcher.listen(
        event.name(),
        Listener::new("Handler", |e, _| e.payload().cloned()),
    );
    assert_eq!(dispatcher.dispatch(event, Vec::new()), vec![json!({"id": 9})]);
}

#[test]
fn test_closure_listener_id_names_location() {
    let listener = Listener::closure(|_, _| None);
    assert!(listener.id().starts_with("closure@"));
    assert!(listener.id().contains("dispatcher_tests.rs"));
}

#[test]
fn test_listener_identity() {
    let a = Listener::new("A", |_, _| None);
    let b = Listener::new("A", |_, _| None);
    assert!(a.same_as(&a.clone()));
    assert!(!a.same_as(&b));
}

#[test]
fn test_try_listen_rejects_broken_wildcard() {
    let dispatcher = EventDispatcher::new();

    let err = dispatcher
        .try_listen("orders.[*", Listener::new("Audit", |_, _| None))
        .unwrap_err();

    assert!(matches!(err, EventError::Pattern(_)));
    assert!(!dispatcher.has_listeners("orders.[*"));
}

#[test]
fn test_try_listen_registers_valid_wildcard() {
    let dispatcher = EventDispatcher::new();

    dispatcher
        .try_listen("orders.*", Listener::new("Audit", |_, _| None))
        .unwrap();

    assert!(dispatcher.has_listeners("orders.created"));
}

#[test]
fn test_listen_falls_back_to_literal_for_broken_wildcard() {
    let dispatcher = EventDispatcher::new();
    dispatcher.listen("orders.[*", Listener::new("Audit", |_, _| None));

    assert!(dispatcher.has_listeners("orders.[*"));
    assert!(!dispatcher.has_listeners("orders.created"));
}
