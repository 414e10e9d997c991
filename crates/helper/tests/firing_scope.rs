// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! End-to-end event scoping: an application fires several events, only the
//! ones in scope reach their selected listeners, and outbound HTTP made by
//! those listeners is captured by the mock client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};
use test_helper::container::Container;
use test_helper::events::{dispatch, EventArg, Listener, ModerateEvents};
use test_helper::http::{resolve_client, MockHttpClient, MockRequest, MockResponse};

struct Shop {
    container: Container,
    audits: Arc<AtomicUsize>,
}

impl Shop {
    fn boot() -> Self {
        let container = Container::with_events();
        let audits = Arc::new(AtomicUsize::new(0));
        let events = container.events().unwrap();

        let mailer_container = container.clone();
        events.listen(
            "order.placed",
            Listener::new("OrderMailer", move |_, args| {
                let order = args.first().map(EventArg::to_value).unwrap_or(Value::Null);
                let request = MockRequest::new()
                    .method(Method::POST)
                    .uri("https://mail.test/send")
                    .body(vec![("order", order["id"].to_string())])
                    .build()
                    .ok()?;
                let response = resolve_client(&mailer_container).ok()?.send(request).ok()?;
                Some(json!(response.status().as_u16()))
            }),
        );

        let counter = Arc::clone(&audits);
        events.listen(
            "order.placed",
            Listener::new("OrderAudit", move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                None
            }),
        );

        let counter = Arc::clone(&audits);
        events.listen(
            "stock.*",
            Listener::new("StockAudit", move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                None
            }),
        );

        Self { container, audits }
    }

    fn place_order(&self, id: u64) {
        dispatch(
            &self.container,
            "order.placed",
            vec![EventArg::from(json!({ "id": id }))],
        )
        .unwrap();
        dispatch(&self.container, "stock.reserved", vec![]).unwrap();
    }
}

#[test]
fn test_only_scoped_listeners_fire() {
    let shop = Shop::boot();
    let mock = MockHttpClient::new();
    mock.append(MockResponse::new().status(202).build().unwrap());
    mock.install(&shop.container);

    let mut events = ModerateEvents::new(shop.container.clone());
    let actions = events
        .firing_scope(|| shop.place_order(7), "order.*", "*Mailer")
        .unwrap()
        .clone();

    assert_eq!(actions.len(), 1);
    assert_eq!(actions["order.placed"].listeners, vec!["OrderMailer"]);
    assert_eq!(shop.audits.load(Ordering::SeqCst), 0);

    let transactions = mock.transactions();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].request.uri, "https://mail.test/send");
    assert_eq!(transactions[0].request.body, json!({"order": "7"}));
    assert_eq!(transactions[0].response.status, 202);

    assert_eq!(events.to_array(), vec!["order.placed", "stock.reserved"]);
    mock.restore();
}

#[test]
fn test_real_dispatcher_is_back_after_scope() {
    let shop = Shop::boot();
    let before = shop.container.snapshot(test_helper::container::EVENTS);

    let mut events = ModerateEvents::new(shop.container.clone());
    events
        .firing_scope(|| shop.place_order(1), "order.placed", "OrderAudit")
        .unwrap();

    assert!(shop.container.snapshot(test_helper::container::EVENTS).same_as(&before));
    let dispatcher = shop.container.events().unwrap();
    let ids: Vec<String> = dispatcher
        .listeners("order.placed")
        .iter()
        .map(|l| l.id().to_string())
        .collect();
    assert_eq!(ids, vec!["OrderAudit"]);
    // out-of-scope listeners stay detached
    assert!(!dispatcher.has_listeners("stock.reserved"));
    assert_eq!(shop.audits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scope_with_unbound_http_client_still_replays() {
    let shop = Shop::boot();

    let mut events = ModerateEvents::new(shop.container.clone());
    let actions = events
        .firing_scope(|| shop.place_order(3), "*", "*")
        .unwrap()
        .clone();

    assert_eq!(actions.len(), 2);
    assert_eq!(actions["stock.reserved"].listeners, vec!["StockAudit"]);
    // both audit listeners ran; the mailer found no http client
    assert_eq!(shop.audits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_panicking_probe_restores_dispatcher() {
    let shop = Shop::boot();
    let container = shop.container.clone();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut events = ModerateEvents::new(container.clone());
        events.cherry_pick_events(|| panic!("probe failed"), false);
    }));

    assert!(result.is_err());
    let dispatcher = shop.container.events().unwrap();
    assert!(dispatcher.has_listeners("order.placed"));
}
