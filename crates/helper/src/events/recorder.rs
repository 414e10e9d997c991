// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recording stand-in for the event dispatcher.

use super::{Dispatcher, Event, EventArg, Listener};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

/// A `listen` call seen while recording
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub event: String,
    pub listener: String,
}

/// Everything a probe fired, in order.
///
/// `events` and `args` are parallel: the arguments of `events[i]` are
/// `args[i]`.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
    args: Vec<Vec<EventArg>>,
    registrations: Vec<Registration>,
}

impl EventLog {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn args(&self) -> &[Vec<EventArg>] {
        &self.args
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.args.clear();
        self.registrations.clear();
    }

    fn record(&mut self, event: Event, args: &[EventArg]) -> usize {
        self.events.push(event);
        self.args.push(args.iter().map(EventArg::capture).collect());
        self.events.len() - 1
    }
}

/// Dispatcher that records fired events instead of running listeners
#[derive(Clone, Debug, Default)]
pub struct RecordingDispatcher {
    log: Arc<Mutex<EventLog>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record into an existing shared log
    pub fn with_log(log: Arc<Mutex<EventLog>>) -> Self {
        Self { log }
    }

    pub fn log(&self) -> Arc<Mutex<EventLog>> {
        Arc::clone(&self.log)
    }

    fn record(&self, event: Event, args: &[EventArg]) {
        let name = event.name().to_string();
        let index = self.log.lock().record(event, args);
        trace!(event = %name, index, "recorded event");
    }
}

impl Dispatcher for RecordingDispatcher {
    fn listen(&self, event: &str, listener: Listener) {
        self.log.lock().registrations.push(Registration {
            event: event.to_string(),
            listener: listener.id().to_string(),
        });
    }

    fn dispatch(&self, event: Event, args: Vec<EventArg>) -> Vec<Value> {
        self.record(event, &args);
        Vec::new()
    }

    fn until(&self, event: Event, args: Vec<EventArg>) -> Option<Value> {
        self.record(event, &args);
        None
    }

    fn forget(&self, _event: &str) {}

    fn listeners(&self, _event: &str) -> Vec<Listener> {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
