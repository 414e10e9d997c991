// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher contract and the in-memory dispatcher.

use super::{Event, EventArg, EventError};
use glob::Pattern;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use tracing::warn;

/// Listener callback; a `Some` return is the listener's response
pub type ListenerFn = dyn Fn(&Event, &[EventArg]) -> Option<Value> + Send + Sync;

/// A named callback attached to an event
#[derive(Clone)]
pub struct Listener {
    id: String,
    callback: Arc<ListenerFn>,
}

impl Listener {
    /// Listener identified by `id` (typically a handler type name)
    pub fn new<F>(id: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Event, &[EventArg]) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            callback: Arc::new(callback),
        }
    }

    /// Anonymous listener, identified by where it was created
    #[track_caller]
    pub fn closure<F>(callback: F) -> Self
    where
        F: Fn(&Event, &[EventArg]) -> Option<Value> + Send + Sync + 'static,
    {
        let location = Location::caller();
        Self::new(
            format!("closure@{}:{}", location.file(), location.line()),
            callback,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn call(&self, event: &Event, args: &[EventArg]) -> Option<Value> {
        (self.callback)(event, args)
    }

    /// Whether both listeners share the same callback
    pub fn same_as(&self, other: &Listener) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}

/// Event dispatch as seen by application code
pub trait Dispatcher: Send + Sync {
    /// Attach `listener` to `event`.
    ///
    /// A name containing `*` registers a glob. A glob that does not compile
    /// is logged and registered as a literal name; use
    /// [`EventDispatcher::try_listen`] to get the error instead.
    fn listen(&self, event: &str, listener: Listener);

    /// Fire `event`, collecting every listener response
    fn dispatch(&self, event: Event, args: Vec<EventArg>) -> Vec<Value>;

    /// Fire `event` until a listener responds
    fn until(&self, event: Event, args: Vec<EventArg>) -> Option<Value>;

    /// Detach every listener that would receive `event`
    fn forget(&self, event: &str);

    /// Listeners that would receive `event`, in call order
    fn listeners(&self, event: &str) -> Vec<Listener>;

    fn has_listeners(&self, event: &str) -> bool {
        !self.listeners(event).is_empty()
    }

    fn fire(&self, event: Event, args: Vec<EventArg>) -> Vec<Value> {
        self.dispatch(event, args)
    }
}

struct WildcardListener {
    pattern: Pattern,
    listener: Listener,
}

/// In-memory dispatcher with exact and wildcard (`orders.*`) registration
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<BTreeMap<String, Vec<Listener>>>,
    wildcards: RwLock<Vec<WildcardListener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `listener` to `event`, failing on a wildcard that does not
    /// compile
    pub fn try_listen(&self, event: &str, listener: Listener) -> Result<(), EventError> {
        if event.contains('*') {
            let pattern = Pattern::new(event)?;
            self.wildcards
                .write()
                .push(WildcardListener { pattern, listener });
        } else {
            self.listen_exact(event, listener);
        }
        Ok(())
    }

    fn listen_exact(&self, event: &str, listener: Listener) {
        self.listeners
            .write()
            .entry(event.to_string())
            .or_default()
            .push(listener);
    }
}

impl Dispatcher for EventDispatcher {
    fn listen(&self, event: &str, listener: Listener) {
        if let Err(e) = self.try_listen(event, listener.clone()) {
            warn!(event, error = %e, "invalid wildcard, registering literally");
            self.listen_exact(event, listener);
        }
    }

    fn dispatch(&self, event: Event, args: Vec<EventArg>) -> Vec<Value> {
        self.listeners(event.name())
            .iter()
            .filter_map(|listener| listener.call(&event, &args))
            .collect()
    }

    fn until(&self, event: Event, args: Vec<EventArg>) -> Option<Value> {
        self.listeners(event.name())
            .iter()
            .find_map(|listener| listener.call(&event, &args))
    }

    fn forget(&self, event: &str) {
        self.listeners.write().remove(event);
        self.wildcards
            .write()
            .retain(|w| w.pattern.as_str() != event && !w.pattern.matches(event));
    }

    fn listeners(&self, event: &str) -> Vec<Listener> {
        let mut found = self
            .listeners
            .read()
            .get(event)
            .cloned()
            .unwrap_or_default();
        found.extend(
            self.wildcards
                .read()
                .iter()
                .filter(|w| w.pattern.matches(event))
                .map(|w| w.listener.clone()),
        );
        found
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events: Vec<String> = self.listeners.read().keys().cloned().collect();
        let wildcards: Vec<String> = self
            .wildcards
            .read()
            .iter()
            .map(|w| w.pattern.as_str().to_string())
            .collect();
        f.debug_struct("EventDispatcher")
            .field("events", &events)
            .field("wildcards", &wildcards)
            .finish()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
