// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Events and the arguments they carry.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Something a dispatcher can fire.
///
/// Events are identified either by a plain name (`"orders.created"`) or by the
/// Rust type of the payload they were built from.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Named(String),
    Typed { type_name: String, payload: Value },
}

impl Event {
    pub fn named(name: impl Into<String>) -> Self {
        Event::Named(name.into())
    }

    /// Build an event identified by the type of `payload`
    pub fn of<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Event::Typed {
            type_name: std::any::type_name::<T>().to_string(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// The identifier listeners are registered under
    pub fn name(&self) -> &str {
        match self {
            Event::Named(name) => name,
            Event::Typed { type_name, .. } => type_name,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Event::Named(_) => None,
            Event::Typed { payload, .. } => Some(payload),
        }
    }
}

impl From<&str> for Event {
    fn from(name: &str) -> Self {
        Event::Named(name.to_string())
    }
}

impl From<String> for Event {
    fn from(name: String) -> Self {
        Event::Named(name)
    }
}

/// A mutable object passed by handle, so listeners observe (and make) changes
#[derive(Clone, Debug)]
pub struct SharedObject {
    type_name: String,
    state: Arc<RwLock<Value>>,
}

impl SharedObject {
    pub fn new(type_name: impl Into<String>, state: Value) -> Self {
        Self {
            type_name: type_name.into(),
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Current state
    pub fn get(&self) -> Value {
        self.state.read().clone()
    }

    pub fn set(&self, state: Value) {
        *self.state.write() = state;
    }

    /// Mutate the state in place
    pub fn update(&self, f: impl FnOnce(&mut Value)) {
        f(&mut self.state.write());
    }

    /// Whether both handles point at the same object
    pub fn same_as(&self, other: &SharedObject) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// A new object with a copy of the current state
    pub fn deep_clone(&self) -> Self {
        Self::new(self.type_name.clone(), self.get())
    }
}

/// One positional event argument
#[derive(Clone, Debug)]
pub enum EventArg {
    Value(Value),
    Object(SharedObject),
    List(Vec<EventArg>),
}

impl EventArg {
    /// Copy taken at capture time.
    ///
    /// Object arguments get fresh handles. Lists are scanned one level deep
    /// and their object elements copied individually; anything nested deeper
    /// keeps sharing.
    pub fn capture(&self) -> Self {
        match self {
            EventArg::Value(value) => EventArg::Value(value.clone()),
            EventArg::Object(object) => EventArg::Object(object.deep_clone()),
            EventArg::List(items) => EventArg::List(
                items
                    .iter()
                    .map(|item| match item {
                        EventArg::Object(object) => EventArg::Object(object.deep_clone()),
                        other => other.clone(),
                    })
                    .collect(),
            ),
        }
    }

    /// Plain JSON view of the argument
    pub fn to_value(&self) -> Value {
        match self {
            EventArg::Value(value) => value.clone(),
            EventArg::Object(object) => object.get(),
            EventArg::List(items) => Value::Array(items.iter().map(EventArg::to_value).collect()),
        }
    }

    pub fn as_object(&self) -> Option<&SharedObject> {
        match self {
            EventArg::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<Value> for EventArg {
    fn from(value: Value) -> Self {
        EventArg::Value(value)
    }
}

impl From<SharedObject> for EventArg {
    fn from(object: SharedObject) -> Self {
        EventArg::Object(object)
    }
}

impl From<Vec<EventArg>> for EventArg {
    fn from(items: Vec<EventArg>) -> Self {
        EventArg::List(items)
    }
}
