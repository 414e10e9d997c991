// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Assertions that explain themselves.
//!
//! A failed [`assert_that`] produces an [`AssertionReport`] carrying the
//! comparison, the route that served the last request, and the last
//! request/response pair.

use super::Transmission;
use crate::http::RouteInfo;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Why a value did not satisfy a constraint
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Failure {
    pub message: String,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn comparing(mut self, expected: Value, actual: Value) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self
    }
}

/// A check applied to a value
pub trait Constraint<T: ?Sized> {
    fn evaluate(&self, value: &T) -> Result<(), Failure>;
}

/// Serialized equality
pub struct EqualTo(Value);

/// Equal, once both sides are serialized to JSON
pub fn equal_to(expected: impl Serialize) -> EqualTo {
    EqualTo(serde_json::to_value(expected).unwrap_or(Value::Null))
}

impl<T: Serialize + ?Sized> Constraint<T> for EqualTo {
    fn evaluate(&self, value: &T) -> Result<(), Failure> {
        let actual = serde_json::to_value(value).unwrap_or(Value::Null);
        if actual == self.0 {
            return Ok(());
        }
        Err(Failure::new(format!(
            "Failed asserting that {} is equal to {}.",
            actual, self.0
        ))
        .comparing(self.0.clone(), actual))
    }
}

/// Substring match
pub struct ContainsString(String);

pub fn contains_string(needle: impl Into<String>) -> ContainsString {
    ContainsString(needle.into())
}

impl<T: AsRef<str> + ?Sized> Constraint<T> for ContainsString {
    fn evaluate(&self, value: &T) -> Result<(), Failure> {
        let haystack = value.as_ref();
        if haystack.contains(&self.0) {
            return Ok(());
        }
        Err(Failure::new(format!(
            "Failed asserting that '{}' contains \"{}\".",
            haystack, self.0
        )))
    }
}

/// A described predicate
pub struct Satisfies<F> {
    description: String,
    predicate: F,
}

pub fn satisfies<T: ?Sized, F: Fn(&T) -> bool>(
    description: impl Into<String>,
    predicate: F,
) -> Satisfies<F> {
    Satisfies {
        description: description.into(),
        predicate,
    }
}

impl<T: fmt::Debug + ?Sized, F: Fn(&T) -> bool> Constraint<T> for Satisfies<F> {
    fn evaluate(&self, value: &T) -> Result<(), Failure> {
        if (self.predicate)(value) {
            return Ok(());
        }
        Err(Failure::new(format!(
            "Failed asserting that {:?} {}.",
            value, self.description
        )))
    }
}

/// A failed assertion with its surroundings
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssertionReport {
    pub error: Failure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<Transmission>,
}

impl fmt::Display for AssertionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str(&self.error.message),
        }
    }
}

impl std::error::Error for AssertionReport {}

/// Check `value` against `constraint`, prefixing any failure with `message`
pub fn assert_that<T: ?Sized>(
    value: &T,
    constraint: &dyn Constraint<T>,
    message: &str,
) -> Result<(), AssertionReport> {
    constraint.evaluate(value).map_err(|failure| AssertionReport {
        error: with_message(failure, message),
        route: None,
        transmission: None,
    })
}

pub(crate) fn with_message(mut failure: Failure, message: &str) -> Failure {
    if !message.is_empty() {
        failure.message = format!("{}\n{}", message, failure.message);
    }
    failure
}

#[cfg(test)]
#[path = "assert_tests.rs"]
mod tests;
