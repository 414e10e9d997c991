// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test helper
//!
//! Support code for integration tests of HTTP applications: path queries over
//! response markup, scoped event firing, mocked outbound HTTP, readable
//! assertion reports and dummy OAuth tokens.
//!
#![doc = include_str!("../README.md")]

/// Re-exported capture types from the test-helper-capture crate.
pub mod capture {
    pub use test_helper_capture::{
        CapturedRequest, CapturedResponse, CapturedTransaction, HeaderValues, TransactionLog,
    };
}
#[doc(hidden)]
pub mod cli;
pub mod container;
pub mod env;
pub mod events;
pub mod http;
pub mod json;
pub mod response;
pub mod token;
pub mod trace;
pub mod xml;
