// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction capture and recording for test assertions.
//!
//! This crate records the outbound HTTP exchanges a mocked client performs,
//! so tests can assert on exactly what was sent and what came back.

mod duration_serde;
mod transaction;
mod log;

pub use log::TransactionLog;
pub use transaction::{CapturedRequest, CapturedResponse, CapturedTransaction, HeaderValues};
