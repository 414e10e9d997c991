// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Response inspection: body decoding, a recording test client, and
//! assertion reports.

mod assert;
mod client;
mod parse;

pub use assert::{
    assert_that, contains_string, equal_to, satisfies, AssertionReport, Constraint,
    ContainsString, EqualTo, Failure, Satisfies,
};
pub use client::{ReceivedResponse, SentRequest, TestClient, Transmission};
pub use parse::{collapse_whitespace, parse_response};

use crate::http::HttpError;
use crate::xml::XmlError;
use thiserror::Error;

/// Errors from sending requests or decoding responses
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Cannot inspect response body: {0}")]
    Markup(#[from] XmlError),

    #[error("Cannot encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}
