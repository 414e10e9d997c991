// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Markup inspection for response bodies.
//!
//! An [`XmlParser`] owns a parsed HTML or XML [`Document`] and accumulates a
//! path query through chained `where_*` calls. The query is only rendered and
//! evaluated when [`XmlParser::query`] or [`XmlParser::first`] is called, so an
//! invalid expression surfaces as an [`XmlError::Query`] at that point.
//!
//! ```text
//! parser.where_children(["ul", "li"]).where_attribute_any(["data-id"]);
//! // renders //ul/li[@data-id]
//! ```

pub mod document;
pub mod evaluator;
pub mod node;
pub mod parser;
pub mod query;

pub use document::{Document, DocumentKind};
pub use evaluator::Evaluator;
pub use node::{NodeKind, XmlNode};
pub use parser::{ParseOptions, XmlParser, XmlSource};
pub use query::{xpath_literal, Attribute, Fragment, Operator, QueryBuilder};

use thiserror::Error;

/// Errors raised while loading or querying markup
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("First argument must be markup text, a parsed document or an evaluator; {found} given.")]
    InvalidInput { found: String },

    #[error("Failed to parse XML: {0}")]
    Parse(String),

    #[error("Invalid expression: '{expression}': {message}")]
    Query { expression: String, message: String },

    #[error("Invalid query expression: '{expression}' evaluated to a {found}, not a node-set.")]
    InvalidResult {
        expression: String,
        found: &'static str,
    },
}
