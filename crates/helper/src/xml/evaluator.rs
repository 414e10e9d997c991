// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Path evaluation bound to one document.

use super::{Document, XmlError, XmlNode};
use sxd_xpath::Value;

/// Evaluates XPath 1.0 expressions against the document it owns.
#[derive(Debug)]
pub struct Evaluator {
    document: Document,
}

impl Evaluator {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Evaluate `expression`, returning the matched nodes in document order.
    ///
    /// Expressions that do not produce a node-set (`count(//a)`, `'text'`)
    /// fail with [`XmlError::InvalidResult`]; a valid node-set with no members
    /// is an empty vector.
    pub fn evaluate(&self, expression: &str) -> Result<Vec<XmlNode>, XmlError> {
        let html = self.document.is_html();
        self.document.with_dom(|doc| {
            let value =
                sxd_xpath::evaluate_xpath(doc, expression).map_err(|e| XmlError::Query {
                    expression: expression.to_string(),
                    message: e.to_string(),
                })?;

            match value {
                Value::Nodeset(nodes) => Ok(nodes
                    .document_order()
                    .into_iter()
                    .map(|node| XmlNode::from_match(node, html))
                    .collect()),
                Value::Boolean(_) => Err(invalid_result(expression, "boolean")),
                Value::Number(_) => Err(invalid_result(expression, "number")),
                Value::String(_) => Err(invalid_result(expression, "string")),
            }
        })
    }
}

fn invalid_result(expression: &str, found: &'static str) -> XmlError {
    XmlError::InvalidResult {
        expression: expression.to_string(),
        found,
    }
}
