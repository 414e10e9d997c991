// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The query-building parser.

use super::document::{DEFAULT_ENCODING, DEFAULT_VERSION};
use super::query::{Attribute, Operator, QueryBuilder};
use super::{Document, DocumentKind, Evaluator, XmlError, XmlNode};
use serde_json::Value;
use tracing::{debug, warn};

/// How text input is parsed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    pub html: bool,
    pub version: String,
    pub encoding: String,
}

impl ParseOptions {
    pub fn xml() -> Self {
        Self {
            html: false,
            version: DEFAULT_VERSION.to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }

    pub fn html() -> Self {
        Self {
            html: true,
            ..Self::xml()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    fn kind(&self) -> DocumentKind {
        if self.html {
            DocumentKind::Html
        } else {
            DocumentKind::Xml
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::xml()
    }
}

/// Anything a parser can be initialized from
#[derive(Debug)]
pub enum XmlSource {
    Text(String),
    Document(Document),
    Evaluator(Evaluator),
}

impl From<&str> for XmlSource {
    fn from(text: &str) -> Self {
        XmlSource::Text(text.to_string())
    }
}

impl From<String> for XmlSource {
    fn from(text: String) -> Self {
        XmlSource::Text(text)
    }
}

impl From<Document> for XmlSource {
    fn from(document: Document) -> Self {
        XmlSource::Document(document)
    }
}

impl From<Evaluator> for XmlSource {
    fn from(evaluator: Evaluator) -> Self {
        XmlSource::Evaluator(evaluator)
    }
}

/// Dynamic input: strings parse, null is an empty document, anything else is
/// rejected with the received type in the message.
impl TryFrom<Value> for XmlSource {
    type Error = XmlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(XmlSource::Text(text)),
            Value::Null => Ok(XmlSource::Text(String::new())),
            other => Err(XmlError::InvalidInput {
                found: crate::json::type_name(&other).to_string(),
            }),
        }
    }
}

/// Parses markup and answers path queries built up through `where_*` calls.
#[derive(Debug)]
pub struct XmlParser {
    xml_string: String,
    evaluator: Evaluator,
    query: QueryBuilder,
    errors: Vec<String>,
}

impl XmlParser {
    pub fn new(source: impl Into<XmlSource>, options: ParseOptions) -> Result<Self, XmlError> {
        let mut parser = Self {
            xml_string: String::new(),
            evaluator: Evaluator::new(Document::empty(
                options.kind(),
                &options.version,
                &options.encoding,
            )),
            query: QueryBuilder::new(),
            errors: Vec::new(),
        };
        parser.set_xml(source, options)?;
        Ok(parser)
    }

    /// Parse an HTML string with default options
    pub fn html(text: &str) -> Self {
        let (document, errors) = if text.trim().is_empty() {
            let empty = Document::empty(DocumentKind::Html, DEFAULT_VERSION, DEFAULT_ENCODING);
            (empty, Vec::new())
        } else {
            Document::parse_html(text)
        };
        let mut parser = Self::from_document(document, true);
        parser.xml_string = text.to_string();
        parser.errors = errors;
        parser
    }

    /// Parse an XML string with default options
    pub fn xml(text: &str) -> Result<Self, XmlError> {
        Self::new(text, ParseOptions::xml())
    }

    fn from_document(document: Document, html: bool) -> Self {
        let xml_string = if html {
            document.save_html()
        } else {
            document.save_xml()
        };
        Self {
            xml_string,
            evaluator: Evaluator::new(document),
            query: QueryBuilder::new(),
            errors: Vec::new(),
        }
    }

    /// Replace the document with `source`
    pub fn set_xml(
        &mut self,
        source: impl Into<XmlSource>,
        options: ParseOptions,
    ) -> Result<&mut Self, XmlError> {
        match source.into() {
            XmlSource::Text(text) if text.trim().is_empty() => {
                self.xml_string = text;
                self.evaluator = Evaluator::new(Document::empty(
                    options.kind(),
                    &options.version,
                    &options.encoding,
                ));
            }
            XmlSource::Text(text) => {
                self.evaluator = Evaluator::new(Document::empty(
                    options.kind(),
                    &options.version,
                    &options.encoding,
                ));
                self.load(&text, options.html)?;
            }
            XmlSource::Document(document) => {
                self.xml_string = serialize(&document, options.html);
                self.evaluator = Evaluator::new(document);
            }
            XmlSource::Evaluator(evaluator) => {
                self.xml_string = serialize(evaluator.document(), options.html);
                self.evaluator = evaluator;
            }
        }
        Ok(self)
    }

    /// Parse `text` into the current document, replacing its content.
    ///
    /// HTML diagnostics are appended to [`XmlParser::errors`]; XML errors are
    /// returned.
    pub fn load(&mut self, text: &str, html: bool) -> Result<&mut Self, XmlError> {
        let diagnostics = self.evaluator.document_mut().load(text, html)?;
        for diagnostic in &diagnostics {
            if diagnostic.contains("end tag") {
                warn!(diagnostic = %diagnostic, "unexpected end tag in HTML input");
            } else {
                debug!(diagnostic = %diagnostic, "recovered from malformed HTML");
            }
        }
        self.errors.extend(diagnostics);
        self.xml_string = text.to_string();
        Ok(self)
    }

    /// Diagnostics collected from every HTML load
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn document(&self) -> &Document {
        self.evaluator.document()
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// The markup this parser was last given (or the serialization of the
    /// document it was given)
    pub fn xml_string(&self) -> &str {
        &self.xml_string
    }

    /// The accumulated expression
    pub fn query_string(&self) -> String {
        self.query.render()
    }

    pub fn where_children<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.children(names);
        self
    }

    pub fn where_descendant<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.descendants(names);
        self
    }

    pub fn where_attributes<I, A>(&mut self, attributes: I, operator: Operator) -> &mut Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Attribute>,
    {
        self.query.attributes(attributes, operator);
        self
    }

    pub fn where_attribute_any<I, A>(&mut self, attributes: I) -> &mut Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Attribute>,
    {
        self.where_attributes(attributes, Operator::Or)
    }

    pub fn where_all_attributes<I, A>(&mut self, attributes: I) -> &mut Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Attribute>,
    {
        self.where_attributes(attributes, Operator::And)
    }

    pub fn where_text(&mut self, contains: &str) -> &mut Self {
        self.query.text_contains(contains);
        self
    }

    /// Reset the accumulated query; the document is untouched
    pub fn clear(&mut self) -> &mut Self {
        self.query.clear();
        self
    }

    /// Evaluate `query_string`, or the accumulated query when it is empty
    pub fn query(&self, query_string: &str) -> Result<Vec<XmlNode>, XmlError> {
        let expression = if query_string.is_empty() {
            self.query.render()
        } else {
            query_string.to_string()
        };
        self.evaluator.evaluate(&expression)
    }

    /// First match, or the placeholder node when nothing matched
    pub fn first(&self, query_string: &str) -> Result<XmlNode, XmlError> {
        Ok(self
            .query(query_string)?
            .into_iter()
            .next()
            .unwrap_or_else(XmlNode::placeholder))
    }
}

fn serialize(document: &Document, html: bool) -> String {
    if html {
        document.save_html()
    } else {
        document.save_xml()
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
