// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed markup documents.
//!
//! XML is parsed strictly by `sxd-document`. HTML goes through the html5ever
//! tree builder (via `scraper`), which recovers from malformed markup and
//! reports what it recovered from; the recovered tree is then copied into an
//! `sxd-document` package so both kinds share one path evaluator.

use super::XmlError;
use scraper::{ElementRef, Html, Node};
use sxd_document::dom::{self, ChildOfElement, ChildOfRoot};
use sxd_document::Package;
use uuid::Uuid;

pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Elements serialized without a closing tag in HTML output
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text content is written verbatim in HTML output
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Which grammar produced the document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Xml,
    Html,
}

/// A parsed markup tree.
///
/// The document keeps its identity across [`Document::load`] calls; only the
/// content is replaced.
pub struct Document {
    id: Uuid,
    package: Package,
    kind: DocumentKind,
    version: String,
    encoding: String,
}

impl Document {
    /// Create an empty document
    pub fn empty(kind: DocumentKind, version: &str, encoding: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            package: Package::new(),
            kind,
            version: version.to_string(),
            encoding: encoding.to_string(),
        }
    }

    /// Parse strict XML
    pub fn parse_xml(text: &str) -> Result<Self, XmlError> {
        let mut document = Self::empty(DocumentKind::Xml, DEFAULT_VERSION, DEFAULT_ENCODING);
        document.load(text, false)?;
        Ok(document)
    }

    /// Parse lenient HTML, returning the document and the parser diagnostics
    pub fn parse_html(text: &str) -> (Self, Vec<String>) {
        let mut document = Self::empty(DocumentKind::Html, DEFAULT_VERSION, DEFAULT_ENCODING);
        let diagnostics = document.replace_with_html(text);
        (document, diagnostics)
    }

    /// Replace the content of this document with freshly parsed markup.
    ///
    /// HTML never fails; its diagnostics are returned. XML failures leave the
    /// previous content in place.
    pub fn load(&mut self, text: &str, html: bool) -> Result<Vec<String>, XmlError> {
        if html {
            return Ok(self.replace_with_html(text));
        }

        let package =
            sxd_document::parser::parse(text).map_err(|e| XmlError::Parse(format!("{:?}", e)))?;
        self.package = package;
        self.kind = DocumentKind::Xml;
        Ok(Vec::new())
    }

    fn replace_with_html(&mut self, text: &str) -> Vec<String> {
        let html = Html::parse_document(text);
        let diagnostics = html.errors.iter().map(|e| e.to_string()).collect();

        let package = Package::new();
        {
            let doc = package.as_document();
            let source = html.root_element();
            let element = copy_element(&doc, source);
            doc.root().append_child(element);
        }

        self.package = package;
        self.kind = DocumentKind::Html;
        diagnostics
    }

    /// Stable identity of this document across reloads
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn is_html(&self) -> bool {
        self.kind == DocumentKind::Html
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Whether the document has no root element
    pub fn is_empty(&self) -> bool {
        self.root_name().is_none()
    }

    /// Local name of the root element
    pub fn root_name(&self) -> Option<String> {
        let doc = self.package.as_document();
        let children = doc.root().children();
        children.into_iter().find_map(|child| match child {
            ChildOfRoot::Element(element) => Some(element.name().local_part().to_string()),
            _ => None,
        })
    }

    /// Borrow the underlying `sxd-document` view
    pub(crate) fn with_dom<R>(&self, f: impl FnOnce(&dom::Document<'_>) -> R) -> R {
        let doc = self.package.as_document();
        f(&doc)
    }

    /// Serialize as XML, with a declaration carrying version and encoding
    pub fn save_xml(&self) -> String {
        let mut out = format!(
            "<?xml version=\"{}\" encoding=\"{}\"?>\n",
            self.version, self.encoding
        );
        let doc = self.package.as_document();
        for child in doc.root().children() {
            match child {
                ChildOfRoot::Element(element) => {
                    write_element(&mut out, element, false);
                    out.push('\n');
                }
                ChildOfRoot::Comment(comment) => {
                    out.push_str(&format!("<!--{}-->\n", comment.text()));
                }
                _ => {}
            }
        }
        out
    }

    /// Serialize as HTML
    pub fn save_html(&self) -> String {
        let mut out = String::new();
        let doc = self.package.as_document();
        for child in doc.root().children() {
            if let ChildOfRoot::Element(element) = child {
                write_element(&mut out, element, true);
                out.push('\n');
            }
        }
        out
    }

    /// Serialize according to the document kind
    pub fn save(&self) -> String {
        match self.kind {
            DocumentKind::Html => self.save_html(),
            DocumentKind::Xml => self.save_xml(),
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("root", &self.root_name())
            .finish_non_exhaustive()
    }
}

fn copy_element<'d>(doc: &dom::Document<'d>, source: ElementRef<'_>) -> dom::Element<'d> {
    let element = doc.create_element(source.value().name());
    for (name, value) in source.value().attrs() {
        // Prefixed names would be read as namespace-qualified; keep them out.
        if name.contains(':') {
            continue;
        }
        element.set_attribute_value(name, value);
    }

    for child in source.children() {
        match child.value() {
            Node::Text(text) => element.append_child(doc.create_text(&**text)),
            Node::Comment(comment) => element.append_child(doc.create_comment(&**comment)),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    element.append_child(copy_element(doc, child_element));
                }
            }
            _ => {}
        }
    }

    element
}

/// Serialize one element subtree
pub(crate) fn write_element(out: &mut String, element: dom::Element<'_>, html: bool) {
    let name = element.name().local_part();
    out.push('<');
    out.push_str(name);
    for attribute in element.attributes() {
        out.push(' ');
        out.push_str(attribute.name().local_part());
        out.push_str("=\"");
        out.push_str(&escape(attribute.value(), true));
        out.push('"');
    }

    let children = element.children();
    if children.is_empty() {
        if !html {
            out.push_str("/>");
        } else if VOID_ELEMENTS.contains(&name) {
            out.push('>');
        } else {
            out.push_str(&format!("></{}>", name));
        }
        return;
    }

    out.push('>');
    let raw = html && RAW_TEXT_ELEMENTS.contains(&name);
    for child in children {
        match child {
            ChildOfElement::Element(child) => write_element(out, child, html),
            ChildOfElement::Text(text) if raw => out.push_str(text.text()),
            ChildOfElement::Text(text) => out.push_str(&escape(text.text(), false)),
            ChildOfElement::Comment(comment) => {
                out.push_str(&format!("<!--{}-->", comment.text()));
            }
            _ => {}
        }
    }
    out.push_str(&format!("</{}>", name));
}

fn escape(text: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
