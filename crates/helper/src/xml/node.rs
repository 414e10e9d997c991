// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Owned snapshots of matched nodes.

use serde::Serialize;
use sxd_xpath::nodeset::Node;

/// Name carried by the placeholder node
pub const PLACEHOLDER_NAME: &str = "null";

/// Kind of a matched node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    Other,
}

/// A node matched by a path query.
///
/// Nodes are detached copies: they stay valid after the parser reloads or
/// drops its document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct XmlNode {
    kind: NodeKind,
    name: String,
    value: String,
    attributes: Vec<(String, String)>,
    markup: String,
    placeholder: bool,
}

impl XmlNode {
    /// The null-object node returned when nothing matched
    pub fn placeholder() -> Self {
        Self {
            kind: NodeKind::Element,
            name: PLACEHOLDER_NAME.to_string(),
            value: String::new(),
            attributes: Vec::new(),
            markup: String::new(),
            placeholder: true,
        }
    }

    pub(crate) fn from_match(node: Node<'_>, html: bool) -> Self {
        let value = node.string_value();
        match node {
            Node::Element(element) => {
                let mut markup = String::new();
                super::document::write_element(&mut markup, element, html);
                Self {
                    kind: NodeKind::Element,
                    name: element.name().local_part().to_string(),
                    value,
                    attributes: element
                        .attributes()
                        .iter()
                        .map(|a| (a.name().local_part().to_string(), a.value().to_string()))
                        .collect(),
                    markup,
                    placeholder: false,
                }
            }
            Node::Attribute(attribute) => Self::leaf(
                NodeKind::Attribute,
                attribute.name().local_part().to_string(),
                value,
            ),
            Node::Text(_) => Self::leaf(NodeKind::Text, "#text".to_string(), value),
            Node::Comment(_) => Self::leaf(NodeKind::Comment, "#comment".to_string(), value),
            Node::Root(_) => Self::leaf(NodeKind::Document, "#document".to_string(), value),
            _ => Self::leaf(NodeKind::Other, "#node".to_string(), value),
        }
    }

    fn leaf(kind: NodeKind, name: String, value: String) -> Self {
        Self {
            kind,
            name,
            markup: value.clone(),
            value,
            attributes: Vec::new(),
            placeholder: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Local name (`#text`, `#comment` for non-element nodes)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// String value: concatenated descendant text for elements
    pub fn text(&self) -> &str {
        &self.value
    }

    /// Attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Serialized subtree
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}
