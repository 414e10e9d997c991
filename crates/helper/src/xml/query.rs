// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental path-query construction.
//!
//! The builder keeps an ordered list of [`Fragment`]s and renders them into an
//! XPath 1.0 expression on demand. Quoting of user values and insertion of the
//! `*` element wildcard both happen here and nowhere else.

use std::fmt;

/// One piece of a path query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    /// Leading `/` anchoring the path at the document root
    Root,
    /// `/a/b`
    Children(Vec<String>),
    /// `//a//b`
    Descendants(Vec<String>),
    /// `*`
    Wildcard,
    /// `[expr]`
    Predicate(String),
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Root => f.write_str("/"),
            Fragment::Children(names) => write!(f, "/{}", names.join("/")),
            Fragment::Descendants(names) => write!(f, "//{}", names.join("//")),
            Fragment::Wildcard => f.write_str("*"),
            Fragment::Predicate(expr) => write!(f, "[{}]", expr),
        }
    }
}

/// Boolean operator joining attribute tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => f.write_str("and"),
            Operator::Or => f.write_str("or"),
        }
    }
}

/// An attribute test inside a predicate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    /// `@name`
    Exists(String),
    /// `@name="value"`
    Equals(String, String),
}

impl Attribute {
    fn render(&self) -> String {
        match self {
            Attribute::Exists(name) => format!("@{}", name),
            Attribute::Equals(name, value) => format!("@{}={}", name, xpath_literal(value)),
        }
    }
}

impl From<&str> for Attribute {
    fn from(name: &str) -> Self {
        Attribute::Exists(name.to_string())
    }
}

impl From<String> for Attribute {
    fn from(name: String) -> Self {
        Attribute::Exists(name)
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for Attribute {
    fn from((name, value): (N, V)) -> Self {
        Attribute::Equals(name.into(), value.into())
    }
}

/// Quote `value` as an XPath string literal.
///
/// XPath 1.0 has no escape sequences, so a value holding both quote styles is
/// split and rebuilt with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    if !value.contains('\'') {
        return format!("'{}'", value);
    }

    let parts: Vec<String> = value
        .split('"')
        .map(|part| format!("\"{}\"", part))
        .collect();
    format!("concat({})", parts.join(", '\"', "))
}

/// Accumulates fragments and renders them into an expression
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    fragments: Vec<Fragment>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Append `/a/b`; an empty query is first anchored with `/`.
    pub fn children<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.fragments.is_empty() {
            self.fragments.push(Fragment::Root);
        }
        self.fragments
            .push(Fragment::Children(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Append `//a//b`
    pub fn descendants<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fragments
            .push(Fragment::Descendants(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Append `[@a="x" and @b]`, joined with `operator`
    pub fn attributes<I, A>(&mut self, attributes: I, operator: Operator) -> &mut Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Attribute>,
    {
        let tests: Vec<String> = attributes
            .into_iter()
            .map(|attribute| attribute.into().render())
            .collect();
        self.bind_to_element();
        self.fragments.push(Fragment::Predicate(
            tests.join(&format!(" {} ", operator)),
        ));
        self
    }

    /// Append `[text()][contains(., "…")]`
    pub fn text_contains(&mut self, needle: &str) -> &mut Self {
        self.bind_to_element();
        self.fragments.push(Fragment::Predicate("text()".to_string()));
        self.fragments.push(Fragment::Predicate(format!(
            "contains(., {})",
            xpath_literal(needle)
        )));
        self
    }

    /// Drop every fragment
    pub fn clear(&mut self) -> &mut Self {
        self.fragments.clear();
        self
    }

    /// Whether the rendered query is empty or ends at a path separator
    pub fn ends_at_separator(&self) -> bool {
        let rendered = self.render();
        rendered.is_empty() || rendered.ends_with('/')
    }

    // A predicate right after a separator (or at the start) needs an element
    // test to attach to.
    fn bind_to_element(&mut self) {
        if self.ends_at_separator() {
            self.fragments.push(Fragment::Wildcard);
        }
    }

    /// Render the accumulated expression
    pub fn render(&self) -> String {
        self.fragments.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
