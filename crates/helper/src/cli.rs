// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line access to the markup, response and token helpers.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::env::{EnvError, TestSettings};
use crate::response::{parse_response, ResponseError};
use crate::token::{DummyTokenEndpoint, TokenError, TokenHelper};
use crate::xml::{XmlError, XmlNode, XmlParser};

/// Test helper toolkit
#[derive(Parser, Debug)]
#[command(name = "test-helper", version, about = "Test helper toolkit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the nodes an XPath expression selects in a markup file
    Query {
        /// Markup file to search
        file: PathBuf,

        /// XPath expression
        expr: String,

        /// Parse leniently as HTML instead of strict XML
        #[arg(long)]
        html: bool,

        /// Only the first match (an empty placeholder when nothing matches)
        #[arg(long)]
        first: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "markup")]
        output: QueryOutput,
    },

    /// Decode a response body the way test assertions see it
    ParseResponse {
        /// File holding the raw response body
        file: PathBuf,

        /// HTTP status to stamp into a JSON `code` field
        #[arg(long, default_value_t = 200)]
        status: u16,
    },

    /// Print a dummy bearer token for a client
    Token {
        /// Issuer (client name) of the assertion
        #[arg(long)]
        iss: String,

        /// Scope to request (can be specified multiple times)
        #[arg(long = "scope")]
        scopes: Vec<String>,
    },

    /// Print the application key, generating one if the env files lack it
    AppKey {
        /// Directory holding the env files
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

/// How `query` prints matches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum QueryOutput {
    /// Serialized markup of each node
    #[default]
    Markup,
    /// Text content only
    Text,
    /// JSON array of node snapshots
    Json,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write output: {0}")]
    Write(#[from] std::io::Error),

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("Cannot encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl Cli {
    /// Execute the parsed command, writing results to `out`
    pub fn run(&self, out: &mut dyn Write) -> Result<(), CliError> {
        match &self.command {
            Command::Query {
                file,
                expr,
                html,
                first,
                output,
            } => {
                let text = read(file)?;
                let parser = if *html {
                    XmlParser::html(&text)
                } else {
                    XmlParser::xml(&text)?
                };
                for error in parser.errors() {
                    tracing::warn!(%error, "markup diagnostic");
                }
                let nodes = if *first {
                    vec![parser.first(expr)?]
                } else {
                    parser.query(expr)?
                };
                write_nodes(out, &nodes, *output)
            }
            Command::ParseResponse { file, status } => {
                let body = read(file)?;
                let value = parse_response(*status, &body)?;
                writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
                Ok(())
            }
            Command::Token { iss, scopes } => {
                let mut helper = TokenHelper::new();
                let token = helper.generate_oauth_token(
                    &serde_json::json!({ "iss": iss }),
                    scopes.as_slice(),
                    &DummyTokenEndpoint::new(),
                )?;
                writeln!(out, "{}", token)?;
                Ok(())
            }
            Command::AppKey { dir } => {
                let mut settings = TestSettings::load(dir)?;
                writeln!(out, "{}", settings.generate_app_key()?)?;
                Ok(())
            }
        }
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_nodes(
    out: &mut dyn Write,
    nodes: &[XmlNode],
    output: QueryOutput,
) -> Result<(), CliError> {
    match output {
        QueryOutput::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(nodes)?)?;
        }
        QueryOutput::Text => {
            for node in nodes {
                writeln!(out, "{}", node.text())?;
            }
        }
        QueryOutput::Markup => {
            for node in nodes {
                writeln!(out, "{}", node.markup())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
