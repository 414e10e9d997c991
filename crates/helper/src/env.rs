// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment files and the application settings tests boot with.
//!
//! Settings come from the first env file found in a directory
//! ([`ENV_FILES`] order), with process environment variables taking
//! precedence over file values. Nothing is written back to the process
//! environment.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// `TEST_HELPER_LOG`: tracing filter for the binary.
pub const TEST_HELPER_LOG: &str = "TEST_HELPER_LOG";

/// `APP_URL`: base URL of the application under test.
pub const APP_URL: &str = "APP_URL";

/// `APP_KEY`: encryption key, `base64:`-prefixed when generated.
pub const APP_KEY: &str = "APP_KEY";

/// `APP_CIPHER`: encryption cipher.
pub const APP_CIPHER: &str = "APP_CIPHER";

/// Env files searched, most specific first
pub const ENV_FILES: [&str; 3] = [".env.testing", ".env", ".env.example"];

pub const DEFAULT_URL: &str = "http://localhost";

pub const DEFAULT_CIPHER: &str = "AES-256-CBC";

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Unsupported cipher: {0}")]
    Cipher(String),
}

/// The first of [`ENV_FILES`] present in `dir`
pub fn find_env_file(dir: &Path) -> Option<PathBuf> {
    ENV_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Parse a `KEY=VALUE` env file.
///
/// Blank lines and `#` comments are skipped and an `export ` prefix is
/// allowed. Values may be single-quoted (literal), double-quoted (escapes and
/// `${VAR}` expansion) or bare (trailing ` #` comment dropped, `${VAR}`
/// expansion). Expansion sees earlier keys in the file, then the process
/// environment.
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>, EnvError> {
    let text = std::fs::read_to_string(path).map_err(|source| EnvError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_env(&text).map_err(|(line, message)| EnvError::Syntax {
        path: path.to_path_buf(),
        line,
        message,
    })
}

fn parse_env(text: &str) -> Result<BTreeMap<String, String>, (usize, String)> {
    let mut vars = BTreeMap::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            return Err((index + 1, format!("expected KEY=VALUE, got {:?}", line)));
        };
        let key = key.trim();
        if !is_valid_key(key) {
            return Err((index + 1, format!("invalid variable name {:?}", key)));
        }
        let value = parse_value(value.trim()).map_err(|message| (index + 1, message))?;
        let value = match value {
            Parsed::Literal(value) => value,
            Parsed::Expand(value) => expand(&value, &vars),
        };
        vars.insert(key.to_string(), value);
    }
    Ok(vars)
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

enum Parsed {
    Literal(String),
    Expand(String),
}

fn parse_value(value: &str) -> Result<Parsed, String> {
    if let Some(rest) = value.strip_prefix('\'') {
        let end = rest.find('\'').ok_or("unterminated single quote")?;
        return Ok(Parsed::Literal(rest[..end].to_string()));
    }

    if let Some(rest) = value.strip_prefix('"') {
        let mut out = String::new();
        let mut chars = rest.chars();
        loop {
            match chars.next() {
                None => return Err("unterminated double quote".to_string()),
                Some('"') => return Ok(Parsed::Expand(out)),
                Some('\\') => match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c) => out.push(c),
                    None => return Err("unterminated double quote".to_string()),
                },
                Some(c) => out.push(c),
            }
        }
    }

    let bare = match value.find(" #") {
        Some(at) => &value[..at],
        None => value,
    };
    Ok(Parsed::Expand(bare.trim_end().to_string()))
}

fn expand(value: &str, vars: &BTreeMap<String, String>) -> String {
    static VARIABLE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(pattern) = VARIABLE
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.]*)\}").ok())
        .as_ref()
    else {
        return value.to_string();
    };
    pattern
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            vars.get(name)
                .cloned()
                .or_else(|| std::env::var(name).ok())
                .unwrap_or_default()
        })
        .into_owned()
}

/// Variables from an env file layered under the process environment
#[derive(Clone, Debug, Default)]
pub struct Environment {
    file: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Environment {
    /// Load the env file found in `dir`, if any
    pub fn load(dir: &Path) -> Result<Self, EnvError> {
        match find_env_file(dir) {
            Some(path) => {
                let values = load_env_file(&path)?;
                debug!(path = %path.display(), vars = values.len(), "loaded env file");
                Ok(Self {
                    file: Some(path),
                    values,
                })
            }
            None => {
                debug!(dir = %dir.display(), "no env file");
                Ok(Self::default())
            }
        }
    }

    pub fn from_values(values: BTreeMap<String, String>) -> Self {
        Self { file: None, values }
    }

    /// The env file the values came from
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Process environment first, then the file
    pub fn get(&self, name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .or_else(|| self.values.get(name).cloned())
    }

    /// File values only
    pub fn file_value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Application settings a test boots with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestSettings {
    /// `app.url`
    pub url: String,
    /// `app.key`; empty or absent until generated
    pub key: Option<String>,
    /// `app.cipher`
    pub cipher: String,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            key: None,
            cipher: DEFAULT_CIPHER.to_string(),
        }
    }
}

impl TestSettings {
    /// Settings from the env file in `dir` and the process environment
    pub fn load(dir: &Path) -> Result<Self, EnvError> {
        Ok(Self::from_environment(&Environment::load(dir)?))
    }

    pub fn from_environment(env: &Environment) -> Self {
        let defaults = Self::default();
        Self {
            url: env.get(APP_URL).unwrap_or(defaults.url),
            key: env.get(APP_KEY).filter(|key| !key.is_empty()),
            cipher: env.get(APP_CIPHER).unwrap_or(defaults.cipher),
        }
    }

    /// The application key, generating one sized for the cipher if unset.
    ///
    /// Generated keys are `base64:`-prefixed and kept on the settings.
    pub fn generate_app_key(&mut self) -> Result<String, EnvError> {
        if let Some(key) = self.key.as_ref().filter(|key| !key.is_empty()) {
            return Ok(key.clone());
        }
        let mut bytes = vec![0u8; key_length(&self.cipher)?];
        fastrand::fill(&mut bytes);
        let key = format!("base64:{}", STANDARD.encode(&bytes));
        debug!(cipher = %self.cipher, "generated app key");
        self.key = Some(key.clone());
        Ok(key)
    }
}

/// Key length in bytes for a supported cipher
pub fn key_length(cipher: &str) -> Result<usize, EnvError> {
    match cipher.to_ascii_lowercase().as_str() {
        "aes-128-cbc" | "aes-128-gcm" => Ok(16),
        "aes-256-cbc" | "aes-256-gcm" => Ok(32),
        _ => Err(EnvError::Cipher(cipher.to_string())),
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
