// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth bearer tokens for tests.
//!
//! [`TokenHelper::generate_oauth_token`] signs a client assertion with
//! ephemeral keys, exchanges it at a [`TokenEndpoint`] through the
//! `client_credentials` grant, and returns an `Authorization` header value.
//! [`DummyTokenEndpoint`] stands in for a real authorization server: no client
//! or token storage is involved.

mod endpoint;
pub mod jwt;

pub use endpoint::{
    ClientCredentials, DummyClient, DummyToken, DummyTokenEndpoint, TokenEndpoint, TokenResponse,
    CLIENT_ASSERTION_TYPE, GRANT_TYPE,
};

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Errors from signing, verifying or exchanging tokens
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token payload must carry an \"iss\" claim")]
    MissingIssuer,

    #[error("Token payload must be an object, got {0}")]
    Payload(&'static str),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Unsupported token algorithm: {0}")]
    Algorithm(String),

    #[error("Token signature does not verify")]
    Signature,

    #[error("Invalid signing key: {0}")]
    Key(String),

    #[error("Unsupported grant: {0}")]
    Grant(String),

    #[error("Token JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Byte length of generated signing secrets
pub const SECRET_LEN: usize = 32;

/// Ephemeral signing keys, generated in memory
#[derive(Clone, PartialEq, Eq)]
pub struct OauthKeys {
    secret: Vec<u8>,
}

impl OauthKeys {
    pub fn generate() -> Self {
        let mut secret = vec![0u8; SECRET_LEN];
        fastrand::fill(&mut secret);
        Self { secret }
    }

    pub fn from_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Short fingerprint used as the `kid` header
    pub fn id(&self) -> String {
        hex::encode(&Sha256::digest(&self.secret)[..8])
    }
}

impl std::fmt::Debug for OauthKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OauthKeys").field("id", &self.id()).finish()
    }
}

/// Issues bearer tokens, caching its keys between calls
#[derive(Debug, Default)]
pub struct TokenHelper {
    keys: Option<OauthKeys>,
}

impl TokenHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current keys; generated on first use or when `fresh` is set
    pub fn oauth_keys(&mut self, fresh: bool) -> &OauthKeys {
        if fresh || self.keys.is_none() {
            debug!(fresh, "generating oauth keys");
            self.keys = Some(OauthKeys::generate());
        }
        self.keys.get_or_insert_with(OauthKeys::generate)
    }

    /// Exchange a signed `payload` for a token carrying `scopes`.
    ///
    /// Returns `"<token_type> <access_token>"`, ready for an `Authorization`
    /// header.
    pub fn generate_oauth_token<S: AsRef<str>>(
        &mut self,
        payload: &Value,
        scopes: &[S],
        endpoint: &dyn TokenEndpoint,
    ) -> Result<String, TokenError> {
        let claims = claims_of(payload)?;
        let issuer = issuer_of(claims)?.to_string();

        let keys = self.oauth_keys(false).clone();
        let credentials = ClientCredentials::new(jwt::encode(claims, &keys)?, scopes);
        debug!(iss = %issuer, scope = %credentials.scope, "requesting oauth token");

        let response = endpoint.issue(&credentials, &keys)?;
        Ok(format!("{} {}", response.token_type, response.access_token))
    }
}

fn claims_of(payload: &Value) -> Result<&Map<String, Value>, TokenError> {
    match payload {
        Value::Object(claims) => Ok(claims),
        other => Err(TokenError::Payload(crate::json::type_name(other))),
    }
}

fn issuer_of(claims: &Map<String, Value>) -> Result<&str, TokenError> {
    match claims.get("iss") {
        Some(Value::String(iss)) if !iss.is_empty() => Ok(iss),
        _ => Err(TokenError::MissingIssuer),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
