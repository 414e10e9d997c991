// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The `client_credentials` exchange and a storage-free endpoint serving it.

use super::{issuer_of, jwt, OauthKeys, TokenError};
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

pub const GRANT_TYPE: &str = "client_credentials";

pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Lifetime of issued access tokens, in seconds
pub const TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Form fields of a `client_credentials` token request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub grant_type: String,
    pub client_assertion_type: String,
    /// Comma-joined scopes
    pub scope: String,
    pub client_assertion: String,
}

impl ClientCredentials {
    pub fn new<S: AsRef<str>>(assertion: String, scopes: &[S]) -> Self {
        Self {
            grant_type: GRANT_TYPE.to_string(),
            client_assertion_type: CLIENT_ASSERTION_TYPE.to_string(),
            scope: scopes
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            client_assertion: assertion,
        }
    }

    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Field pairs in request order
    pub fn to_form(&self) -> Vec<(String, String)> {
        vec![
            ("grant_type".to_string(), self.grant_type.clone()),
            (
                "client_assertion_type".to_string(),
                self.client_assertion_type.clone(),
            ),
            ("scope".to_string(), self.scope.clone()),
            ("client_assertion".to_string(), self.client_assertion.clone()),
        ]
    }
}

/// Successful token response body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub expires_in: i64,
    pub access_token: String,
}

/// An authorization server
pub trait TokenEndpoint {
    /// Exchange `credentials` for a token; `keys` verify the assertion and sign
    /// the token
    fn issue(
        &self,
        credentials: &ClientCredentials,
        keys: &OauthKeys,
    ) -> Result<TokenResponse, TokenError>;
}

/// The client named by an assertion's issuer
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DummyClient {
    pub id: u64,
    pub name: String,
}

impl DummyClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 1,
            name: name.into(),
        }
    }

    pub fn confidential(&self) -> bool {
        true
    }
}

/// An issued token; its attributes are whatever the endpoint created it with
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DummyToken {
    pub id: u64,
    pub attributes: Map<String, Value>,
    pub client: DummyClient,
}

impl DummyToken {
    pub fn scopes(&self) -> Vec<String> {
        match self.attributes.get("scopes") {
            Some(Value::Array(scopes)) => scopes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Endpoint that trusts any assertion signed with the caller's keys
#[derive(Debug, Default)]
pub struct DummyTokenEndpoint {
    issued: Mutex<Vec<DummyToken>>,
}

impl DummyTokenEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens issued so far, oldest first
    pub fn tokens(&self) -> Vec<DummyToken> {
        self.issued.lock().clone()
    }
}

impl TokenEndpoint for DummyTokenEndpoint {
    fn issue(
        &self,
        credentials: &ClientCredentials,
        keys: &OauthKeys,
    ) -> Result<TokenResponse, TokenError> {
        if credentials.grant_type != GRANT_TYPE {
            return Err(TokenError::Grant(credentials.grant_type.clone()));
        }
        if credentials.client_assertion_type != CLIENT_ASSERTION_TYPE {
            return Err(TokenError::Grant(credentials.client_assertion_type.clone()));
        }

        let assertion = jwt::decode(&credentials.client_assertion, keys)?;
        let client = DummyClient::new(issuer_of(&assertion)?);

        let now = Utc::now();
        let expires_at = now + Duration::seconds(TOKEN_TTL_SECS);
        let token_id = Uuid::new_v4().simple().to_string();
        let scopes = credentials.scopes();

        let token = DummyToken {
            id: 1,
            attributes: object([
                ("id", json!(token_id)),
                ("user_id", Value::Null),
                ("client_id", json!(client.id)),
                ("name", Value::Null),
                ("scopes", json!(scopes)),
                ("revoked", json!(false)),
                ("expires_at", json!(expires_at.to_rfc3339())),
            ]),
            client: client.clone(),
        };

        let claims = object([
            ("aud", json!(client.id.to_string())),
            ("jti", json!(token_id)),
            ("iat", json!(now.timestamp())),
            ("nbf", json!(now.timestamp())),
            ("exp", json!(expires_at.timestamp())),
            ("sub", json!("")),
            ("scopes", json!(scopes)),
        ]);
        let access_token = jwt::encode(&claims, keys)?;

        debug!(client = %client.name, scopes = ?token.scopes(), "issued dummy token");
        self.issued.lock().push(token);

        Ok(TokenResponse {
            token_type: "Bearer".to_string(),
            expires_in: TOKEN_TTL_SECS,
            access_token,
        })
    }
}

fn object<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
