// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Compact HS256 JSON Web Tokens.

use super::{OauthKeys, TokenError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
}

/// Sign `claims` with `keys`
pub fn encode(claims: &Map<String, Value>, keys: &OauthKeys) -> Result<String, TokenError> {
    let header = Header {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
        kid: Some(keys.id()),
    };
    let input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?)
    );
    let signature = sign(input.as_bytes(), keys)?.finalize().into_bytes();
    Ok(format!("{}.{}", input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify `token` against `keys` and return its claims
pub fn decode(token: &str, keys: &OauthKeys) -> Result<Map<String, Value>, TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(claims), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed("expected three segments".to_string()));
    };

    let header: Header = serde_json::from_slice(&decode_segment(header)?)?;
    if header.alg != ALGORITHM {
        return Err(TokenError::Algorithm(header.alg));
    }

    sign(signing_input(token).as_bytes(), keys)?
        .verify_slice(&decode_segment(signature)?)
        .map_err(|_| TokenError::Signature)?;

    match serde_json::from_slice(&decode_segment(claims)?)? {
        Value::Object(claims) => Ok(claims),
        _ => Err(TokenError::Malformed("claims are not an object".to_string())),
    }
}

fn sign(input: &[u8], keys: &OauthKeys) -> Result<HmacSha256, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(keys.secret()).map_err(|e| TokenError::Key(e.to_string()))?;
    mac.update(input);
    Ok(mac)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(format!("bad base64url segment: {}", e)))
}

// `header.claims` of `header.claims.signature`
fn signing_input(token: &str) -> &str {
    token.rsplit_once('.').map_or(token, |(prefix, _)| prefix)
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
