// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OIDC id-token claims.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims of an OIDC id token that carries an email.
///
/// Google and similar providers put the account email in `email`; that is
/// the only claim required here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OidcClaims {
    pub email: String,

    #[serde(default)]
    pub email_verified: Option<bool>,

    /// Subject (provider user id)
    #[serde(default)]
    pub sub: Option<String>,

    #[serde(default)]
    pub iss: Option<String>,

    /// Audience; a string or an array depending on the provider
    #[serde(default)]
    pub aud: Option<Value>,

    #[serde(default)]
    pub exp: Option<i64>,

    #[serde(default)]
    pub iat: Option<i64>,

    #[serde(default)]
    pub name: Option<String>,

    /// Remaining provider-specific claims
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Decode a JWT payload without verifying its signature.
///
/// Returns `None` for malformed tokens and for tokens without an `email`
/// claim. The token is only used to prefill the user's email; Turnkey
/// verifies it during OAuth login.
pub fn decode_jwt(token: &str) -> Option<OidcClaims> {
    let data = jsonwebtoken::dangerous::insecure_decode::<Value>(token).ok()?;
    if !data.claims.get("email").is_some_and(Value::is_string) {
        return None;
    }
    serde_json::from_value(data.claims).ok()
}

#[cfg(test)]
pub(crate) fn create_test_jwt(claims: &Value) -> String {
    use base64ct::{Base64UrlUnpadded, Encoding};

    let header = r#"{"alg":"RS256","typ":"JWT"}"#;
    let header_b64 = Base64UrlUnpadded::encode_string(header.as_bytes());
    let claims_b64 = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
    format!("{header_b64}.{claims_b64}.fake_signature")
}
