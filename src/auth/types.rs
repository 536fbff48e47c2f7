// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Parameters and results of the auth operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::providers::turnkey::{
    Attestation, CreateSubOrganizationResult, OauthProviderParams, SubOrgFilterType,
};

/// How to find a user's sub-organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubOrgFilter {
    Email(String),
    PublicKey(String),
    Username(String),
    OidcToken(String),
}

impl SubOrgFilter {
    pub fn filter_type(&self) -> SubOrgFilterType {
        match self {
            SubOrgFilter::Email(_) => SubOrgFilterType::Email,
            SubOrgFilter::PublicKey(_) => SubOrgFilterType::PublicKey,
            SubOrgFilter::Username(_) => SubOrgFilterType::Username,
            SubOrgFilter::OidcToken(_) => SubOrgFilterType::OidcToken,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SubOrgFilter::Email(v)
            | SubOrgFilter::PublicKey(v)
            | SubOrgFilter::Username(v)
            | SubOrgFilter::OidcToken(v) => v,
        }
    }

    /// Lower-case name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SubOrgFilter::Email(_) => "email",
            SubOrgFilter::PublicKey(_) => "public key",
            SubOrgFilter::Username(_) => "username",
            SubOrgFilter::OidcToken(_) => "OIDC token",
        }
    }
}

/// WebAuthn registration to attach as the user's passkey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyParams {
    pub challenge: String,
    pub attestation: Attestation,
}

/// External wallet key that may authenticate as the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAuthParams {
    /// secp256k1 public key, hex.
    pub public_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserSubOrgParams {
    pub email: Option<String>,
    pub passkey: Option<PasskeyParams>,
    pub oauth: Option<OauthProviderParams>,
    pub wallet: Option<WalletAuthParams>,
}

/// New sub-organization together with its root user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubOrg {
    pub sub_org: CreateSubOrganizationResult,
    pub user: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthLoginParams {
    /// OIDC id token.
    pub credential: String,
    /// Public key the session is issued to.
    pub public_key: String,
    pub sub_org_id: String,
}

/// Session issued by an OAuth or OTP login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSession {
    /// First voter on the login activity.
    pub user_id: Option<String>,
    /// Session JWT.
    pub session: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkParams {
    pub action: String,
    pub email: String,
    pub method: String,
    pub public_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitEmailAuthParams {
    pub email: String,
    pub target_public_key: String,
    /// Enables the magic link template in the result.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAuthInit {
    pub otp_id: String,
    pub organization_id: String,
    pub magic_link_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpParams {
    pub otp_id: String,
    pub otp_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpLoginParams {
    pub public_key: String,
    pub verification_token: String,
    pub email: String,
}

/// Wallet with its accounts; secp256k1 account addresses are Stacks addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletWithAccounts {
    pub wallet: Value,
    pub accounts: Vec<Value>,
}
