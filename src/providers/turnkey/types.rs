// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Turnkey public API request and response shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// secp256k1 curve identifier.
pub const CURVE_SECP256K1: &str = "CURVE_SECP256K1";
/// P-256 API key curve identifier.
pub const API_KEY_CURVE_P256: &str = "API_KEY_CURVE_P256";
/// secp256k1 API key curve identifier.
pub const API_KEY_CURVE_SECP256K1: &str = "API_KEY_CURVE_SECP256K1";
/// BIP32 derivation path format.
pub const PATH_FORMAT_BIP32: &str = "PATH_FORMAT_BIP32";
/// Uncompressed public key address format; the "address" is the key itself.
pub const ADDRESS_FORMAT_UNCOMPRESSED: &str = "ADDRESS_FORMAT_UNCOMPRESSED";
/// Stacks BIP44 account path.
pub const STACKS_DERIVATION_PATH: &str = "m/44'/5'/0'/0/0";

/// Activity lifecycle as reported by Turnkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    #[serde(rename = "ACTIVITY_STATUS_CREATED")]
    Created,
    #[serde(rename = "ACTIVITY_STATUS_PENDING")]
    Pending,
    #[serde(rename = "ACTIVITY_STATUS_COMPLETED")]
    Completed,
    #[serde(rename = "ACTIVITY_STATUS_FAILED")]
    Failed,
    #[serde(rename = "ACTIVITY_STATUS_CONSENSUS_NEEDED")]
    ConsensusNeeded,
    #[serde(rename = "ACTIVITY_STATUS_REJECTED")]
    Rejected,
    #[serde(other)]
    Unknown,
}

impl ActivityStatus {
    /// Still being processed; worth polling again.
    pub fn is_in_progress(self) -> bool {
        matches!(self, ActivityStatus::Created | ActivityStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: String,
    #[serde(default)]
    pub selection: Option<String>,
}

/// A submitted Turnkey activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub organization_id: String,
    pub status: ActivityStatus,
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Result object keyed by result kind, e.g. `createWalletResult`.
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub failure: Option<Value>,
}

impl Activity {
    /// Id of the user who cast the first vote.
    pub fn first_voter(&self) -> Option<&str> {
        self.votes.first().map(|v| v.user_id.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivityResponse {
    pub activity: Activity,
}

/// Passkey attestation produced by a WebAuthn registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub credential_id: String,
    pub client_data_json: String,
    pub attestation_object: String,
    #[serde(default)]
    pub transports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorParams {
    pub authenticator_name: String,
    pub challenge: String,
    pub attestation: Attestation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyParams {
    pub api_key_name: String,
    pub public_key: String,
    pub curve_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthProviderParams {
    pub provider_name: String,
    pub oidc_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootUserParams {
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub api_keys: Vec<ApiKeyParams>,
    pub authenticators: Vec<AuthenticatorParams>,
    pub oauth_providers: Vec<OauthProviderParams>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccountParams {
    pub curve: String,
    pub path_format: String,
    pub path: String,
    pub address_format: String,
}

impl WalletAccountParams {
    /// secp256k1 account on the Stacks path, exposing the raw public key.
    pub fn stacks() -> Self {
        Self {
            curve: CURVE_SECP256K1.to_string(),
            path_format: PATH_FORMAT_BIP32.to_string(),
            path: STACKS_DERIVATION_PATH.to_string(),
            address_format: ADDRESS_FORMAT_UNCOMPRESSED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletParams {
    pub wallet_name: String,
    pub accounts: Vec<WalletAccountParams>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubOrganizationParams {
    pub sub_organization_name: String,
    pub root_users: Vec<RootUserParams>,
    pub root_quorum_threshold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<WalletParams>,
}

/// Wallet created alongside a sub-organization or on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWallet {
    pub wallet_id: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubOrganizationResult {
    pub sub_organization_id: String,
    #[serde(default)]
    pub wallet: Option<CreatedWallet>,
    #[serde(default)]
    pub root_user_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateKeyParams {
    pub private_key_name: String,
    pub curve: String,
    #[serde(default)]
    pub private_key_tags: Vec<String>,
    #[serde(default)]
    pub address_formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateKeyAddress {
    pub format: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPrivateKey {
    pub private_key_id: String,
    #[serde(default)]
    pub addresses: Vec<PrivateKeyAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrivateKeysResult {
    pub private_keys: Vec<CreatedPrivateKey>,
}

/// ECDSA components of a raw-payload signature, hex without `0x`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRawPayloadResult {
    pub r: String,
    pub s: String,
    pub v: String,
}

/// Branding for OTP emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailCustomization {
    pub app_name: String,
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    pub address: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub curve: Option<String>,
    #[serde(default)]
    pub address_format: Option<String>,
    #[serde(default)]
    pub wallet_id: Option<String>,
}

/// Sub-organization lookup filter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubOrgFilterType {
    Email,
    PublicKey,
    Username,
    OidcToken,
}

impl SubOrgFilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            SubOrgFilterType::Email => "EMAIL",
            SubOrgFilterType::PublicKey => "PUBLIC_KEY",
            SubOrgFilterType::Username => "USERNAME",
            SubOrgFilterType::OidcToken => "OIDC_TOKEN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn activity_parses_status_and_votes() {
        let activity: Activity = serde_json::from_value(json!({
            "id": "act-1",
            "organizationId": "org-1",
            "status": "ACTIVITY_STATUS_COMPLETED",
            "type": "ACTIVITY_TYPE_OAUTH_LOGIN",
            "result": { "oauthLoginResult": { "session": "jwt" } },
            "votes": [{ "userId": "user-1", "selection": "VOTE_SELECTION_APPROVED" }],
            "fingerprint": "ignored"
        }))
        .unwrap();

        assert_eq!(activity.status, ActivityStatus::Completed);
        assert_eq!(activity.first_voter(), Some("user-1"));
        assert_eq!(activity.activity_type, "ACTIVITY_TYPE_OAUTH_LOGIN");
    }

    #[test]
    fn unknown_status_does_not_fail_parsing() {
        let status: ActivityStatus = serde_json::from_value(json!("ACTIVITY_STATUS_NEW")).unwrap();
        assert_eq!(status, ActivityStatus::Unknown);
        assert!(!status.is_in_progress());
        assert!(ActivityStatus::Pending.is_in_progress());
    }

    #[test]
    fn sub_org_params_use_camel_case() {
        let params = CreateSubOrganizationParams {
            sub_organization_name: "Sub Org - a@b.c".to_string(),
            root_users: vec![RootUserParams {
                user_name: "a".to_string(),
                user_email: None,
                api_keys: vec![],
                authenticators: vec![],
                oauth_providers: vec![],
            }],
            root_quorum_threshold: 1,
            wallet: Some(WalletParams {
                wallet_name: "Default Wallet".to_string(),
                accounts: vec![WalletAccountParams::stacks()],
            }),
        };
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(value["subOrganizationName"], "Sub Org - a@b.c");
        assert_eq!(value["rootQuorumThreshold"], 1);
        assert!(value["rootUsers"][0].get("userEmail").is_none());
        assert_eq!(value["wallet"]["accounts"][0]["path"], "m/44'/5'/0'/0/0");
        assert_eq!(
            value["wallet"]["accounts"][0]["addressFormat"],
            ADDRESS_FORMAT_UNCOMPRESSED
        );
    }

    #[test]
    fn filter_types_match_api_names() {
        assert_eq!(SubOrgFilterType::Email.as_str(), "EMAIL");
        assert_eq!(SubOrgFilterType::OidcToken.as_str(), "OIDC_TOKEN");
    }
}
