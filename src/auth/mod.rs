// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! User onboarding and login against Turnkey sub-organizations.
//!
//! ## Auth Flows
//!
//! 1. Sign-up creates a sub-organization under the parent organization with
//!    one root user (passkey, OAuth provider and/or wallet API key) and a
//!    default Stacks wallet.
//! 2. OAuth login exchanges an OIDC token for a session in the sub-org.
//! 3. Email login sends an OTP, verifies it, and exchanges the verification
//!    token for a session.
//!
//! Sub-organizations are found by email, public key, username or OIDC token.

pub mod claims;
pub mod types;

use serde_json::Value;
use tracing::{info, warn};

use crate::blockchain::public_key_to_address;
use crate::client::StacksTurnkey;
use crate::error::{SdkError, SdkResult};
use crate::providers::turnkey::{
    ApiKeyParams, AuthenticatorParams, CreateSubOrganizationParams, EmailCustomization,
    RootUserParams, WalletAccountParams, WalletParams, API_KEY_CURVE_SECP256K1, CURVE_SECP256K1,
};

pub use claims::{decode_jwt, OidcClaims};
pub use types::*;

const PASSKEY_AUTHENTICATOR_NAME: &str = "Passkey";
const WALLET_API_KEY_NAME: &str = "Wallet Auth - Embedded Wallet";
const DEFAULT_WALLET_NAME: &str = "Default Wallet";
const OTP_APP_NAME: &str = "Stacks Embed";
const OTP_LOGO_URL: &str = "https://turnkey.com/logo.png";

/// `{base_url}/email-{action}?...&credentialBundle=%s`; Turnkey substitutes `%s`.
pub fn magic_link_template(params: &MagicLinkParams) -> String {
    format!(
        "{}/email-{}?userEmail={}&continueWith={}&publicKey={}&credentialBundle=%s",
        params.base_url, params.action, params.email, params.method, params.public_key
    )
}

/// Local part of an email, or the whole input when it has none.
fn user_name_from_email(email: &str) -> &str {
    match email.split('@').next() {
        Some(local) if !local.is_empty() => local,
        _ => email,
    }
}

impl StacksTurnkey {
    /// Stacks address of a Turnkey secp256k1 account on the current network.
    ///
    /// Turnkey accounts created with the uncompressed address format expose
    /// the public key as their address.
    pub fn derive_stacks_address_from_turnkey_address(
        &self,
        turnkey_wallet_address: &str,
    ) -> SdkResult<String> {
        Ok(public_key_to_address(turnkey_wallet_address, self.network())?)
    }

    pub fn decode_jwt(&self, credential: &str) -> Option<OidcClaims> {
        decode_jwt(credential)
    }

    /// Create a sub-organization for a new user.
    pub async fn create_user_sub_org(
        &self,
        params: CreateUserSubOrgParams,
    ) -> SdkResult<UserSubOrg> {
        let authenticators = params
            .passkey
            .map(|passkey| AuthenticatorParams {
                authenticator_name: PASSKEY_AUTHENTICATOR_NAME.to_string(),
                challenge: passkey.challenge,
                attestation: passkey.attestation,
            })
            .into_iter()
            .collect();

        let api_keys = params
            .wallet
            .map(|wallet| ApiKeyParams {
                api_key_name: WALLET_API_KEY_NAME.to_string(),
                public_key: wallet.public_key,
                curve_type: API_KEY_CURVE_SECP256K1.to_string(),
            })
            .into_iter()
            .collect();

        let oidc_email = params
            .oauth
            .as_ref()
            .and_then(|oauth| decode_jwt(&oauth.oidc_token))
            .map(|claims| claims.email);
        // naming follows the typed email; the stored user email prefers the provider's
        let email = params
            .email
            .clone()
            .or_else(|| oidc_email.clone())
            .unwrap_or_default();
        let user_email = oidc_email.or(params.email);

        let oauth_providers = params.oauth.into_iter().collect();

        let request = CreateSubOrganizationParams {
            sub_organization_name: format!("Sub Org - {email}"),
            root_users: vec![RootUserParams {
                user_name: user_name_from_email(&email).to_string(),
                user_email: user_email.clone(),
                api_keys,
                authenticators,
                oauth_providers,
            }],
            root_quorum_threshold: 1,
            wallet: Some(WalletParams {
                wallet_name: DEFAULT_WALLET_NAME.to_string(),
                accounts: vec![WalletAccountParams::stacks()],
            }),
        };

        let sub_org = self.turnkey().create_sub_organization(&request).await?;
        let user_id = sub_org
            .root_user_ids
            .first()
            .ok_or(SdkError::MissingRootUser)?;
        let user = self
            .turnkey()
            .get_user(&sub_org.sub_organization_id, user_id)
            .await?;

        info!(
            sub_org_id = %sub_org.sub_organization_id,
            user_id = %user_id,
            "Created user sub-organization"
        );

        Ok(UserSubOrg { sub_org, user })
    }

    /// Log in with an OIDC token.
    pub async fn oauth(&self, params: OauthLoginParams) -> SdkResult<LoginSession> {
        let login = self
            .turnkey()
            .oauth_login(&params.sub_org_id, &params.credential, &params.public_key)
            .await?;

        Ok(LoginSession {
            user_id: login.activity.first_voter().map(str::to_string),
            session: login.session,
            organization_id: params.sub_org_id,
        })
    }

    pub fn get_magic_link_template(&self, params: &MagicLinkParams) -> String {
        magic_link_template(params)
    }

    /// Send an email OTP, creating the user's sub-organization first if needed.
    pub async fn init_email_auth(&self, params: InitEmailAuthParams) -> SdkResult<EmailAuthInit> {
        let organization_id = match self.get_sub_org_id_by_email(&params.email).await? {
            Some(id) => id,
            None => {
                info!("No sub-organization for email, creating one");
                let created = self
                    .create_user_sub_org(CreateUserSubOrgParams {
                        email: Some(params.email.clone()),
                        ..Default::default()
                    })
                    .await?;
                created.sub_org.sub_organization_id
            }
        };

        let template = params.base_url.map(|base_url| {
            magic_link_template(&MagicLinkParams {
                action: "auth".to_string(),
                email: params.email.clone(),
                method: "email".to_string(),
                public_key: params.target_public_key.clone(),
                base_url,
            })
        });

        let otp_id = self
            .turnkey()
            .init_email_otp(
                &params.email,
                &params.target_public_key,
                &EmailCustomization {
                    app_name: OTP_APP_NAME.to_string(),
                    logo_url: OTP_LOGO_URL.to_string(),
                },
            )
            .await?;

        Ok(EmailAuthInit {
            otp_id,
            organization_id,
            magic_link_template: template,
        })
    }

    /// Check an OTP code; returns the verification token.
    pub async fn verify_otp(&self, params: VerifyOtpParams) -> SdkResult<String> {
        Ok(self
            .turnkey()
            .verify_otp(&params.otp_id, &params.otp_code)
            .await?)
    }

    pub async fn otp_login(&self, params: OtpLoginParams) -> SdkResult<LoginSession> {
        let filter = SubOrgFilter::Email(params.email);
        let sub_org_id = self
            .get_sub_org_id(&filter)
            .await?
            .ok_or_else(|| SdkError::SubOrgNotFound(filter.kind().to_string()))?;

        let login = self
            .turnkey()
            .otp_login(&sub_org_id, &params.verification_token, &params.public_key)
            .await?;

        Ok(LoginSession {
            user_id: login.activity.first_voter().map(str::to_string),
            session: login.session,
            organization_id: sub_org_id,
        })
    }

    /// First sub-organization matching `filter`, if any.
    pub async fn get_sub_org_id(&self, filter: &SubOrgFilter) -> SdkResult<Option<String>> {
        let ids = self
            .turnkey()
            .get_sub_org_ids(filter.filter_type(), filter.value())
            .await?;
        Ok(ids.into_iter().next())
    }

    pub async fn get_sub_org_id_by_email(&self, email: &str) -> SdkResult<Option<String>> {
        self.get_sub_org_id(&SubOrgFilter::Email(email.to_string()))
            .await
    }

    pub async fn get_sub_org_id_by_public_key(
        &self,
        public_key: &str,
    ) -> SdkResult<Option<String>> {
        self.get_sub_org_id(&SubOrgFilter::PublicKey(public_key.to_string()))
            .await
    }

    pub async fn get_sub_org_id_by_username(&self, username: &str) -> SdkResult<Option<String>> {
        self.get_sub_org_id(&SubOrgFilter::Username(username.to_string()))
            .await
    }

    pub async fn get_user(&self, user_id: &str, sub_org_id: &str) -> SdkResult<Value> {
        Ok(self.turnkey().get_user(sub_org_id, user_id).await?)
    }

    /// Wallet and its accounts, with secp256k1 account addresses replaced by
    /// Stacks addresses.
    pub async fn get_wallet(
        &self,
        wallet_id: &str,
        sub_org_id: &str,
    ) -> SdkResult<WalletWithAccounts> {
        let wallet = self.turnkey().get_wallet(sub_org_id, wallet_id).await?;
        let mut accounts = self
            .turnkey()
            .get_wallet_accounts(sub_org_id, wallet_id)
            .await?;

        for account in &mut accounts {
            let is_secp256k1 = account
                .get("curve")
                .and_then(Value::as_str)
                .is_none_or(|curve| curve == CURVE_SECP256K1);
            let Some(public_key) = account.get("address").and_then(Value::as_str) else {
                continue;
            };
            if !is_secp256k1 {
                continue;
            }
            match public_key_to_address(public_key, self.network()) {
                Ok(address) => account["address"] = Value::String(address),
                Err(e) => warn!(
                    wallet_id = %wallet_id,
                    error = %e,
                    "Account address is not a secp256k1 public key"
                ),
            }
        }

        Ok(WalletWithAccounts { wallet, accounts })
    }

    pub async fn get_authenticators(
        &self,
        user_id: &str,
        sub_org_id: &str,
    ) -> SdkResult<Vec<Value>> {
        Ok(self
            .turnkey()
            .get_authenticators(sub_org_id, user_id)
            .await?)
    }

    pub async fn get_authenticator(
        &self,
        authenticator_id: &str,
        sub_org_id: &str,
    ) -> SdkResult<Value> {
        Ok(self
            .turnkey()
            .get_authenticator(sub_org_id, authenticator_id)
            .await?)
    }
}
