// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Turnkey custody API integration.
//!
//! Every call is a stamped JSON POST. Reads go to `/public/v1/query/*`;
//! writes are activities submitted to `/public/v1/submit/*`, which may need
//! polling until Turnkey finishes them.

pub mod stamp;
pub mod types;

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Client};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub use stamp::ApiKeyStamper;
pub use types::*;

use types::ActivityResponse;

/// Default Turnkey API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.turnkey.com";

const ACTIVITY_CREATE_SUB_ORGANIZATION: &str = "ACTIVITY_TYPE_CREATE_SUB_ORGANIZATION_V7";
const ACTIVITY_CREATE_PRIVATE_KEYS: &str = "ACTIVITY_TYPE_CREATE_PRIVATE_KEYS_V2";
const ACTIVITY_CREATE_WALLET: &str = "ACTIVITY_TYPE_CREATE_WALLET";
const ACTIVITY_SIGN_RAW_PAYLOAD: &str = "ACTIVITY_TYPE_SIGN_RAW_PAYLOAD_V2";
const ACTIVITY_OAUTH_LOGIN: &str = "ACTIVITY_TYPE_OAUTH_LOGIN";
const ACTIVITY_INIT_OTP: &str = "ACTIVITY_TYPE_INIT_OTP";
const ACTIVITY_VERIFY_OTP: &str = "ACTIVITY_TYPE_VERIFY_OTP";
const ACTIVITY_OTP_LOGIN: &str = "ACTIVITY_TYPE_OTP_LOGIN";

const PAYLOAD_ENCODING_HEXADECIMAL: &str = "PAYLOAD_ENCODING_HEXADECIMAL";
const HASH_FUNCTION_NO_OP: &str = "HASH_FUNCTION_NO_OP";
const OTP_TYPE_EMAIL: &str = "OTP_TYPE_EMAIL";

#[derive(Debug, thiserror::Error)]
pub enum TurnkeyError {
    #[error("Turnkey configuration missing: {0}")]
    MissingConfig(String),

    #[error("Turnkey API key is invalid: {0}")]
    InvalidApiKey(String),

    #[error("Turnkey stamping failed: {0}")]
    Signing(String),

    #[error("Turnkey request failed: {0}")]
    Request(String),

    #[error("Turnkey response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Turnkey activity {id} ended with {status:?}: {reason}")]
    ActivityFailed {
        id: String,
        status: ActivityStatus,
        reason: String,
    },

    #[error("Turnkey activity {id} still pending after {attempts} polls")]
    ActivityTimeout { id: String, attempts: u32 },
}

/// How long to wait for an activity that is not immediately completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityPolling {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ActivityPolling {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}

/// A login activity together with the session it issued.
#[derive(Debug, Clone)]
pub struct SessionActivity {
    pub activity: Activity,
    /// Session JWT.
    pub session: String,
}

/// Stamped client for the Turnkey public API.
#[derive(Debug, Clone)]
pub struct TurnkeyClient {
    base_url: String,
    organization_id: String,
    stamper: ApiKeyStamper,
    polling: ActivityPolling,
    http: Client,
}

impl TurnkeyClient {
    pub fn new(
        base_url: &str,
        organization_id: &str,
        stamper: ApiKeyStamper,
        polling: ActivityPolling,
        http: Client,
    ) -> Result<Self, TurnkeyError> {
        let url: url::Url = base_url
            .parse()
            .map_err(|e: url::ParseError| TurnkeyError::MissingConfig(format!("base URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TurnkeyError::MissingConfig(format!(
                "base URL has unsupported scheme `{}`",
                url.scheme()
            )));
        }
        if organization_id.trim().is_empty() {
            return Err(TurnkeyError::MissingConfig("organization id".to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            organization_id: organization_id.trim().to_string(),
            stamper,
            polling,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parent organization that owns the API key.
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn api_public_key(&self) -> &str {
        self.stamper.public_key()
    }

    // ---------------------------------------------------------------------
    // Activities
    // ---------------------------------------------------------------------

    pub async fn create_sub_organization(
        &self,
        params: &CreateSubOrganizationParams,
    ) -> Result<CreateSubOrganizationResult, TurnkeyError> {
        let parameters = to_parameters(params)?;
        let activity = self
            .submit(
                "create_sub_organization",
                ACTIVITY_CREATE_SUB_ORGANIZATION,
                &self.organization_id,
                parameters,
            )
            .await?;
        activity_result(&activity, "createSubOrganizationResultV7")
    }

    pub async fn create_private_keys(
        &self,
        organization_id: &str,
        private_keys: &[PrivateKeyParams],
    ) -> Result<CreatePrivateKeysResult, TurnkeyError> {
        let activity = self
            .submit(
                "create_private_keys",
                ACTIVITY_CREATE_PRIVATE_KEYS,
                organization_id,
                json!({ "privateKeys": private_keys }),
            )
            .await?;
        activity_result(&activity, "createPrivateKeysResultV2")
    }

    pub async fn create_wallet(
        &self,
        organization_id: &str,
        params: &WalletParams,
    ) -> Result<CreatedWallet, TurnkeyError> {
        let parameters = to_parameters(params)?;
        let activity = self
            .submit(
                "create_wallet",
                ACTIVITY_CREATE_WALLET,
                organization_id,
                parameters,
            )
            .await?;
        activity_result(&activity, "createWalletResult")
    }

    /// Sign a hex payload as is: no hashing on Turnkey's side.
    pub async fn sign_raw_payload(
        &self,
        organization_id: &str,
        sign_with: &str,
        payload: &str,
    ) -> Result<SignRawPayloadResult, TurnkeyError> {
        let activity = self
            .submit(
                "sign_raw_payload",
                ACTIVITY_SIGN_RAW_PAYLOAD,
                organization_id,
                json!({
                    "signWith": sign_with,
                    "payload": payload,
                    "encoding": PAYLOAD_ENCODING_HEXADECIMAL,
                    "hashFunction": HASH_FUNCTION_NO_OP,
                }),
            )
            .await?;
        activity_result(&activity, "signRawPayloadResult")
    }

    pub async fn oauth_login(
        &self,
        organization_id: &str,
        oidc_token: &str,
        public_key: &str,
    ) -> Result<SessionActivity, TurnkeyError> {
        let activity = self
            .submit(
                "oauth_login",
                ACTIVITY_OAUTH_LOGIN,
                organization_id,
                json!({ "oidcToken": oidc_token, "publicKey": public_key }),
            )
            .await?;
        let session = activity_field(&activity, "oauthLoginResult", "session")?;
        Ok(SessionActivity { activity, session })
    }

    /// Send an email OTP; returns the OTP id.
    pub async fn init_email_otp(
        &self,
        contact: &str,
        user_identifier: &str,
        customization: &EmailCustomization,
    ) -> Result<String, TurnkeyError> {
        let activity = self
            .submit(
                "init_otp",
                ACTIVITY_INIT_OTP,
                &self.organization_id,
                json!({
                    "otpType": OTP_TYPE_EMAIL,
                    "contact": contact,
                    "userIdentifier": user_identifier,
                    "emailCustomization": customization,
                }),
            )
            .await?;
        activity_field(&activity, "initOtpResult", "otpId")
    }

    /// Check an OTP code; returns the verification token.
    pub async fn verify_otp(&self, otp_id: &str, otp_code: &str) -> Result<String, TurnkeyError> {
        let activity = self
            .submit(
                "verify_otp",
                ACTIVITY_VERIFY_OTP,
                &self.organization_id,
                json!({ "otpId": otp_id, "otpCode": otp_code }),
            )
            .await?;
        activity_field(&activity, "verifyOtpResult", "verificationToken")
    }

    pub async fn otp_login(
        &self,
        organization_id: &str,
        verification_token: &str,
        public_key: &str,
    ) -> Result<SessionActivity, TurnkeyError> {
        let activity = self
            .submit(
                "otp_login",
                ACTIVITY_OTP_LOGIN,
                organization_id,
                json!({ "verificationToken": verification_token, "publicKey": public_key }),
            )
            .await?;
        let session = activity_field(&activity, "otpLoginResult", "session")?;
        Ok(SessionActivity { activity, session })
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Sub-organizations of the parent organization matching a filter.
    pub async fn get_sub_org_ids(
        &self,
        filter_type: SubOrgFilterType,
        filter_value: &str,
    ) -> Result<Vec<String>, TurnkeyError> {
        let response = self
            .query(
                "list_suborgs",
                &json!({
                    "organizationId": self.organization_id,
                    "filterType": filter_type.as_str(),
                    "filterValue": filter_value,
                }),
            )
            .await?;
        field(&response, "organizationIds")
    }

    pub async fn get_user(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<Value, TurnkeyError> {
        let response = self
            .query(
                "get_user",
                &json!({ "organizationId": organization_id, "userId": user_id }),
            )
            .await?;
        field(&response, "user")
    }

    pub async fn get_wallet(
        &self,
        organization_id: &str,
        wallet_id: &str,
    ) -> Result<Value, TurnkeyError> {
        let response = self
            .query(
                "get_wallet",
                &json!({ "organizationId": organization_id, "walletId": wallet_id }),
            )
            .await?;
        field(&response, "wallet")
    }

    pub async fn get_wallet_accounts(
        &self,
        organization_id: &str,
        wallet_id: &str,
    ) -> Result<Vec<Value>, TurnkeyError> {
        let response = self
            .query(
                "list_wallet_accounts",
                &json!({ "organizationId": organization_id, "walletId": wallet_id }),
            )
            .await?;
        field(&response, "accounts")
    }

    pub async fn get_authenticators(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<Vec<Value>, TurnkeyError> {
        let response = self
            .query(
                "get_authenticators",
                &json!({ "organizationId": organization_id, "userId": user_id }),
            )
            .await?;
        field(&response, "authenticators")
    }

    pub async fn get_authenticator(
        &self,
        organization_id: &str,
        authenticator_id: &str,
    ) -> Result<Value, TurnkeyError> {
        let response = self
            .query(
                "get_authenticator",
                &json!({ "organizationId": organization_id, "authenticatorId": authenticator_id }),
            )
            .await?;
        field(&response, "authenticator")
    }

    pub async fn get_activity(
        &self,
        organization_id: &str,
        activity_id: &str,
    ) -> Result<Activity, TurnkeyError> {
        let response: ActivityResponse = self
            .query(
                "get_activity",
                &json!({ "organizationId": organization_id, "activityId": activity_id }),
            )
            .await?;
        Ok(response.activity)
    }

    // ---------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------

    async fn query<T: DeserializeOwned>(
        &self,
        op: &str,
        payload: &Value,
    ) -> Result<T, TurnkeyError> {
        let response = self
            .stamped_post_json(&format!("/public/v1/query/{op}"), payload)
            .await?;
        serde_json::from_value(response)
            .map_err(|e| TurnkeyError::InvalidResponse(format!("{op}: {e}")))
    }

    /// Submit an activity and wait until it leaves the in-progress states.
    async fn submit(
        &self,
        op: &str,
        activity_type: &str,
        organization_id: &str,
        parameters: Value,
    ) -> Result<Activity, TurnkeyError> {
        let payload = json!({
            "type": activity_type,
            "timestampMs": chrono::Utc::now().timestamp_millis().to_string(),
            "organizationId": organization_id,
            "parameters": parameters,
        });

        let response = self
            .stamped_post_json(&format!("/public/v1/submit/{op}"), &payload)
            .await?;
        let ActivityResponse { activity } = serde_json::from_value(response)
            .map_err(|e| TurnkeyError::InvalidResponse(format!("{op}: {e}")))?;

        info!(
            activity_id = %activity.id,
            activity_type = %activity_type,
            status = ?activity.status,
            "Turnkey activity submitted"
        );

        self.await_activity(activity).await
    }

    async fn await_activity(&self, mut activity: Activity) -> Result<Activity, TurnkeyError> {
        let mut polls = 0;
        while activity.status.is_in_progress() {
            if polls >= self.polling.attempts {
                warn!(activity_id = %activity.id, polls, "Turnkey activity did not complete");
                return Err(TurnkeyError::ActivityTimeout {
                    id: activity.id,
                    attempts: polls,
                });
            }
            tokio::time::sleep(self.polling.interval).await;
            polls += 1;
            activity = self
                .get_activity(&activity.organization_id, &activity.id)
                .await?;
            debug!(
                activity_id = %activity.id,
                status = ?activity.status,
                polls,
                "Polled Turnkey activity"
            );
        }

        match activity.status {
            ActivityStatus::Completed => Ok(activity),
            status => Err(TurnkeyError::ActivityFailed {
                reason: activity
                    .failure
                    .as_ref()
                    .and_then(|f| f.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("no failure details")
                    .to_string(),
                id: activity.id,
                status,
            }),
        }
    }

    async fn stamped_post_json(&self, path: &str, payload: &Value) -> Result<Value, TurnkeyError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| TurnkeyError::Request(format!("serialize body failed: {e}")))?;
        let stamp = self.stamper.stamp(body.as_bytes())?;

        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(stamp::STAMP_HEADER, stamp)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TurnkeyError::Request(format!("POST {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TurnkeyError::Request(format!(
                "POST {path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TurnkeyError::InvalidResponse(format!("POST {path} invalid JSON: {e}")))
    }
}

fn to_parameters<T: serde::Serialize>(params: &T) -> Result<Value, TurnkeyError> {
    serde_json::to_value(params)
        .map_err(|e| TurnkeyError::Request(format!("serialize parameters failed: {e}")))
}

fn field<T: DeserializeOwned>(response: &Value, name: &str) -> Result<T, TurnkeyError> {
    let value = response
        .get(name)
        .ok_or_else(|| TurnkeyError::InvalidResponse(format!("missing `{name}` in response")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| TurnkeyError::InvalidResponse(format!("`{name}`: {e}")))
}

/// Deserialize `activity.result[key]`.
fn activity_result<T: DeserializeOwned>(activity: &Activity, key: &str) -> Result<T, TurnkeyError> {
    field(&activity.result, key)
}

fn activity_field(activity: &Activity, key: &str, name: &str) -> Result<String, TurnkeyError> {
    activity
        .result
        .get(key)
        .and_then(|r| r.get(name))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            TurnkeyError::InvalidResponse(format!("missing `{key}.{name}` in activity result"))
        })
}
