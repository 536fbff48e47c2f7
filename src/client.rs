// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SDK entry point.
//!
//! [`StacksTurnkey`] owns the configuration and the two HTTP clients. Auth
//! operations live in [`crate::auth`], wallet and transfer operations in
//! [`crate::transactions`]; both are implemented as methods on this type.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::blockchain::{HiroClient, Network};
use crate::config::SdkConfig;
use crate::error::{SdkError, SdkResult};
use crate::providers::{ApiKeyStamper, TurnkeyClient};
use crate::transactions::TransferPolicy;

/// Embedded Stacks wallet SDK backed by Turnkey.
#[derive(Debug, Clone)]
pub struct StacksTurnkey {
    config: SdkConfig,
    turnkey: TurnkeyClient,
    hiro: HiroClient,
    http: Client,
}

impl StacksTurnkey {
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SdkError::Request(format!("failed to build HTTP client: {e}")))?;

        let stamper = ApiKeyStamper::new(&config.api_public_key, &config.api_private_key)?;
        let turnkey = TurnkeyClient::new(
            &config.api_base_url,
            &config.default_organization_id,
            stamper,
            config.activity_polling(),
            http.clone(),
        )?;
        let hiro = HiroClient::for_network(
            config.network,
            config.stacks_api_url.as_deref(),
            http.clone(),
        )?;

        info!(
            name = %config.name(),
            network = %config.network,
            stacks_api = %hiro.base_url(),
            "Stacks Turnkey SDK initialized"
        );

        Ok(Self {
            config,
            turnkey,
            hiro,
            http,
        })
    }

    /// Build from environment variables, see [`crate::config`].
    pub fn from_env() -> SdkResult<Self> {
        Self::new(SdkConfig::from_env()?)
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn description(&self) -> &str {
        self.config.description()
    }

    /// Turnkey API base URL.
    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    pub fn api_private_key(&self) -> &str {
        &self.config.api_private_key
    }

    pub fn api_public_key(&self) -> &str {
        &self.config.api_public_key
    }

    pub fn default_organization_id(&self) -> &str {
        &self.config.default_organization_id
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    /// Switch networks. The Stacks API client follows unless an explicit
    /// API URL was configured.
    pub fn set_network(&mut self, network: Network) -> SdkResult<()> {
        self.hiro = HiroClient::for_network(
            network,
            self.config.stacks_api_url.as_deref(),
            self.http.clone(),
        )?;
        self.config.network = network;
        info!(network = %network, stacks_api = %self.hiro.base_url(), "Switched Stacks network");
        Ok(())
    }

    pub fn transfer_policy(&self) -> TransferPolicy {
        self.config.transfer_policy
    }

    pub fn set_transfer_policy(&mut self, policy: TransferPolicy) {
        self.config.transfer_policy = policy;
    }

    /// Turnkey custody client.
    pub fn turnkey(&self) -> &TurnkeyClient {
        &self.turnkey
    }

    /// Stacks chain client for the current network.
    pub fn hiro(&self) -> &HiroClient {
        &self.hiro
    }

    /// GET `url` and decode the JSON body.
    pub async fn invoke<T: DeserializeOwned>(&self, url: &str) -> SdkResult<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SdkError::Request(format!("GET {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SdkError::Http { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| SdkError::Request(format!("GET {url} invalid JSON: {e}")))
    }
}

/// SDK wired to mock Turnkey and Stacks API servers.
#[cfg(test)]
pub(crate) fn test_sdk(
    turnkey_url: &str,
    stacks_url: &str,
    policy: TransferPolicy,
) -> StacksTurnkey {
    let (public, private) = crate::providers::turnkey::stamp::test_key_pair();
    let mut config = SdkConfig::new(private, public, "org-root");
    config.api_base_url = turnkey_url.to_string();
    config.stacks_api_url = Some(stacks_url.to_string());
    config.transfer_policy = policy;
    config.activity_poll_attempts = 2;
    config.activity_poll_interval = std::time::Duration::from_millis(5);
    StacksTurnkey::new(config).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn exposes_configuration() {
        let sdk = test_sdk("http://turnkey.test", "http://stacks.test", TransferPolicy::Reject);
        assert_eq!(sdk.name(), "Stacks Embed SDK");
        assert_eq!(
            sdk.description(),
            "An SDK for Stacks Embedded wallet using turnkey"
        );
        assert_eq!(sdk.base_url(), "http://turnkey.test");
        assert_eq!(sdk.default_organization_id(), "org-root");
        assert_eq!(sdk.network(), Network::Testnet);
        assert_eq!(sdk.transfer_policy(), TransferPolicy::Reject);
        assert_eq!(sdk.turnkey().api_public_key(), sdk.api_public_key());
    }

    #[test]
    fn set_network_keeps_explicit_stacks_url() {
        let mut sdk =
            test_sdk("http://turnkey.test", "http://stacks.test", TransferPolicy::default());
        sdk.set_network(Network::Mainnet).unwrap();
        assert_eq!(sdk.network(), Network::Mainnet);
        assert_eq!(sdk.hiro().base_url(), "http://stacks.test");
    }

    #[test]
    fn set_network_follows_network_default_url() {
        let (public, private) = crate::providers::turnkey::stamp::test_key_pair();
        let mut sdk = StacksTurnkey::new(SdkConfig::new(private, public, "org-root")).unwrap();
        assert_eq!(sdk.hiro().base_url(), "https://api.testnet.hiro.so");
        sdk.set_network(Network::Mainnet).unwrap();
        assert_eq!(sdk.hiro().base_url(), "https://api.mainnet.hiro.so");
    }

    #[test]
    fn mismatched_api_key_fails_construction() {
        let (public, _) = crate::providers::turnkey::stamp::test_key_pair();
        let config = SdkConfig::new(hex::encode([7u8; 32]), public, "org-root");
        assert!(matches!(
            StacksTurnkey::new(config),
            Err(SdkError::Turnkey(_))
        ));
    }

    #[tokio::test]
    async fn invoke_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let sdk = test_sdk(&server.uri(), &server.uri(), TransferPolicy::default());
        let value: Value = sdk.invoke(&format!("{}/info", server.uri())).await.unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn invoke_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let sdk = test_sdk(&server.uri(), &server.uri(), TransferPolicy::default());
        let err = sdk
            .invoke::<Value>(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 404, message: nope");
    }
}
