// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the SDK. [`SdkConfig::from_env`] loads them; embedders can also build
//! an [`SdkConfig`] directly.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TURNKEY_API_BASE_URL` | Turnkey public API base URL | `https://api.turnkey.com` |
//! | `TURNKEY_API_PRIVATE_KEY` | API key private scalar (hex, P-256) | Required |
//! | `TURNKEY_API_PUBLIC_KEY` | API key public point (hex, compressed) | Required |
//! | `TURNKEY_ORGANIZATION_ID` | Parent organization id | Required |
//! | `STACKS_NETWORK` | `mainnet` or `testnet` | `testnet` |
//! | `STACKS_API_URL` | Override for the network's Hiro API URL | Network default |
//! | `STACKS_TRANSFER_POLICY` | `adjust` or `reject` on balance shortfall | `adjust` |
//! | `SDK_NAME` | SDK display name | `Stacks Embed SDK` |
//! | `SDK_DESCRIPTION` | SDK description | See [`DEFAULT_SDK_DESCRIPTION`] |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`), binary only | `pretty` |
//! | `RUST_LOG` | Log level filter, binary only | `info` |

use std::time::Duration;

use crate::blockchain::Network;
use crate::providers::turnkey::{ActivityPolling, DEFAULT_API_BASE_URL};
use crate::transactions::TransferPolicy;

/// Environment variable name for the Turnkey API base URL.
pub const TURNKEY_API_BASE_URL_ENV: &str = "TURNKEY_API_BASE_URL";

/// Environment variable name for the Turnkey API private key.
///
/// Hex-encoded 32-byte P-256 scalar. Never logged.
pub const TURNKEY_API_PRIVATE_KEY_ENV: &str = "TURNKEY_API_PRIVATE_KEY";

/// Environment variable name for the Turnkey API public key.
pub const TURNKEY_API_PUBLIC_KEY_ENV: &str = "TURNKEY_API_PUBLIC_KEY";

/// Environment variable name for the parent organization id.
///
/// Sub-organization lookups and creation happen under this organization.
pub const TURNKEY_ORGANIZATION_ID_ENV: &str = "TURNKEY_ORGANIZATION_ID";

/// Environment variable name for the Stacks network.
pub const STACKS_NETWORK_ENV: &str = "STACKS_NETWORK";

/// Environment variable name for the Stacks API URL override.
pub const STACKS_API_URL_ENV: &str = "STACKS_API_URL";

/// Environment variable name for the transfer shortfall policy.
pub const STACKS_TRANSFER_POLICY_ENV: &str = "STACKS_TRANSFER_POLICY";

pub const SDK_NAME_ENV: &str = "SDK_NAME";
pub const SDK_DESCRIPTION_ENV: &str = "SDK_DESCRIPTION";

/// Environment variable name for the log output format.
///
/// # Values
/// - `json` - structured JSON lines
/// - `pretty` - human-readable (default)
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_SDK_NAME: &str = "Stacks Embed SDK";
pub const DEFAULT_SDK_DESCRIPTION: &str = "An SDK for Stacks Embedded wallet using turnkey";

/// HTTP timeout applied to every Turnkey and Stacks API request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// SDK configuration.
#[derive(Clone)]
pub struct SdkConfig {
    /// Display name; [`DEFAULT_SDK_NAME`] when unset.
    pub name: Option<String>,
    pub description: Option<String>,
    pub network: Network,
    /// Turnkey API base URL.
    pub api_base_url: String,
    /// Hex P-256 private key of the Turnkey API key.
    pub api_private_key: String,
    /// Hex P-256 public key of the Turnkey API key.
    pub api_public_key: String,
    /// Parent Turnkey organization.
    pub default_organization_id: String,
    /// Replaces the network's Hiro API URL when set.
    pub stacks_api_url: Option<String>,
    pub transfer_policy: TransferPolicy,
    pub activity_poll_attempts: u32,
    pub activity_poll_interval: Duration,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkConfig")
            .field("name", &self.name)
            .field("network", &self.network)
            .field("api_base_url", &self.api_base_url)
            .field("api_public_key", &self.api_public_key)
            .field("default_organization_id", &self.default_organization_id)
            .field("stacks_api_url", &self.stacks_api_url)
            .field("transfer_policy", &self.transfer_policy)
            .finish_non_exhaustive()
    }
}

impl SdkConfig {
    /// Config with the required credentials and defaults for everything else.
    pub fn new(
        api_private_key: impl Into<String>,
        api_public_key: impl Into<String>,
        default_organization_id: impl Into<String>,
    ) -> Self {
        let polling = ActivityPolling::default();
        Self {
            name: None,
            description: None,
            network: Network::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_private_key: api_private_key.into(),
            api_public_key: api_public_key.into(),
            default_organization_id: default_organization_id.into(),
            stacks_api_url: None,
            transfer_policy: TransferPolicy::default(),
            activity_poll_attempts: polling.attempts,
            activity_poll_interval: polling.interval,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(
            env_required(TURNKEY_API_PRIVATE_KEY_ENV)?,
            env_required(TURNKEY_API_PUBLIC_KEY_ENV)?,
            env_required(TURNKEY_ORGANIZATION_ID_ENV)?,
        );
        config.api_base_url = env_or_default(TURNKEY_API_BASE_URL_ENV, DEFAULT_API_BASE_URL);
        config.name = env_optional(SDK_NAME_ENV);
        config.description = env_optional(SDK_DESCRIPTION_ENV);
        config.stacks_api_url = env_optional(STACKS_API_URL_ENV);

        if let Some(network) = env_optional(STACKS_NETWORK_ENV) {
            config.network = network.parse().map_err(|reason| ConfigError::Invalid {
                name: STACKS_NETWORK_ENV.to_string(),
                reason,
            })?;
        }
        if let Some(policy) = env_optional(STACKS_TRANSFER_POLICY_ENV) {
            config.transfer_policy = policy.parse().map_err(|reason| ConfigError::Invalid {
                name: STACKS_TRANSFER_POLICY_ENV.to_string(),
                reason,
            })?;
        }

        Ok(config)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_SDK_NAME)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_SDK_DESCRIPTION)
    }

    pub fn activity_polling(&self) -> ActivityPolling {
        ActivityPolling {
            attempts: self.activity_poll_attempts,
            interval: self.activity_poll_interval,
        }
    }
}

fn env_required(name: &str) -> Result<String, ConfigError> {
    env_optional(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
