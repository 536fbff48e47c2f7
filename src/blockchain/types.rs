// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stacks network types and constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::json;

/// Stacks network selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    /// Static configuration for this network.
    pub fn config(self) -> &'static NetworkConfig {
        match self {
            Network::Mainnet => &STACKS_MAINNET,
            Network::Testnet => &STACKS_TESTNET,
        }
    }

    /// Explorer page for an address on this network.
    pub fn explorer_address_url(self, address: &str) -> String {
        format!(
            "{}/address/{address}?chain={}",
            self.config().explorer_url,
            self.as_str()
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(format!(
                "unknown network `{other}` (expected `mainnet` or `testnet`)"
            )),
        }
    }
}

/// Stacks network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Transaction version byte
    pub transaction_version: u8,
    /// Chain ID
    pub chain_id: u32,
    /// Address version for single-sig (P2PKH) accounts
    pub single_sig_version: u8,
    /// Hiro API base URL
    pub api_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Stacks mainnet configuration.
pub const STACKS_MAINNET: NetworkConfig = NetworkConfig {
    name: "Stacks Mainnet",
    transaction_version: 0x00,
    chain_id: 0x0000_0001,
    single_sig_version: 22,
    api_url: "https://api.mainnet.hiro.so",
    explorer_url: "https://explorer.hiro.so",
};

/// Stacks testnet configuration.
pub const STACKS_TESTNET: NetworkConfig = NetworkConfig {
    name: "Stacks Testnet",
    transaction_version: 0x80,
    chain_id: 0x8000_0000,
    single_sig_version: 26,
    api_url: "https://api.testnet.hiro.so",
    explorer_url: "https://explorer.hiro.so",
};

/// sBTC token contract deployer.
pub const SBTC_CONTRACT_ADDRESS: &str = "SM3VDXK3WZZSA84XXFKAFAF15NNZX32CTSG82JFQ4";
/// sBTC token contract name.
pub const SBTC_CONTRACT_NAME: &str = "sbtc-token";
/// sBTC fungible asset name inside the contract.
pub const SBTC_ASSET_NAME: &str = "sbtc-token";

/// Outcome of a transaction broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BroadcastResult {
    /// Node accepted the transaction into its mempool.
    Accepted { txid: String },
    /// Node rejected the transaction.
    Rejected {
        txid: Option<String>,
        error: String,
        reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason_data: Option<serde_json::Value>,
    },
}

impl BroadcastResult {
    pub fn txid(&self) -> Option<&str> {
        match self {
            BroadcastResult::Accepted { txid } => Some(txid),
            BroadcastResult::Rejected { txid, .. } => txid.as_deref(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, BroadcastResult::Accepted { .. })
    }
}

/// Account state as reported by `/v2/accounts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(with = "json::string_or_number")]
    pub nonce: u64,
    /// Hex-encoded balance, kept verbatim.
    #[serde(default)]
    pub balance: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(" testnet ".parse::<Network>().unwrap(), Network::Testnet);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn network_defaults_to_testnet() {
        assert_eq!(Network::default(), Network::Testnet);
        assert_eq!(Network::default().config().single_sig_version, 26);
    }

    #[test]
    fn explorer_links_carry_the_chain() {
        let address = "ST2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKQYAC0RQ";
        assert_eq!(
            Network::Testnet.explorer_address_url(address),
            format!("https://explorer.hiro.so/address/{address}?chain=testnet")
        );
        assert!(Network::Mainnet
            .explorer_address_url(address)
            .ends_with("?chain=mainnet"));
        assert_eq!(Network::Mainnet.config().name, "Stacks Mainnet");
    }

    #[test]
    fn broadcast_result_serializes_with_status_tag() {
        let accepted = BroadcastResult::Accepted {
            txid: "0xabc".to_string(),
        };
        let value = serde_json::to_value(&accepted).unwrap();
        assert_eq!(value["status"], "accepted");
        assert_eq!(value["txid"], "0xabc");
        assert_eq!(accepted.txid(), Some("0xabc"));
    }
}
