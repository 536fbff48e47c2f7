// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Parameters and receipts of the wallet and transfer operations.
//!
//! Amounts, fees and nonces serialize as decimal strings so JSON consumers
//! never lose precision on values above 2^53.

use serde::{Deserialize, Serialize};

use crate::blockchain::{BroadcastResult, ContractCallOptions};
use crate::json::string_or_number;
use crate::providers::turnkey::{CreateSubOrganizationResult, CreatedPrivateKey, CreatedWallet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWalletParams {
    pub user_name: String,
    pub wallet_name: String,
}

/// Sub-organization, keys and wallet created for a new Stacks wallet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWallet {
    pub sub_organization: CreateSubOrganizationResult,
    pub private_keys: Vec<CreatedPrivateKey>,
    pub wallet: CreatedWallet,
    pub stacks_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStxParams {
    /// Sender public key as exposed by the Turnkey account.
    pub turnkey_wallet_address: String,
    /// Recipient principal.
    pub to: String,
    /// Requested amount in microSTX.
    #[serde(with = "string_or_number")]
    pub amount: u64,
    #[serde(default)]
    pub memo: Option<String>,
    /// Organization holding the key; the parent organization when unset.
    #[serde(default)]
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FunctionCallParams {
    pub turnkey_wallet_address: String,
    pub options: ContractCallOptions,
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSbtcParams {
    pub turnkey_wallet_address: String,
    pub to: String,
    /// Amount in satoshis.
    #[serde(with = "string_or_number")]
    pub amount: u64,
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// A signed transaction and what the node said about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReceipt {
    /// Locally computed txid, `0x`-prefixed.
    pub txid: String,
    #[serde(with = "string_or_number")]
    pub fee: u64,
    #[serde(with = "string_or_number")]
    pub nonce: u64,
    pub result: BroadcastResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StxTransferReceipt {
    #[serde(flatten)]
    pub broadcast: BroadcastReceipt,
    #[serde(with = "string_or_number")]
    pub requested_amount: u64,
    /// Amount actually sent.
    #[serde(with = "string_or_number")]
    pub amount: u64,
    /// True when the amount was reduced to fit the balance.
    pub adjusted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn receipt_amounts_serialize_as_strings() {
        let receipt = StxTransferReceipt {
            broadcast: BroadcastReceipt {
                txid: "0xab".to_string(),
                fee: 360,
                nonce: 3,
                result: BroadcastResult::Accepted {
                    txid: "0xab".to_string(),
                },
            },
            requested_amount: u64::MAX,
            amount: 640,
            adjusted: true,
        };
        let value = serde_json::to_value(&receipt).unwrap();

        assert_eq!(value["txid"], "0xab");
        assert_eq!(value["fee"], "360");
        assert_eq!(value["requestedAmount"], u64::MAX.to_string());
        assert_eq!(value["amount"], "640");
        assert_eq!(value["result"]["status"], "accepted");
    }

    #[test]
    fn transfer_params_accept_string_or_number_amounts() {
        let params: TransferStxParams = serde_json::from_value(json!({
            "turnkeyWalletAddress": "04ab",
            "to": "ST2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKQYAC0RQ",
            "amount": "18446744073709551615"
        }))
        .unwrap();
        assert_eq!(params.amount, u64::MAX);
        assert!(params.memo.is_none());

        let params: TransferSbtcParams = serde_json::from_value(json!({
            "turnkeyWalletAddress": "04ab",
            "to": "ST2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKQYAC0RQ",
            "amount": 1500
        }))
        .unwrap();
        assert_eq!(params.amount, 1500);
    }
}
