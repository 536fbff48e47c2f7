// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet and Transfer Operations
//!
//! Transactions are built locally, their pre-sign sighash is signed by the
//! sender's Turnkey key, and the signed transaction is broadcast to the
//! Stacks API.
//!
//! ## STX transfer flow
//!
//! 1. Derive the sender address from the Turnkey public key
//! 2. Read balance and fee rate
//! 3. Size a dummy unsigned transfer to estimate the fee
//! 4. Apply the [`TransferPolicy`] when `amount + fee` exceeds the balance
//! 5. Read the nonce and build the real unsigned transfer
//! 6. Sign the pre-sign sighash with Turnkey and verify the signature locally
//! 7. Broadcast
//!
//! Chain reads used by the flow fall back to safe defaults when the API is
//! unreachable: balance `0`, nonce `0`, fee rate `1`, empty history.

pub mod fees;
pub mod types;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::blockchain::{
    BroadcastResult, ClarityValue, ContractCallOptions, FungibleConditionCode, MessageSignature,
    PostCondition, PostConditionMode, PostConditionPrincipal, StacksAddress, StacksError,
    StacksTransaction, TokenTransferOptions, SBTC_ASSET_NAME, SBTC_CONTRACT_ADDRESS,
    SBTC_CONTRACT_NAME,
};
use crate::client::StacksTurnkey;
use crate::error::SdkResult;
use crate::json::to_serializable_json;
use crate::providers::turnkey::{
    ApiKeyParams, CreateSubOrganizationParams, PrivateKeyParams, RootUserParams, TurnkeyError,
    WalletAccountParams, WalletParams, ADDRESS_FORMAT_UNCOMPRESSED, API_KEY_CURVE_P256,
    CURVE_SECP256K1,
};

pub use fees::{
    compute_sendable_amount, estimate_fee, size_transfer, FeeError, SizedTransfer, TransferPolicy,
};
pub use types::*;

const ROOT_API_KEY_NAME: &str = "root-api-key";
const STACKS_PRIVATE_KEY_NAME: &str = "stacks-key-1";
const GENERATED_WALLET_NAME: &str = "My Wallet 3";

const DEFAULT_BALANCE: u64 = 0;
const DEFAULT_NONCE: u64 = 0;
const DEFAULT_FEE_RATE: u64 = 1;

impl StacksTurnkey {
    /// Create a sub-organization controlled by the SDK's API key, with a
    /// Stacks private key and wallet inside it.
    pub async fn generate_stacks_wallet(&self, params: GenerateWalletParams) -> SdkResult<Value> {
        let sub_organization = self
            .turnkey()
            .create_sub_organization(&CreateSubOrganizationParams {
                sub_organization_name: format!("{}'s Sub organization", params.wallet_name),
                root_users: vec![RootUserParams {
                    user_name: params.user_name,
                    user_email: None,
                    api_keys: vec![ApiKeyParams {
                        api_key_name: ROOT_API_KEY_NAME.to_string(),
                        public_key: self.api_public_key().to_string(),
                        curve_type: API_KEY_CURVE_P256.to_string(),
                    }],
                    authenticators: vec![],
                    oauth_providers: vec![],
                }],
                root_quorum_threshold: 1,
                wallet: None,
            })
            .await?;
        let organization_id = &sub_organization.sub_organization_id;

        let private_keys = self
            .turnkey()
            .create_private_keys(
                organization_id,
                &[PrivateKeyParams {
                    private_key_name: STACKS_PRIVATE_KEY_NAME.to_string(),
                    curve: CURVE_SECP256K1.to_string(),
                    private_key_tags: vec![],
                    address_formats: vec![ADDRESS_FORMAT_UNCOMPRESSED.to_string()],
                }],
            )
            .await?
            .private_keys;

        let wallet = self
            .turnkey()
            .create_wallet(
                organization_id,
                &WalletParams {
                    wallet_name: GENERATED_WALLET_NAME.to_string(),
                    accounts: vec![WalletAccountParams::stacks()],
                },
            )
            .await?;

        let public_key = wallet.addresses.first().ok_or_else(|| {
            TurnkeyError::InvalidResponse("created wallet has no addresses".to_string())
        })?;
        let stacks_address = self.derive_stacks_address_from_turnkey_address(public_key)?;

        info!(
            sub_org_id = %organization_id,
            wallet_id = %wallet.wallet_id,
            stacks_address = %stacks_address,
            "Generated Stacks wallet"
        );

        Ok(to_serializable_json(&GeneratedWallet {
            sub_organization,
            private_keys,
            wallet,
            stacks_address,
        })?)
    }

    /// Next account nonce, or `0` when it cannot be read.
    pub async fn get_current_nonce(&self, address: &str) -> u64 {
        self.hiro().get_nonce(address).await.unwrap_or_else(|e| {
            error!(address = %address, error = %e, "Error fetching account nonce");
            DEFAULT_NONCE
        })
    }

    /// STX balance in microSTX, or `0` when it cannot be read.
    pub async fn get_stacks_balance(&self, address: &str) -> u64 {
        self.hiro().get_balance(address).await.unwrap_or_else(|e| {
            error!(address = %address, error = %e, "Error fetching account balance");
            DEFAULT_BALANCE
        })
    }

    /// Transaction history, or empty when it cannot be read.
    pub async fn get_stacks_transactions(&self, address: &str) -> Vec<Value> {
        match self.hiro().get_transactions(address).await {
            Ok(results) => results,
            Err(e) => {
                error!(address = %address, error = %e, "Error fetching account transactions");
                Vec::new()
            }
        }
    }

    /// Fee rate in microSTX per byte, or `1` when it cannot be read.
    pub async fn get_fee_rate(&self) -> u64 {
        self.hiro().get_fee_rate().await.unwrap_or_else(|e| {
            error!(error = %e, "Error fetching fee rate");
            DEFAULT_FEE_RATE
        })
    }

    /// Send STX from a Turnkey-held key.
    pub async fn transfer_stx(&self, params: TransferStxParams) -> SdkResult<StxTransferReceipt> {
        let public_key = params.turnkey_wallet_address.as_str();
        let sender = self.derive_stacks_address_from_turnkey_address(public_key)?;
        let balance = self.get_stacks_balance(&sender).await;
        let fee_rate = self.get_fee_rate().await;

        let dummy = StacksTransaction::unsigned_token_transfer(TokenTransferOptions {
            recipient: &params.to,
            amount: params.amount,
            memo: params.memo.as_deref(),
            public_key,
            nonce: 0,
            fee: 0,
            network: self.network(),
        })?;
        let estimated_size = dummy.byte_len();

        let sized = size_transfer(
            params.amount,
            balance,
            fee_rate,
            estimated_size,
            self.transfer_policy(),
        )?;
        if sized.adjusted {
            warn!(
                sender = %sender,
                requested = params.amount,
                adjusted = sized.amount,
                fee = sized.fee,
                "Insufficient funds for amount plus fee, adjusting send amount"
            );
        }

        let nonce = self.get_current_nonce(&sender).await;
        let mut transaction = StacksTransaction::unsigned_token_transfer(TokenTransferOptions {
            recipient: &params.to,
            amount: sized.amount,
            memo: params.memo.as_deref(),
            public_key,
            nonce,
            fee: sized.fee,
            network: self.network(),
        })?;

        let broadcast = self
            .sign_and_broadcast(
                &mut transaction,
                public_key,
                public_key,
                params.organization_id.as_deref(),
            )
            .await?;

        info!(
            sender = %sender,
            recipient = %params.to,
            amount = sized.amount,
            fee = sized.fee,
            txid = %broadcast.txid,
            accepted = broadcast.result.is_accepted(),
            "STX transfer broadcast"
        );

        Ok(StxTransferReceipt {
            broadcast,
            requested_amount: params.amount,
            amount: sized.amount,
            adjusted: sized.adjusted,
        })
    }

    /// Sign and broadcast a contract call. Missing nonce and fee are read
    /// from the chain.
    pub async fn execute_function_call(
        &self,
        params: FunctionCallParams,
    ) -> SdkResult<BroadcastReceipt> {
        self.execute_function_call_inner(params)
            .await
            .inspect_err(|e| error!(error = %e, "Error executing function call"))
    }

    async fn execute_function_call_inner(
        &self,
        params: FunctionCallParams,
    ) -> SdkResult<BroadcastReceipt> {
        let options = &params.options;

        let nonce = match options.nonce {
            Some(nonce) => nonce,
            None => {
                let sender = self.derive_stacks_address_from_turnkey_address(&options.public_key)?;
                self.get_current_nonce(&sender).await
            }
        };
        let fee = match options.fee {
            Some(fee) => fee,
            None => {
                let fee_rate = self.get_fee_rate().await;
                let size = StacksTransaction::unsigned_contract_call(options, nonce, 0)?.byte_len();
                let fee = estimate_fee(fee_rate, size);
                u64::try_from(fee).map_err(|_| {
                    StacksError::InvalidResponse(format!("fee rate {fee_rate} overflows the fee"))
                })?
            }
        };

        let mut transaction = StacksTransaction::unsigned_contract_call(options, nonce, fee)?;
        self.sign_and_broadcast(
            &mut transaction,
            &params.turnkey_wallet_address,
            &options.public_key,
            params.organization_id.as_deref(),
        )
        .await
    }

    /// Transfer sBTC with a post condition pinning the exact amount sent.
    pub async fn transfer_sbtc(&self, params: TransferSbtcParams) -> SdkResult<BroadcastReceipt> {
        let sender: StacksAddress = self
            .derive_stacks_address_from_turnkey_address(&params.turnkey_wallet_address)?
            .parse()?;

        let options = ContractCallOptions {
            contract_address: SBTC_CONTRACT_ADDRESS.to_string(),
            contract_name: SBTC_CONTRACT_NAME.to_string(),
            function_name: "transfer".to_string(),
            function_args: vec![
                ClarityValue::uint(params.amount),
                ClarityValue::StandardPrincipal(sender),
                ClarityValue::principal(&params.to)?,
                ClarityValue::OptionalNone,
            ],
            public_key: params.turnkey_wallet_address.clone(),
            nonce: None,
            fee: None,
            post_condition_mode: PostConditionMode::Deny,
            post_conditions: vec![PostCondition::Fungible {
                principal: PostConditionPrincipal::Standard(sender),
                contract_address: SBTC_CONTRACT_ADDRESS.parse()?,
                contract_name: SBTC_CONTRACT_NAME.to_string(),
                asset_name: SBTC_ASSET_NAME.to_string(),
                code: FungibleConditionCode::SentEq,
                amount: params.amount,
            }],
            network: self.network(),
        };

        self.execute_function_call(FunctionCallParams {
            turnkey_wallet_address: params.turnkey_wallet_address,
            options,
            organization_id: params.organization_id,
        })
        .await
        .inspect_err(|e| error!(error = %e, "Error transferring sBTC"))
    }

    /// Have Turnkey sign the pre-sign sighash, attach the signature after
    /// checking it recovers to `public_key`, and broadcast.
    async fn sign_and_broadcast(
        &self,
        transaction: &mut StacksTransaction,
        sign_with: &str,
        public_key: &str,
        organization_id: Option<&str>,
    ) -> SdkResult<BroadcastReceipt> {
        let presign = transaction.presign_sighash();
        let payload = format!("0x{}", hex::encode(presign));
        let organization_id = organization_id.unwrap_or(self.default_organization_id());

        let signature = self
            .turnkey()
            .sign_raw_payload(organization_id, sign_with, &payload)
            .await?;
        let signature = MessageSignature::from_rsv(&signature.r, &signature.s, &signature.v)?;
        signature.verify(&presign, public_key)?;
        transaction.set_signature(signature);

        let result = self.hiro().broadcast(transaction).await?;
        if let BroadcastResult::Rejected { error, reason, .. } = &result {
            warn!(error = %error, reason = ?reason, "Transaction rejected by node");
        }

        Ok(BroadcastReceipt {
            txid: format!("0x{}", hex::encode(transaction.txid())),
            fee: transaction.fee(),
            nonce: transaction.nonce(),
            result,
        })
    }
}
