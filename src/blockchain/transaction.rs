// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Unsigned Stacks transaction construction and sighash computation.
//!
//! Only the single-signature standard authorization is supported: every key
//! lives in Turnkey as one secp256k1 account, so multi-sig and sponsored
//! spending conditions never occur.

use sha2::{Digest, Sha512_256};

use super::address::{decode_hex, StacksAddress};
use super::clarity::{validate_name, write_address, write_name, ClarityValue};
use super::client::StacksError;
use super::signing::MessageSignature;
use super::types::Network;

/// Standard (non-sponsored) authorization.
pub const AUTH_TYPE_STANDARD: u8 = 0x04;
/// P2PKH single-sig hash mode.
const HASH_MODE_P2PKH: u8 = 0x00;
/// Transaction may be included in any block.
const ANCHOR_MODE_ANY: u8 = 0x03;

const PAYLOAD_TOKEN_TRANSFER: u8 = 0x00;
const PAYLOAD_CONTRACT_CALL: u8 = 0x02;

const POST_CONDITION_STX: u8 = 0x00;
const POST_CONDITION_FUNGIBLE: u8 = 0x01;
const POST_CONDITION_PRINCIPAL_STANDARD: u8 = 0x02;
const POST_CONDITION_PRINCIPAL_CONTRACT: u8 = 0x03;

/// Token transfer memo length.
pub const MEMO_LEN: usize = 34;

/// How the signer's public key is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyEncoding {
    Compressed = 0x00,
    Uncompressed = 0x01,
}

/// Whether assets not covered by post conditions may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostConditionMode {
    Allow = 0x01,
    #[default]
    Deny = 0x02,
}

/// Fungible/STX post-condition comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FungibleConditionCode {
    SentEq = 0x01,
    SentGt = 0x02,
    SentGe = 0x03,
    SentLt = 0x04,
    SentLe = 0x05,
}

/// Principal a post condition applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostConditionPrincipal {
    Standard(StacksAddress),
    Contract(StacksAddress, String),
}

/// Post condition guarding asset movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCondition {
    Stx {
        principal: PostConditionPrincipal,
        code: FungibleConditionCode,
        amount: u64,
    },
    Fungible {
        principal: PostConditionPrincipal,
        contract_address: StacksAddress,
        contract_name: String,
        asset_name: String,
        code: FungibleConditionCode,
        amount: u64,
    },
}

impl PostCondition {
    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            PostCondition::Stx {
                principal,
                code,
                amount,
            } => {
                out.push(POST_CONDITION_STX);
                write_post_condition_principal(out, principal);
                out.push(*code as u8);
                out.extend_from_slice(&amount.to_be_bytes());
            }
            PostCondition::Fungible {
                principal,
                contract_address,
                contract_name,
                asset_name,
                code,
                amount,
            } => {
                out.push(POST_CONDITION_FUNGIBLE);
                write_post_condition_principal(out, principal);
                write_address(out, contract_address);
                write_name(out, contract_name);
                write_name(out, asset_name);
                out.push(*code as u8);
                out.extend_from_slice(&amount.to_be_bytes());
            }
        }
    }
}

fn write_post_condition_principal(out: &mut Vec<u8>, principal: &PostConditionPrincipal) {
    match principal {
        PostConditionPrincipal::Standard(address) => {
            out.push(POST_CONDITION_PRINCIPAL_STANDARD);
            write_address(out, address);
        }
        PostConditionPrincipal::Contract(address, name) => {
            out.push(POST_CONDITION_PRINCIPAL_CONTRACT);
            write_address(out, address);
            write_name(out, name);
        }
    }
}

/// Transaction payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPayload {
    TokenTransfer {
        recipient: ClarityValue,
        amount: u64,
        memo: [u8; MEMO_LEN],
    },
    ContractCall {
        contract_address: StacksAddress,
        contract_name: String,
        function_name: String,
        function_args: Vec<ClarityValue>,
    },
}

impl TransactionPayload {
    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            TransactionPayload::TokenTransfer {
                recipient,
                amount,
                memo,
            } => {
                out.push(PAYLOAD_TOKEN_TRANSFER);
                recipient.write_to(out);
                out.extend_from_slice(&amount.to_be_bytes());
                out.extend_from_slice(memo);
            }
            TransactionPayload::ContractCall {
                contract_address,
                contract_name,
                function_name,
                function_args,
            } => {
                out.push(PAYLOAD_CONTRACT_CALL);
                write_address(out, contract_address);
                write_name(out, contract_name);
                write_name(out, function_name);
                out.extend_from_slice(&(function_args.len() as u32).to_be_bytes());
                for arg in function_args {
                    arg.write_to(out);
                }
            }
        }
    }
}

/// Single-sig spending condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendingCondition {
    pub signer: [u8; 20],
    pub nonce: u64,
    pub fee: u64,
    pub key_encoding: PublicKeyEncoding,
    pub signature: MessageSignature,
}

impl SpendingCondition {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(HASH_MODE_P2PKH);
        out.extend_from_slice(&self.signer);
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.fee.to_be_bytes());
        out.push(self.key_encoding as u8);
        out.extend_from_slice(self.signature.as_bytes());
    }
}

/// A Stacks transaction with standard single-sig authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StacksTransaction {
    pub version: u8,
    pub chain_id: u32,
    pub spending_condition: SpendingCondition,
    pub post_condition_mode: PostConditionMode,
    pub post_conditions: Vec<PostCondition>,
    pub payload: TransactionPayload,
}

/// Options for an unsigned STX transfer.
#[derive(Debug, Clone)]
pub struct TokenTransferOptions<'a> {
    /// Recipient principal (`SP...` or `SP....contract`).
    pub recipient: &'a str,
    /// Amount in microSTX.
    pub amount: u64,
    pub memo: Option<&'a str>,
    /// Hex-encoded sender public key.
    pub public_key: &'a str,
    pub nonce: u64,
    pub fee: u64,
    pub network: Network,
}

/// Options for an unsigned contract call.
#[derive(Debug, Clone)]
pub struct ContractCallOptions {
    pub contract_address: String,
    pub contract_name: String,
    pub function_name: String,
    pub function_args: Vec<ClarityValue>,
    /// Hex-encoded sender public key.
    pub public_key: String,
    /// Fetched from the chain when `None`.
    pub nonce: Option<u64>,
    /// Estimated from the network fee rate when `None`.
    pub fee: Option<u64>,
    pub post_condition_mode: PostConditionMode,
    pub post_conditions: Vec<PostCondition>,
    pub network: Network,
}

impl StacksTransaction {
    /// Build an unsigned STX token transfer.
    pub fn unsigned_token_transfer(options: TokenTransferOptions<'_>) -> Result<Self, StacksError> {
        let memo = encode_memo(options.memo.unwrap_or_default())?;
        let payload = TransactionPayload::TokenTransfer {
            recipient: ClarityValue::principal(options.recipient)?,
            amount: options.amount,
            memo,
        };
        Self::unsigned(
            options.public_key,
            options.nonce,
            options.fee,
            options.network,
            PostConditionMode::Deny,
            Vec::new(),
            payload,
        )
    }

    /// Build an unsigned contract call with explicit nonce and fee.
    pub fn unsigned_contract_call(
        options: &ContractCallOptions,
        nonce: u64,
        fee: u64,
    ) -> Result<Self, StacksError> {
        validate_name(&options.contract_name)?;
        validate_name(&options.function_name)?;
        let payload = TransactionPayload::ContractCall {
            contract_address: options.contract_address.parse()?,
            contract_name: options.contract_name.clone(),
            function_name: options.function_name.clone(),
            function_args: options.function_args.clone(),
        };
        Self::unsigned(
            &options.public_key,
            nonce,
            fee,
            options.network,
            options.post_condition_mode,
            options.post_conditions.clone(),
            payload,
        )
    }

    fn unsigned(
        public_key_hex: &str,
        nonce: u64,
        fee: u64,
        network: Network,
        post_condition_mode: PostConditionMode,
        post_conditions: Vec<PostCondition>,
        payload: TransactionPayload,
    ) -> Result<Self, StacksError> {
        let public_key = decode_hex(public_key_hex).map_err(StacksError::InvalidPublicKey)?;
        let signer = StacksAddress::from_public_key(&public_key, network)?.hash160;
        let key_encoding = if public_key.len() == 33 {
            PublicKeyEncoding::Compressed
        } else {
            PublicKeyEncoding::Uncompressed
        };
        let config = network.config();

        Ok(Self {
            version: config.transaction_version,
            chain_id: config.chain_id,
            spending_condition: SpendingCondition {
                signer,
                nonce,
                fee,
                key_encoding,
                signature: MessageSignature::empty(),
            },
            post_condition_mode,
            post_conditions,
            payload,
        })
    }

    /// SIP-005 wire encoding.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        out.push(self.version);
        out.extend_from_slice(&self.chain_id.to_be_bytes());
        out.push(AUTH_TYPE_STANDARD);
        self.spending_condition.write_to(&mut out);
        out.push(ANCHOR_MODE_ANY);
        out.push(self.post_condition_mode as u8);
        out.extend_from_slice(&(self.post_conditions.len() as u32).to_be_bytes());
        for condition in &self.post_conditions {
            condition.write_to(&mut out);
        }
        self.payload.write_to(&mut out);
        out
    }

    /// Serialized length in bytes, the size fees are charged on.
    pub fn byte_len(&self) -> usize {
        self.serialize().len()
    }

    /// Transaction id: SHA-512/256 of the serialization.
    pub fn txid(&self) -> [u8; 32] {
        sha512_256(&self.serialize())
    }

    /// Sighash of the transaction with its spending condition cleared.
    pub fn initial_sighash(&self) -> [u8; 32] {
        let mut cleared = self.clone();
        cleared.spending_condition.nonce = 0;
        cleared.spending_condition.fee = 0;
        cleared.spending_condition.signature = MessageSignature::empty();
        cleared.txid()
    }

    /// Hash the signer must sign.
    pub fn presign_sighash(&self) -> [u8; 32] {
        sighash_presign(
            &self.initial_sighash(),
            AUTH_TYPE_STANDARD,
            self.spending_condition.fee,
            self.spending_condition.nonce,
        )
    }

    pub fn set_signature(&mut self, signature: MessageSignature) {
        self.spending_condition.signature = signature;
    }

    pub fn fee(&self) -> u64 {
        self.spending_condition.fee
    }

    pub fn nonce(&self) -> u64 {
        self.spending_condition.nonce
    }
}

/// `SHA512/256(cur_sighash || auth_type || fee || nonce)`.
pub fn sighash_presign(cur_sighash: &[u8; 32], auth_type: u8, fee: u64, nonce: u64) -> [u8; 32] {
    let mut data = Vec::with_capacity(32 + 1 + 8 + 8);
    data.extend_from_slice(cur_sighash);
    data.push(auth_type);
    data.extend_from_slice(&fee.to_be_bytes());
    data.extend_from_slice(&nonce.to_be_bytes());
    sha512_256(&data)
}

fn sha512_256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha512_256::digest(data));
    out
}

fn encode_memo(memo: &str) -> Result<[u8; MEMO_LEN], StacksError> {
    let bytes = memo.as_bytes();
    if bytes.len() > MEMO_LEN {
        return Err(StacksError::InvalidClarityValue(format!(
            "memo is {} bytes, at most {MEMO_LEN} allowed",
            bytes.len()
        )));
    }
    let mut out = [0u8; MEMO_LEN];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::elliptic_curve::sec1::ToEncodedPoint;

    const RECIPIENT: &str = "ST2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKQYAC0RQ";

    fn public_key(compressed: bool) -> String {
        let public = k256::SecretKey::from_slice(&[3u8; 32]).unwrap().public_key();
        hex::encode(public.to_encoded_point(compressed).as_bytes())
    }

    fn transfer(amount: u64, nonce: u64, fee: u64) -> StacksTransaction {
        StacksTransaction::unsigned_token_transfer(TokenTransferOptions {
            recipient: RECIPIENT,
            amount,
            memo: None,
            public_key: &public_key(false),
            nonce,
            fee,
            network: Network::Testnet,
        })
        .unwrap()
    }

    #[test]
    fn token_transfer_has_fixed_size() {
        // 5 header + 1 auth + 1+20+8+8+1+65 condition + 1 anchor + 1 pc mode
        // + 4 pc len + 1 payload type + 22 principal + 8 amount + 34 memo
        assert_eq!(transfer(1, 0, 0).byte_len(), 180);
        assert_eq!(transfer(u64::MAX, 9, 1_000).byte_len(), 180);
    }

    #[test]
    fn serialization_header_matches_network() {
        let bytes = transfer(10, 0, 0).serialize();
        assert_eq!(bytes[0], 0x80);
        assert_eq!(&bytes[1..5], &[0x80, 0, 0, 0]);
        assert_eq!(bytes[5], AUTH_TYPE_STANDARD);
        assert_eq!(bytes[6], HASH_MODE_P2PKH);
        // key encoding byte after signer, nonce and fee
        assert_eq!(bytes[6 + 1 + 20 + 16], PublicKeyEncoding::Uncompressed as u8);
    }

    #[test]
    fn compressed_key_sets_encoding() {
        let tx = StacksTransaction::unsigned_token_transfer(TokenTransferOptions {
            recipient: RECIPIENT,
            amount: 1,
            memo: Some("hello"),
            public_key: &public_key(true),
            nonce: 0,
            fee: 0,
            network: Network::Testnet,
        })
        .unwrap();
        assert_eq!(tx.spending_condition.key_encoding, PublicKeyEncoding::Compressed);
        let bytes = tx.serialize();
        assert_eq!(&bytes[bytes.len() - MEMO_LEN..bytes.len() - MEMO_LEN + 5], b"hello");
    }

    #[test]
    fn initial_sighash_ignores_nonce_fee_and_signature() {
        let a = transfer(500, 0, 0);
        let mut b = transfer(500, 7, 360);
        b.set_signature(MessageSignature::from_bytes([1u8; 65]));
        assert_eq!(a.initial_sighash(), b.initial_sighash());
        assert_ne!(a.txid(), b.txid());
    }

    #[test]
    fn presign_sighash_commits_to_fee_and_nonce() {
        let tx = transfer(500, 7, 360);
        let expected = sighash_presign(&tx.initial_sighash(), AUTH_TYPE_STANDARD, 360, 7);
        assert_eq!(tx.presign_sighash(), expected);
        assert_ne!(tx.presign_sighash(), transfer(500, 8, 360).presign_sighash());
        assert_ne!(tx.presign_sighash(), transfer(500, 7, 361).presign_sighash());
    }

    #[test]
    fn long_memo_is_rejected() {
        let memo = "x".repeat(MEMO_LEN + 1);
        let result = StacksTransaction::unsigned_token_transfer(TokenTransferOptions {
            recipient: RECIPIENT,
            amount: 1,
            memo: Some(&memo),
            public_key: &public_key(true),
            nonce: 0,
            fee: 0,
            network: Network::Testnet,
        });
        assert!(matches!(result, Err(StacksError::InvalidClarityValue(_))));
    }

    #[test]
    fn contract_call_serializes_post_conditions() {
        let sender: StacksAddress = RECIPIENT.parse().unwrap();
        let options = ContractCallOptions {
            contract_address: "SM3VDXK3WZZSA84XXFKAFAF15NNZX32CTSG82JFQ4".to_string(),
            contract_name: "sbtc-token".to_string(),
            function_name: "transfer".to_string(),
            function_args: vec![ClarityValue::uint(5u64), ClarityValue::OptionalNone],
            public_key: public_key(true),
            nonce: None,
            fee: None,
            post_condition_mode: PostConditionMode::Deny,
            post_conditions: vec![PostCondition::Stx {
                principal: PostConditionPrincipal::Standard(sender),
                code: FungibleConditionCode::SentLe,
                amount: 0,
            }],
            network: Network::Testnet,
        };
        let tx = StacksTransaction::unsigned_contract_call(&options, 3, 200).unwrap();
        let bytes = tx.serialize();

        let pc_offset = 5 + 1 + 103 + 1;
        assert_eq!(bytes[pc_offset], PostConditionMode::Deny as u8);
        assert_eq!(&bytes[pc_offset + 1..pc_offset + 5], &[0, 0, 0, 1]);
        assert_eq!(bytes[pc_offset + 5], POST_CONDITION_STX);
        // stx condition: type + principal(1+21) + code + amount(8)
        let payload_offset = pc_offset + 5 + 1 + 22 + 1 + 8;
        assert_eq!(bytes[payload_offset], PAYLOAD_CONTRACT_CALL);
        assert_eq!(tx.nonce(), 3);
        assert_eq!(tx.fee(), 200);
    }

    #[test]
    fn contract_call_rejects_bad_function_name() {
        let options = ContractCallOptions {
            contract_address: "SM3VDXK3WZZSA84XXFKAFAF15NNZX32CTSG82JFQ4".to_string(),
            contract_name: "sbtc-token".to_string(),
            function_name: "not a name".to_string(),
            function_args: vec![],
            public_key: public_key(true),
            nonce: None,
            fee: None,
            post_condition_mode: PostConditionMode::Allow,
            post_conditions: vec![],
            network: Network::Testnet,
        };
        assert!(StacksTransaction::unsigned_contract_call(&options, 0, 0).is_err());
    }
}
