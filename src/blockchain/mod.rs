// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stacks blockchain integration.
//!
//! This module provides functionality for:
//! - Deriving c32check addresses from secp256k1 public keys
//! - Building unsigned STX transfers and contract calls
//! - Computing pre-sign sighashes and attaching recoverable signatures
//! - Querying balances, nonces, history and fee rates, and broadcasting

pub mod address;
pub mod clarity;
pub mod client;
pub mod signing;
pub mod transaction;
pub mod types;

pub use address::{public_key_to_address, StacksAddress};
pub use clarity::ClarityValue;
pub use client::{HiroClient, StacksError};
pub use signing::MessageSignature;
pub use transaction::{
    ContractCallOptions, FungibleConditionCode, PostCondition, PostConditionMode,
    PostConditionPrincipal, StacksTransaction, TokenTransferOptions,
};
pub use types::*;
