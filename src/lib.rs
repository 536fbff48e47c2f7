// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stacks Turnkey - Embedded Stacks wallet SDK
//!
//! Keys live in Turnkey sub-organizations; this crate provisions them, builds
//! Stacks transactions locally and has Turnkey sign their pre-sign hashes.
//!
//! ## Modules
//!
//! - `auth` - Sub-organization onboarding, OAuth and email OTP login
//! - `blockchain` - Stacks addresses, Clarity values, transactions, Hiro API
//! - `client` - [`StacksTurnkey`], the SDK entry point
//! - `providers` - Turnkey API client and request stamping
//! - `transactions` - Wallet generation, fee-aware transfers, contract calls

pub mod auth;
pub mod blockchain;
pub mod client;
pub mod config;
pub mod error;
pub mod json;
pub mod providers;
pub mod transactions;

pub use client::StacksTurnkey;
pub use config::SdkConfig;
pub use error::{SdkError, SdkResult};
