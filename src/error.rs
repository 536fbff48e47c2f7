// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::blockchain::StacksError;
use crate::config::ConfigError;
use crate::providers::TurnkeyError;
use crate::transactions::FeeError;

/// Error returned by SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Turnkey(#[from] TurnkeyError),

    #[error(transparent)]
    Stacks(#[from] StacksError),

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error("HTTP error! status: {status}, message: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("No root user ID found")]
    MissingRootUser,

    #[error("Could not find suborg by {0}")]
    SubOrgNotFound(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
