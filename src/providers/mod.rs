// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External custody providers.

pub mod turnkey;

pub use turnkey::{ApiKeyStamper, TurnkeyClient, TurnkeyError};
