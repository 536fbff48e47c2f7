// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Serialization-safe JSON helpers.
//!
//! Amounts, nonces and fees are `u64`/`u128` in Rust but many consumers of
//! the SDK's JSON (browsers in particular) parse numbers as IEEE-754 doubles.
//! Anything that can exceed 2^53 - 1 is therefore emitted as a decimal string.

use serde::Serialize;
use serde_json::{Number, Value};

/// Largest integer a double represents exactly (`Number.MAX_SAFE_INTEGER`).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Convert any serializable value to JSON where no integer loses precision
/// when read back as a double.
///
/// Integers outside `±MAX_SAFE_INTEGER` are replaced by their decimal string.
pub fn to_serializable_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
    Ok(stringify_unsafe_integers(serde_json::to_value(value)?))
}

fn stringify_unsafe_integers(value: Value) -> Value {
    match value {
        Value::Number(n) if !is_safe_number(&n) => Value::String(n.to_string()),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(stringify_unsafe_integers).collect())
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, stringify_unsafe_integers(v)))
                .collect(),
        ),
        other => other,
    }
}

fn is_safe_number(n: &Number) -> bool {
    if let Some(u) = n.as_u64() {
        u <= MAX_SAFE_INTEGER
    } else if let Some(i) = n.as_i64() {
        i.unsigned_abs() <= MAX_SAFE_INTEGER
    } else {
        // floats are already doubles
        true
    }
}

/// Serde adapter: serialize an integer as a decimal string, accept either a
/// string or a JSON number when deserializing.
///
/// ```rust,ignore
/// #[serde(with = "crate::json::string_or_number")]
/// pub amount: u64,
/// ```
pub mod string_or_number {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s,
            Raw::Num(n) => n.to_string(),
        };
        raw.trim().parse::<T>().map_err(de::Error::custom)
    }
}
