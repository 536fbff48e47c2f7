// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Clarity value construction and consensus serialization.

use std::str::FromStr;

use super::address::StacksAddress;
use super::client::StacksError;

const TYPE_INT: u8 = 0x00;
const TYPE_UINT: u8 = 0x01;
const TYPE_BUFFER: u8 = 0x02;
const TYPE_TRUE: u8 = 0x03;
const TYPE_FALSE: u8 = 0x04;
const TYPE_PRINCIPAL_STANDARD: u8 = 0x05;
const TYPE_PRINCIPAL_CONTRACT: u8 = 0x06;
const TYPE_RESPONSE_OK: u8 = 0x07;
const TYPE_RESPONSE_ERR: u8 = 0x08;
const TYPE_OPTIONAL_NONE: u8 = 0x09;
const TYPE_OPTIONAL_SOME: u8 = 0x0a;
const TYPE_LIST: u8 = 0x0b;
const TYPE_TUPLE: u8 = 0x0c;
const TYPE_STRING_ASCII: u8 = 0x0d;
const TYPE_STRING_UTF8: u8 = 0x0e;

/// Maximum length of a contract or asset name.
const MAX_NAME_LEN: usize = 128;

/// A Clarity value as passed to contract calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Bool(bool),
    Buffer(Vec<u8>),
    StandardPrincipal(StacksAddress),
    ContractPrincipal(StacksAddress, String),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    /// Entries are serialized sorted by name.
    Tuple(Vec<(String, ClarityValue)>),
    StringAscii(String),
    StringUtf8(String),
}

impl ClarityValue {
    pub fn uint(value: impl Into<u128>) -> Self {
        ClarityValue::UInt(value.into())
    }

    pub fn some(value: ClarityValue) -> Self {
        ClarityValue::OptionalSome(Box::new(value))
    }

    /// Parse `SP...` or `SP....contract-name` into a principal.
    pub fn principal(input: &str) -> Result<Self, StacksError> {
        match input.split_once('.') {
            Some((address, name)) => {
                validate_name(name)?;
                Ok(ClarityValue::ContractPrincipal(
                    StacksAddress::from_str(address)?,
                    name.to_string(),
                ))
            }
            None => Ok(ClarityValue::StandardPrincipal(StacksAddress::from_str(input)?)),
        }
    }

    pub fn string_ascii(value: &str) -> Result<Self, StacksError> {
        if !value.is_ascii() {
            return Err(StacksError::InvalidClarityValue(format!(
                "string-ascii contains non-ASCII characters: {value:?}"
            )));
        }
        Ok(ClarityValue::StringAscii(value.to_string()))
    }

    /// Consensus serialization.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            ClarityValue::Int(v) => {
                out.push(TYPE_INT);
                out.extend_from_slice(&v.to_be_bytes());
            }
            ClarityValue::UInt(v) => {
                out.push(TYPE_UINT);
                out.extend_from_slice(&v.to_be_bytes());
            }
            ClarityValue::Bool(true) => out.push(TYPE_TRUE),
            ClarityValue::Bool(false) => out.push(TYPE_FALSE),
            ClarityValue::Buffer(bytes) => {
                out.push(TYPE_BUFFER);
                write_len_prefixed(out, bytes);
            }
            ClarityValue::StandardPrincipal(address) => {
                out.push(TYPE_PRINCIPAL_STANDARD);
                write_address(out, address);
            }
            ClarityValue::ContractPrincipal(address, name) => {
                out.push(TYPE_PRINCIPAL_CONTRACT);
                write_address(out, address);
                write_name(out, name);
            }
            ClarityValue::OptionalNone => out.push(TYPE_OPTIONAL_NONE),
            ClarityValue::OptionalSome(inner) => {
                out.push(TYPE_OPTIONAL_SOME);
                inner.write_to(out);
            }
            ClarityValue::ResponseOk(inner) => {
                out.push(TYPE_RESPONSE_OK);
                inner.write_to(out);
            }
            ClarityValue::ResponseErr(inner) => {
                out.push(TYPE_RESPONSE_ERR);
                inner.write_to(out);
            }
            ClarityValue::List(items) => {
                out.push(TYPE_LIST);
                out.extend_from_slice(&(items.len() as u32).to_be_bytes());
                for item in items {
                    item.write_to(out);
                }
            }
            ClarityValue::Tuple(entries) => {
                out.push(TYPE_TUPLE);
                let mut sorted: Vec<&(String, ClarityValue)> = entries.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));
                out.extend_from_slice(&(sorted.len() as u32).to_be_bytes());
                for (name, value) in sorted {
                    write_name(out, name);
                    value.write_to(out);
                }
            }
            ClarityValue::StringAscii(s) => {
                out.push(TYPE_STRING_ASCII);
                write_len_prefixed(out, s.as_bytes());
            }
            ClarityValue::StringUtf8(s) => {
                out.push(TYPE_STRING_UTF8);
                write_len_prefixed(out, s.as_bytes());
            }
        }
    }
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

pub(crate) fn write_address(out: &mut Vec<u8>, address: &StacksAddress) {
    out.push(address.version);
    out.extend_from_slice(&address.hash160);
}

/// One-byte length prefix followed by the name bytes.
pub(crate) fn write_name(out: &mut Vec<u8>, name: &str) {
    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
}

/// Contract, function and asset names: ASCII, 1..=128 bytes, leading letter.
pub(crate) fn validate_name(name: &str) -> Result<(), StacksError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_!?+<>=/*".contains(c));
    if valid {
        Ok(())
    } else {
        Err(StacksError::InvalidClarityValue(format!(
            "invalid contract or function name `{name}`"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_is_sixteen_bytes_big_endian() {
        let bytes = ClarityValue::uint(1000u64).serialize();
        assert_eq!(bytes.len(), 17);
        assert_eq!(bytes[0], TYPE_UINT);
        assert_eq!(&bytes[15..], &[0x03, 0xe8]);
    }

    #[test]
    fn int_preserves_sign() {
        let bytes = ClarityValue::Int(-1).serialize();
        assert_eq!(bytes[0], TYPE_INT);
        assert!(bytes[1..].iter().all(|b| *b == 0xff));
    }

    #[test]
    fn standard_principal_layout() {
        let value = ClarityValue::principal("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7").unwrap();
        let bytes = value.serialize();
        assert_eq!(bytes.len(), 22);
        assert_eq!(bytes[0], TYPE_PRINCIPAL_STANDARD);
        assert_eq!(bytes[1], 22);
        assert_eq!(
            hex::encode(&bytes[2..]),
            "a46ff88886c2ef9762d970b4d2c63678835bd39d"
        );
    }

    #[test]
    fn contract_principal_appends_name() {
        let value =
            ClarityValue::principal("SM3VDXK3WZZSA84XXFKAFAF15NNZX32CTSG82JFQ4.sbtc-token")
                .unwrap();
        let bytes = value.serialize();
        assert_eq!(bytes[0], TYPE_PRINCIPAL_CONTRACT);
        assert_eq!(bytes[22], "sbtc-token".len() as u8);
        assert_eq!(&bytes[23..], b"sbtc-token");
    }

    #[test]
    fn bad_contract_name_is_rejected() {
        assert!(ClarityValue::principal("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7.1abc").is_err());
        assert!(ClarityValue::principal("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7.").is_err());
    }

    #[test]
    fn optionals_and_bools() {
        assert_eq!(ClarityValue::OptionalNone.serialize(), vec![0x09]);
        assert_eq!(
            ClarityValue::some(ClarityValue::Bool(true)).serialize(),
            vec![0x0a, 0x03]
        );
        assert_eq!(ClarityValue::Bool(false).serialize(), vec![0x04]);
    }

    #[test]
    fn tuple_entries_are_sorted() {
        let tuple = ClarityValue::Tuple(vec![
            ("b".to_string(), ClarityValue::Bool(true)),
            ("a".to_string(), ClarityValue::Bool(false)),
        ]);
        assert_eq!(
            tuple.serialize(),
            vec![0x0c, 0, 0, 0, 2, 1, b'a', 0x04, 1, b'b', 0x03]
        );
    }

    #[test]
    fn string_ascii_rejects_unicode() {
        assert!(ClarityValue::string_ascii("héllo").is_err());
        assert_eq!(
            ClarityValue::string_ascii("hi").unwrap().serialize(),
            vec![0x0d, 0, 0, 0, 2, b'h', b'i']
        );
    }
}
