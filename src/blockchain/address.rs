// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stacks addresses: c32check encoding and public key derivation.

use std::fmt;
use std::str::FromStr;

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use super::client::StacksError;
use super::types::Network;

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// A Stacks account address (version byte + hash160).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StacksAddress {
    pub version: u8,
    pub hash160: [u8; 20],
}

impl StacksAddress {
    pub fn new(version: u8, hash160: [u8; 20]) -> Result<Self, StacksError> {
        if version >= 32 {
            return Err(StacksError::InvalidAddress(format!(
                "address version {version} is out of range"
            )));
        }
        Ok(Self { version, hash160 })
    }

    /// Single-sig address of a SEC1-encoded secp256k1 public key.
    pub fn from_public_key(public_key: &[u8], network: Network) -> Result<Self, StacksError> {
        k256::PublicKey::from_sec1_bytes(public_key)
            .map_err(|e| StacksError::InvalidPublicKey(e.to_string()))?;
        Self::new(network.config().single_sig_version, hash160(public_key))
    }
}

impl fmt::Display for StacksAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", c32check_encode(self.version, &self.hash160))
    }
}

impl FromStr for StacksAddress {
    type Err = StacksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix('S')
            .ok_or_else(|| StacksError::InvalidAddress(format!("{s}: missing `S` prefix")))?;
        let (version, data) = c32check_decode(body)?;
        let hash160: [u8; 20] = data.as_slice().try_into().map_err(|_| {
            StacksError::InvalidAddress(format!("{s}: expected 20-byte hash, got {}", data.len()))
        })?;
        Self::new(version, hash160)
    }
}

/// Derive the Stacks address for a hex-encoded public key.
///
/// Turnkey reports secp256k1 wallet accounts as their (uncompressed) public
/// key, so this is how a Turnkey address becomes a Stacks address.
pub fn public_key_to_address(
    public_key_hex: &str,
    network: Network,
) -> Result<String, StacksError> {
    let bytes = decode_hex(public_key_hex).map_err(StacksError::InvalidPublicKey)?;
    Ok(StacksAddress::from_public_key(&bytes, network)?.to_string())
}

/// RIPEMD160(SHA256(data)).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let mut out = [0u8; 20];
    out.copy_from_slice(&Ripemd160::digest(sha));
    out
}

/// Decode hex with an optional `0x` prefix.
pub(crate) fn decode_hex(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| format!("invalid hex `{trimmed}`: {e}"))
}

/// Encode bytes as c32. Each leading zero byte becomes a leading `0`.
pub fn c32_encode(data: &[u8]) -> String {
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 8 / 5 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;

    for &byte in data.iter().rev() {
        acc |= u32::from(byte) << bits;
        bits += 8;
        while bits >= 5 {
            digits.push(C32_ALPHABET[(acc & 0x1f) as usize]);
            acc >>= 5;
            bits -= 5;
        }
    }
    if bits > 0 {
        digits.push(C32_ALPHABET[(acc & 0x1f) as usize]);
    }

    while digits.last() == Some(&b'0') {
        digits.pop();
    }
    let leading_zero_bytes = data.iter().take_while(|b| **b == 0).count();
    digits.extend(std::iter::repeat_n(b'0', leading_zero_bytes));
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// Decode c32 text. Accepts lower case and the `O`/`I`/`L` look-alikes.
pub fn c32_decode(input: &str) -> Result<Vec<u8>, StacksError> {
    let values = input
        .chars()
        .map(c32_value)
        .collect::<Result<Vec<u8>, _>>()?;

    let mut bytes: Vec<u8> = Vec::with_capacity(values.len() * 5 / 8 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;

    for &value in values.iter().rev() {
        acc |= u32::from(value) << bits;
        bits += 5;
        if bits >= 8 {
            bytes.push((acc & 0xff) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        bytes.push((acc & 0xff) as u8);
    }

    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    let leading_zero_digits = values.iter().take_while(|v| **v == 0).count();
    bytes.extend(std::iter::repeat_n(0u8, leading_zero_digits));
    bytes.reverse();

    Ok(bytes)
}

fn c32_value(c: char) -> Result<u8, StacksError> {
    let normalized = match c.to_ascii_uppercase() {
        'O' => '0',
        'I' | 'L' => '1',
        other => other,
    };
    C32_ALPHABET
        .iter()
        .position(|&a| char::from(a) == normalized)
        .map(|p| p as u8)
        .ok_or_else(|| StacksError::InvalidAddress(format!("invalid c32 character `{c}`")))
}

fn c32_checksum(version: u8, data: &[u8]) -> [u8; 4] {
    let mut hasher = Sha256::new();
    hasher.update([version]);
    hasher.update(data);
    let twice = Sha256::digest(hasher.finalize());
    [twice[0], twice[1], twice[2], twice[3]]
}

/// c32check: version character followed by c32(data || checksum).
pub fn c32check_encode(version: u8, data: &[u8]) -> String {
    let mut payload = data.to_vec();
    payload.extend_from_slice(&c32_checksum(version, data));
    let version_char = char::from(C32_ALPHABET[usize::from(version & 0x1f)]);
    format!("{version_char}{}", c32_encode(&payload))
}

/// Inverse of [`c32check_encode`], verifying the checksum.
pub fn c32check_decode(input: &str) -> Result<(u8, Vec<u8>), StacksError> {
    let mut chars = input.chars();
    let version = chars
        .next()
        .ok_or_else(|| StacksError::InvalidAddress("empty c32check string".to_string()))
        .and_then(c32_value)?;

    let mut data = c32_decode(chars.as_str())?;
    if data.len() < 4 {
        return Err(StacksError::InvalidAddress(format!(
            "{input}: too short for a checksum"
        )));
    }
    let checksum = data.split_off(data.len() - 4);
    if checksum != c32_checksum(version, &data) {
        return Err(StacksError::InvalidAddress(format!("{input}: bad checksum")));
    }
    Ok((version, data))
}
