// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recoverable secp256k1 signatures in Stacks' VRS layout.
//!
//! Turnkey returns raw-payload signatures as separate `r`, `s` and `v` hex
//! strings. Stacks expects 65 bytes: recovery id, then `r`, then `s`.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use super::address::decode_hex;
use super::client::StacksError;

/// Signature length in a spending condition.
pub const SIGNATURE_LEN: usize = 65;

/// 65-byte recoverable signature (`v || r || s`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MessageSignature([u8; SIGNATURE_LEN]);

impl std::fmt::Debug for MessageSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageSignature({})", hex::encode(self.0))
    }
}

impl MessageSignature {
    /// All-zero placeholder used in unsigned transactions.
    pub const fn empty() -> Self {
        Self([0u8; SIGNATURE_LEN])
    }

    pub const fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// Parse 130 hex characters in VRS order.
    pub fn from_hex(input: &str) -> Result<Self, StacksError> {
        let bytes = decode_hex(input).map_err(StacksError::InvalidSignature)?;
        let bytes: [u8; SIGNATURE_LEN] = bytes.as_slice().try_into().map_err(|_| {
            StacksError::InvalidSignature(format!(
                "expected {SIGNATURE_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Assemble from Turnkey's split components.
    ///
    /// `r` and `s` are left-padded to 32 bytes; Turnkey drops leading zeros.
    pub fn from_rsv(r: &str, s: &str, v: &str) -> Result<Self, StacksError> {
        let strip = |x: &str| -> String {
            let x = x.trim();
            x.strip_prefix("0x").unwrap_or(x).to_string()
        };
        let (r, s, v) = (strip(r), strip(s), strip(v));
        if r.len() > 64 || s.len() > 64 {
            return Err(StacksError::InvalidSignature(
                "r and s must be at most 32 bytes".to_string(),
            ));
        }
        let v = if v.len() == 1 { format!("0{v}") } else { v };
        Self::from_hex(&format!("{v}{r:0>64}{s:0>64}"))
    }

    /// Recover the signing key for a 32-byte prehash.
    pub fn recover(&self, prehash: &[u8; 32]) -> Result<VerifyingKey, StacksError> {
        let recovery_id = RecoveryId::from_byte(self.0[0]).ok_or_else(|| {
            StacksError::InvalidSignature(format!("invalid recovery id {}", self.0[0]))
        })?;
        let signature = Signature::from_slice(&self.0[1..])
            .map_err(|e| StacksError::InvalidSignature(e.to_string()))?;
        VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id)
            .map_err(|e| StacksError::InvalidSignature(e.to_string()))
    }

    /// Check the signature was produced by `public_key` (SEC1, hex) over `prehash`.
    pub fn verify(&self, prehash: &[u8; 32], public_key_hex: &str) -> Result<(), StacksError> {
        let expected = decode_hex(public_key_hex).map_err(StacksError::InvalidPublicKey)?;
        let expected = VerifyingKey::from_sec1_bytes(&expected)
            .map_err(|e| StacksError::InvalidPublicKey(e.to_string()))?;
        let recovered = self.recover(prehash)?;
        if recovered == expected {
            Ok(())
        } else {
            Err(StacksError::SignatureMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    fn sign(key: &SigningKey, prehash: &[u8; 32]) -> (String, String, String) {
        let (signature, recovery_id) = key.sign_prehash_recoverable(prehash).unwrap();
        let bytes = signature.to_bytes();
        (
            hex::encode(&bytes[..32]),
            hex::encode(&bytes[32..]),
            format!("{:02x}", recovery_id.to_byte()),
        )
    }

    #[test]
    fn assembles_vrs_from_turnkey_components() {
        let signature = MessageSignature::from_rsv("ab", "0xcd", "1").unwrap();
        let bytes = signature.as_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[32], 0xab);
        assert_eq!(bytes[64], 0xcd);
        assert!(bytes[1..32].iter().all(|b| *b == 0));
        assert!(bytes[33..64].iter().all(|b| *b == 0));
    }

    #[test]
    fn oversized_component_is_rejected() {
        let r = "00".repeat(33);
        assert!(MessageSignature::from_rsv(&r, "01", "00").is_err());
    }

    #[test]
    fn recovers_and_verifies_signer() {
        let key = SigningKey::from_slice(&[5u8; 32]).unwrap();
        let public_hex = hex::encode(key.verifying_key().to_encoded_point(false).as_bytes());
        let prehash = [0x42u8; 32];
        let (r, s, v) = sign(&key, &prehash);

        let signature = MessageSignature::from_rsv(&r, &s, &v).unwrap();
        assert!(signature.verify(&prehash, &public_hex).is_ok());
    }

    #[test]
    fn wrong_key_is_a_mismatch() {
        let key = SigningKey::from_slice(&[5u8; 32]).unwrap();
        let other = SigningKey::from_slice(&[6u8; 32]).unwrap();
        let other_hex = hex::encode(other.verifying_key().to_encoded_point(true).as_bytes());
        let prehash = [0x11u8; 32];
        let (r, s, v) = sign(&key, &prehash);

        let signature = MessageSignature::from_rsv(&r, &s, &v).unwrap();
        assert!(matches!(
            signature.verify(&prehash, &other_hex),
            Err(StacksError::SignatureMismatch)
        ));
    }

    #[test]
    fn empty_signature_is_all_zeros() {
        assert!(MessageSignature::empty().as_bytes().iter().all(|b| *b == 0));
    }
}
