// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Turnkey API-key request stamping.
//!
//! Each request body is signed with the API key (ECDSA P-256 / SHA-256) and
//! the signature travels in the `X-Stamp` header as base64url JSON.

use base64ct::{Base64UrlUnpadded, Encoding};
use p256::ecdsa::{signature::Signer, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use super::TurnkeyError;

/// Header carrying the request stamp.
pub const STAMP_HEADER: &str = "X-Stamp";

/// Signature scheme identifier for P-256 API keys.
pub const STAMP_SCHEME: &str = "SIGNATURE_SCHEME_TK_API_P256";

/// Stamp payload before base64url encoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stamp {
    pub public_key: String,
    pub scheme: String,
    /// DER-encoded signature, hex.
    pub signature: String,
}

/// Signs request bodies with a Turnkey API key pair.
#[derive(Clone)]
pub struct ApiKeyStamper {
    public_key: String,
    signing_key: SigningKey,
}

impl std::fmt::Debug for ApiKeyStamper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyStamper")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl ApiKeyStamper {
    /// Build from hex-encoded keys, checking that they belong together.
    pub fn new(public_key_hex: &str, private_key_hex: &str) -> Result<Self, TurnkeyError> {
        let private = hex::decode(private_key_hex.trim())
            .map_err(|e| TurnkeyError::InvalidApiKey(format!("private key is not hex: {e}")))?;
        let signing_key = SigningKey::from_slice(&private)
            .map_err(|e| TurnkeyError::InvalidApiKey(format!("invalid P-256 private key: {e}")))?;

        let public = hex::decode(public_key_hex.trim())
            .map_err(|e| TurnkeyError::InvalidApiKey(format!("public key is not hex: {e}")))?;
        let configured = VerifyingKey::from_sec1_bytes(&public)
            .map_err(|e| TurnkeyError::InvalidApiKey(format!("invalid P-256 public key: {e}")))?;

        if &configured != signing_key.verifying_key() {
            return Err(TurnkeyError::InvalidApiKey(
                "public key does not match private key".to_string(),
            ));
        }

        Ok(Self {
            public_key: public_key_hex.trim().to_ascii_lowercase(),
            signing_key,
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Sign `body` and return the `X-Stamp` header value.
    pub fn stamp(&self, body: &[u8]) -> Result<String, TurnkeyError> {
        let signature: Signature = self
            .signing_key
            .try_sign(body)
            .map_err(|e| TurnkeyError::Signing(e.to_string()))?;

        let stamp = Stamp {
            public_key: self.public_key.clone(),
            scheme: STAMP_SCHEME.to_string(),
            signature: hex::encode(signature.to_der().as_bytes()),
        };
        let json = serde_json::to_vec(&stamp)
            .map_err(|e| TurnkeyError::Signing(format!("serialize stamp failed: {e}")))?;

        Ok(Base64UrlUnpadded::encode_string(&json))
    }
}

#[cfg(test)]
pub(crate) fn test_key_pair() -> (String, String) {
    let signing_key = SigningKey::from_slice(&[0x2a; 32]).unwrap();
    let public = signing_key.verifying_key().to_encoded_point(true);
    (hex::encode(public.as_bytes()), hex::encode([0x2a; 32]))
}

#[cfg(test)]
pub(crate) fn test_stamper() -> ApiKeyStamper {
    let (public, private) = test_key_pair();
    ApiKeyStamper::new(&public, &private).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::signature::Verifier;

    fn key_pair() -> (String, String) {
        test_key_pair()
    }

    fn decode_stamp(header: &str) -> Stamp {
        let json = Base64UrlUnpadded::decode_vec(header).unwrap();
        serde_json::from_slice(&json).unwrap()
    }

    #[test]
    fn stamp_verifies_against_public_key() {
        let (public, private) = key_pair();
        let stamper = ApiKeyStamper::new(&public, &private).unwrap();
        let body = br#"{"organizationId":"org"}"#;

        let stamp = decode_stamp(&stamper.stamp(body).unwrap());
        assert_eq!(stamp.scheme, STAMP_SCHEME);
        assert_eq!(stamp.public_key, public);

        let verifying_key = VerifyingKey::from_sec1_bytes(&hex::decode(&public).unwrap()).unwrap();
        let der = hex::decode(&stamp.signature).unwrap();
        let signature = Signature::from_der(&der).unwrap();
        assert!(verifying_key.verify(body, &signature).is_ok());
        assert!(verifying_key.verify(b"tampered", &signature).is_err());
    }

    #[test]
    fn mismatched_keys_are_rejected() {
        let (public, _) = key_pair();
        let other_private = hex::encode([0x2b; 32]);
        let err = ApiKeyStamper::new(&public, &other_private).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(ApiKeyStamper::new("zz", &hex::encode([1u8; 32])).is_err());
        assert!(ApiKeyStamper::new("02ab", "00").is_err());
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let (public, private) = key_pair();
        let stamper = ApiKeyStamper::new(&public, &private).unwrap();
        let debug = format!("{stamper:?}");
        assert!(!debug.contains(&private));
    }
}
