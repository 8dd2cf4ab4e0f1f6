//! Wallet keys and transaction witnesses.
//!
//! A participant is known to the fund only by the [`Identity`] derived from
//! their public key. Keys travel as lowercase hex in stores and snapshots.

use fund_types::Identity;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hasher::key_identity;

/// Secret half of a wallet key. Never printed.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Public half of a wallet key, carried in every witness.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Witness signature over a transaction id.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature does not match key and message")]
    InvalidSignature,
    #[error("malformed key material")]
    InvalidKey,
}

fn decode_fixed<const N: usize>(text: &str) -> Option<[u8; N]> {
    hex::decode(text).ok()?.try_into().ok()
}

impl SigningKey {
    /// Fresh key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self(ed25519_dalek::SigningKey::generate(&mut rand::thread_rng()))
    }

    pub fn from_bytes(secret: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&secret))
    }

    /// Restore a key saved with [`SigningKey::to_hex`].
    pub fn from_hex(text: &str) -> Result<Self, SignatureError> {
        decode_fixed::<32>(text)
            .map(Self::from_bytes)
            .ok_or(SignatureError::InvalidKey)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    pub fn identity(&self) -> Identity {
        self.verifying_key().to_identity()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        use ed25519_dalek::Signer;
        Signature(self.0.sign(message))
    }
}

impl Clone for SigningKey {
    fn clone(&self) -> Self {
        Self::from_bytes(*self.as_bytes())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(for {})", self.identity())
    }
}

impl VerifyingKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, SignatureError> {
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map(Self)
            .map_err(|_| SignatureError::InvalidKey)
    }

    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// The identity a transaction must list as required signer for this key.
    pub fn to_identity(&self) -> Identity {
        key_identity(&self.as_bytes())
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), SignatureError> {
        use ed25519_dalek::Verifier;
        self.0
            .verify(message, &signature.0)
            .map_err(|_| SignatureError::InvalidSignature)
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("VerifyingKey").field(&hex::encode(self.as_bytes())).finish()
    }
}

impl Serialize for VerifyingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.as_bytes()))
    }
}

impl<'de> Deserialize<'de> for VerifyingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = decode_fixed::<32>(&text)
            .ok_or_else(|| serde::de::Error::custom("public key must be 32 hex-encoded bytes"))?;
        Self::from_bytes(bytes).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.0.to_bytes();
        write!(f, "Signature({}..)", hex::encode(&bytes[..6]))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = decode_fixed::<64>(&text)
            .ok_or_else(|| serde::de::Error::custom("signature must be 64 hex-encoded bytes"))?;
        Ok(Self(ed25519_dalek::Signature::from_bytes(&bytes)))
    }
}
