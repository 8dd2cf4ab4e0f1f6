use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Length in bytes of every credential hash on the ledger.
pub const CREDENTIAL_HASH_LEN: usize = 28;

/// Participant identity: the 28-byte hash of a participant's credential.
///
/// Identities are independent of any address encoding. The registry stores
/// them in batch datums and the transfer fund tags each slot with one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity([u8; CREDENTIAL_HASH_LEN]);

/// Hash of a validator script. Doubles as a minting policy identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptHash([u8; CREDENTIAL_HASH_LEN]);

/// A minting policy is identified by the hash of its script.
pub type PolicyId = ScriptHash;

fn decode_hash(s: &str) -> Result<[u8; CREDENTIAL_HASH_LEN], TypeError> {
    let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
    if bytes.len() != CREDENTIAL_HASH_LEN {
        return Err(TypeError::InvalidLength {
            expected: CREDENTIAL_HASH_LEN,
            actual: bytes.len(),
        });
    }
    let mut arr = [0u8; CREDENTIAL_HASH_LEN];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

impl Identity {
    /// Create from a raw 28-byte hash.
    pub const fn from_raw(hash: [u8; CREDENTIAL_HASH_LEN]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; CREDENTIAL_HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string (56 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        decode_hash(s).map(Self)
    }
}

impl ScriptHash {
    pub const fn from_raw(hash: [u8; CREDENTIAL_HASH_LEN]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; CREDENTIAL_HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        decode_hash(s).map(Self)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.short_id())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptHash({})", self.short_hex())
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Identity {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl FromStr for ScriptHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Both hashes travel as hex strings in JSON so deployment files stay readable.
impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ScriptHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ScriptHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
