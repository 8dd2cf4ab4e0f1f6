use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;
use crate::identity::{PolicyId, CREDENTIAL_HASH_LEN};

/// Hex length of the policy segment at the front of a unit string.
const POLICY_HEX_LEN: usize = CREDENTIAL_HASH_LEN * 2;

/// Arbitrary-bytes asset name.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Name from human-readable text (stored as its UTF-8 bytes).
    pub fn from_text(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Text rendering when the name is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl fmt::Debug for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "AssetName({text:?})"),
            None => write!(f, "AssetName(0x{})", self.to_hex()),
        }
    }
}

impl Serialize for AssetName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AssetName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s)
            .map(AssetName)
            .map_err(serde::de::Error::custom)
    }
}

/// Asset identifier: (minting policy, asset name).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId {
    pub policy: PolicyId,
    pub name: AssetName,
}

impl AssetId {
    pub fn new(policy: PolicyId, name: AssetName) -> Self {
        Self { policy, name }
    }

    /// The ledger's native coin: all-zero policy, empty name.
    ///
    /// Wallet outputs hold it to pay for script publication and to give
    /// every transaction at least one input.
    pub fn coin() -> Self {
        Self {
            policy: PolicyId::from_raw([0u8; CREDENTIAL_HASH_LEN]),
            name: AssetName::default(),
        }
    }

    pub fn is_coin(&self) -> bool {
        *self == Self::coin()
    }

    /// Compact unit string: `hex(policy) ‖ hex(name)`.
    pub fn to_unit(&self) -> String {
        format!("{}{}", self.policy.to_hex(), self.name.to_hex())
    }

    /// Inverse of [`AssetId::to_unit`].
    pub fn from_unit(unit: &str) -> Result<Self, TypeError> {
        let malformed = |reason: &str| TypeError::MalformedUnit {
            unit: unit.to_string(),
            reason: reason.to_string(),
        };
        if unit.len() < POLICY_HEX_LEN {
            return Err(malformed("shorter than the policy segment"));
        }
        if !unit.is_char_boundary(POLICY_HEX_LEN) {
            return Err(malformed("not a hex string"));
        }
        let (policy_hex, name_hex) = unit.split_at(POLICY_HEX_LEN);
        let policy = PolicyId::from_hex(policy_hex).map_err(|_| malformed("invalid policy segment"))?;
        let name = hex::decode(name_hex).map_err(|_| malformed("invalid name segment"))?;
        Ok(Self {
            policy,
            name: AssetName(name),
        })
    }

    /// Human-facing form `policy:name` with the name as text.
    pub fn labeled(&self) -> String {
        match self.name.as_text() {
            Some(text) if !text.starts_with("0x") => format!("{}:{}", self.policy.to_hex(), text),
            _ => format!("{}:0x{}", self.policy.to_hex(), self.name.to_hex()),
        }
    }

    /// Parse the `policy:name` form produced by [`AssetId::labeled`].
    pub fn from_labeled(text: &str) -> Result<Self, TypeError> {
        let malformed = |reason: &str| TypeError::MalformedUnit {
            unit: text.to_string(),
            reason: reason.to_string(),
        };
        let (policy_hex, name) = text
            .split_once(':')
            .ok_or_else(|| malformed("expected policy:name"))?;
        let policy = PolicyId::from_hex(policy_hex).map_err(|_| malformed("invalid policy segment"))?;
        let name = match name.strip_prefix("0x") {
            Some(hex_name) => {
                AssetName(hex::decode(hex_name).map_err(|_| malformed("invalid hex name"))?)
            }
            None => AssetName::from_text(name),
        };
        Ok(Self { policy, name })
    }

    /// Accept either the compact unit or the labeled form.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        if text.contains(':') {
            Self::from_labeled(text)
        } else {
            Self::from_unit(text)
        }
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.labeled())
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labeled())
    }
}
