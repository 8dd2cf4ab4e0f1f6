use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::amount::Amount;
use crate::asset::AssetId;
use crate::error::TypeError;
use crate::identity::{Identity, ScriptHash};
use crate::value::Value;

/// Transaction identifier (32-byte hash of the transaction body).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId([u8; 32]);

impl TxId {
    pub const fn from_raw(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.short_hex())
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Reference to a ledger output: `(transaction id, output index)`.
///
/// Ordering is by transaction id, then index, which gives selection code a
/// deterministic tie-break independent of ledger return order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputRef {
    pub tx_id: TxId,
    pub index: u32,
}

impl OutputRef {
    pub fn new(tx_id: TxId, index: u32) -> Self {
        Self { tx_id, index }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_id, self.index)
    }
}

impl FromStr for OutputRef {
    type Err = TypeError;

    /// Parse `txid#index`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| TypeError::MalformedReference {
            reference: s.to_string(),
            reason,
        };
        let (tx_hex, index_str) = s
            .split_once('#')
            .ok_or_else(|| malformed("expected txHash#outputIndex".into()))?;
        let tx_id = TxId::from_hex(tx_hex).map_err(|e| malformed(e.to_string()))?;
        let index = index_str
            .parse::<u32>()
            .map_err(|_| malformed(format!("invalid output index '{index_str}'")))?;
        Ok(Self { tx_id, index })
    }
}

/// Owning address of an output: a key credential or a script credential.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "hash")]
pub enum Address {
    Key(Identity),
    Script(ScriptHash),
}

impl Address {
    /// Script address nobody can satisfy; published scripts are parked here.
    pub const fn unspendable() -> Self {
        Address::Script(ScriptHash::from_raw([0u8; 28]))
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Address::Script(_))
    }

    pub fn script_hash(&self) -> Option<&ScriptHash> {
        match self {
            Address::Script(hash) => Some(hash),
            Address::Key(_) => None,
        }
    }

    pub fn key_identity(&self) -> Option<&Identity> {
        match self {
            Address::Key(id) => Some(id),
            Address::Script(_) => None,
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Key(id) => write!(f, "key:{id}"),
            Address::Script(hash) => write!(f, "script:{hash}"),
        }
    }
}

/// Structured data attached to an output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Datum {
    /// Ordered identity list of a registry batch.
    Registry(Vec<Identity>),
    /// Single owner of a transfer slot.
    Owner(Identity),
    /// Unit datum (published script holders).
    Void,
}

/// Language tag of a validator script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptLanguage {
    Native,
    PlutusV1,
    PlutusV2,
    PlutusV3,
}

/// Validator bytes plus their language.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    pub language: ScriptLanguage,
    #[serde(with = "hex_bytes")]
    pub code: Vec<u8>,
}

impl Script {
    pub fn new(language: ScriptLanguage, code: impl Into<Vec<u8>>) -> Self {
        Self {
            language,
            code: code.into(),
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({:?}, {} bytes)", self.language, self.code.len())
    }
}

/// A live ledger output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub out_ref: OutputRef,
    pub address: Address,
    pub value: Value,
    pub datum: Option<Datum>,
    pub script_ref: Option<Script>,
}

impl Output {
    /// Quantity of `asset` held at this output.
    pub fn quantity_of(&self, asset: &AssetId) -> Amount {
        self.value.amount_of(asset)
    }

    /// Identities listed in a registry datum, if this output carries one.
    pub fn registry_identities(&self) -> Option<&[Identity]> {
        match &self.datum {
            Some(Datum::Registry(ids)) => Some(ids.as_slice()),
            _ => None,
        }
    }

    /// Owner identity of a transfer slot, if this output carries one.
    pub fn owner(&self) -> Option<&Identity> {
        match &self.datum {
            Some(Datum::Owner(id)) => Some(id),
            _ => None,
        }
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
