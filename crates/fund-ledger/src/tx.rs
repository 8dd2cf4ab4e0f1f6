use std::collections::{BTreeMap, BTreeSet};

use fund_crypto::{script_hash, tx_id, Signature, VerifyingKey};
use fund_types::{Address, AssetId, Datum, Identity, Output, Script, ScriptHash, TxId, Value};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// How a transaction gets hold of a validator it needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptWitness {
    /// Validator bytes embedded in the transaction.
    Inline(Script),
    /// A live output carrying a previously published copy.
    Reference(Output),
}

impl ScriptWitness {
    pub fn script_hash(&self) -> Option<ScriptHash> {
        match self {
            ScriptWitness::Inline(script) => Some(script_hash(script)),
            ScriptWitness::Reference(output) => output.script_ref.as_ref().map(script_hash),
        }
    }
}

/// Net mint (positive) / burn (negative) quantities per asset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(AssetId, BigInt)>", into = "Vec<(AssetId, BigInt)>")]
pub struct Mint(BTreeMap<AssetId, BigInt>);

impl Mint {
    /// Accumulate `delta`; entries that net to zero disappear.
    pub fn add(&mut self, asset: &AssetId, delta: &BigInt) {
        let entry = self.0.entry(asset.clone()).or_insert_with(BigInt::zero);
        *entry += delta;
        if entry.is_zero() {
            self.0.remove(asset);
        }
    }

    pub fn quantity_of(&self, asset: &AssetId) -> BigInt {
        self.0.get(asset).cloned().unwrap_or_else(BigInt::zero)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &BigInt)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<(AssetId, BigInt)>> for Mint {
    fn from(entries: Vec<(AssetId, BigInt)>) -> Self {
        let mut mint = Mint::default();
        for (asset, delta) in &entries {
            mint.add(asset, delta);
        }
        mint
    }
}

impl From<Mint> for Vec<(AssetId, BigInt)> {
    fn from(mint: Mint) -> Self {
        mint.0.into_iter().collect()
    }
}

/// An output a transaction will create.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: Address,
    pub value: Value,
    pub datum: Option<Datum>,
    pub script_ref: Option<Script>,
}

impl TxOutput {
    pub fn new(address: Address, value: Value) -> Self {
        Self {
            address,
            value,
            datum: None,
            script_ref: None,
        }
    }

    pub fn with_datum(mut self, datum: Datum) -> Self {
        self.datum = Some(datum);
        self
    }

    pub fn with_script_ref(mut self, script: Script) -> Self {
        self.script_ref = Some(script);
        self
    }
}

/// A fully described transaction awaiting signatures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    /// Outputs consumed.
    pub inputs: Vec<Output>,
    /// Outputs read without being consumed (membership proofs, published scripts).
    pub reference_inputs: Vec<Output>,
    pub mint: Mint,
    pub outputs: Vec<TxOutput>,
    pub required_signers: BTreeSet<Identity>,
    /// Inline validators.
    pub scripts: Vec<Script>,
}

impl UnsignedTx {
    /// Content-derived transaction id.
    pub fn id(&self) -> LedgerResult<TxId> {
        let body = serde_json::to_vec(self).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(tx_id(&body))
    }

    /// Total value consumed by the inputs.
    pub fn consumed(&self) -> Value {
        let mut total = Value::new();
        for input in &self.inputs {
            total.merge(&input.value);
        }
        total
    }

    /// Total value placed in the new outputs.
    pub fn produced(&self) -> Value {
        let mut total = Value::new();
        for output in &self.outputs {
            total.merge(&output.value);
        }
        total
    }
}

/// Incremental builder for [`UnsignedTx`].
#[derive(Clone, Debug, Default)]
pub struct TxBuilder {
    tx: UnsignedTx,
}

impl TxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume outputs. Duplicates are ignored.
    pub fn collect_from(mut self, outputs: impl IntoIterator<Item = Output>) -> Self {
        for output in outputs {
            if !self.tx.inputs.iter().any(|i| i.out_ref == output.out_ref) {
                self.tx.inputs.push(output);
            }
        }
        self
    }

    /// Reference outputs without consuming them. Duplicates are ignored.
    pub fn read_from(mut self, outputs: impl IntoIterator<Item = Output>) -> Self {
        for output in outputs {
            if !self
                .tx
                .reference_inputs
                .iter()
                .any(|i| i.out_ref == output.out_ref)
            {
                self.tx.reference_inputs.push(output);
            }
        }
        self
    }

    /// Mint (positive) or burn (negative) `delta` units of `asset`.
    pub fn mint(mut self, asset: &AssetId, delta: impl Into<BigInt>) -> Self {
        self.tx.mint.add(asset, &delta.into());
        self
    }

    pub fn pay_to(mut self, output: TxOutput) -> Self {
        self.tx.outputs.push(output);
        self
    }

    /// Pay `value` to a script address with an attached datum.
    pub fn pay_to_contract(self, address: Address, datum: Datum, value: Value) -> Self {
        self.pay_to(TxOutput::new(address, value).with_datum(datum))
    }

    pub fn add_signer(mut self, identity: Identity) -> Self {
        self.tx.required_signers.insert(identity);
        self
    }

    /// Attach a validator, inline or by reference.
    pub fn attach_script(mut self, witness: ScriptWitness) -> Self {
        match witness {
            ScriptWitness::Inline(script) => {
                if !self.tx.scripts.contains(&script) {
                    self.tx.scripts.push(script);
                }
                self
            }
            ScriptWitness::Reference(output) => self.read_from([output]),
        }
    }

    pub fn build(self) -> UnsignedTx {
        self.tx
    }
}

/// Signature by one key over the transaction id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VKeyWitness {
    pub key: VerifyingKey,
    pub signature: Signature,
}

/// A transaction plus the key witnesses collected for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub id: TxId,
    pub tx: UnsignedTx,
    pub witnesses: Vec<VKeyWitness>,
}

impl SignedTx {
    /// Identities whose signatures verify against this transaction's id.
    pub fn signers(&self) -> BTreeSet<Identity> {
        self.witnesses
            .iter()
            .filter(|w| w.key.verify(self.id.as_bytes(), &w.signature).is_ok())
            .map(|w| w.key.to_identity())
            .collect()
    }
}
