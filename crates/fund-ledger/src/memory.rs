use std::collections::{BTreeSet, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use fund_crypto::{script_hash, ContentHasher};
use fund_types::{Address, AssetId, Output, OutputRef, ScriptHash, TxId, Value};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult, Rejection};
use crate::traits::LedgerClient;
use crate::tx::SignedTx;

/// In-memory UTXO ledger for tests, local devnets, and embedding.
///
/// Submission applies a transaction atomically: either every input is
/// consumed and every output created, or nothing changes. Only structural
/// rules are enforced; validator logic is never executed.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    /// Live outputs in creation order.
    live: Vec<Output>,
    confirmed: HashSet<TxId>,
    genesis_seq: u64,
    injected: Vec<Rejection>,
}

/// Serializable image of the ledger's live state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub outputs: Vec<Output>,
    pub confirmed: Vec<TxId>,
    pub genesis_seq: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
        }
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            inner: RwLock::new(LedgerState {
                live: snapshot.outputs,
                confirmed: snapshot.confirmed.into_iter().collect(),
                genesis_seq: snapshot.genesis_seq,
                injected: Vec::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> LedgerResult<LedgerSnapshot> {
        let state = self.read()?;
        let mut confirmed: Vec<TxId> = state.confirmed.iter().copied().collect();
        confirmed.sort();
        Ok(LedgerSnapshot {
            outputs: state.live.clone(),
            confirmed,
            genesis_seq: state.genesis_seq,
        })
    }

    /// Create an output out of thin air (faucet / genesis allocation).
    pub fn fund(&self, address: Address, value: Value) -> LedgerResult<OutputRef> {
        let mut state = self.write()?;
        state.genesis_seq += 1;
        let seed = format!("genesis:{}", state.genesis_seq);
        let tx_id = TxId::from_raw(ContentHasher::new("fund-genesis-v1").digest(seed.as_bytes()));
        let out_ref = OutputRef::new(tx_id, 0);
        state.live.push(Output {
            out_ref,
            address,
            value,
            datum: None,
            script_ref: None,
        });
        state.confirmed.insert(tx_id);
        debug!(%out_ref, %address, "genesis output created");
        Ok(out_ref)
    }

    /// Remove a live output as if a foreign transaction had spent it.
    pub fn consume_external(&self, out_ref: &OutputRef) -> LedgerResult<bool> {
        let mut state = self.write()?;
        let before = state.live.len();
        state.live.retain(|o| o.out_ref != *out_ref);
        Ok(state.live.len() != before)
    }

    /// Make the next submissions fail with the given reasons, in order.
    pub fn inject_rejections(&self, reasons: impl IntoIterator<Item = Rejection>) -> LedgerResult<()> {
        let mut state = self.write()?;
        state.injected.extend(reasons);
        Ok(())
    }

    /// Every live output, in creation order.
    pub fn all_outputs(&self) -> LedgerResult<Vec<Output>> {
        Ok(self.read()?.live.clone())
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, LedgerState>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger read lock poisoned".into()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, LedgerState>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Unavailable("ledger write lock poisoned".into()))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(state: &LedgerState, signed: &SignedTx) -> Result<(), Rejection> {
    let tx = &signed.tx;
    if tx.inputs.is_empty() {
        return Err(Rejection::NoInputs);
    }

    let mut seen = HashSet::new();
    for input in &tx.inputs {
        if !seen.insert(input.out_ref) {
            return Err(Rejection::DuplicateInput(input.out_ref));
        }
    }

    let is_live = |out: &Output| state.live.iter().any(|l| l == out);
    let stale: Vec<OutputRef> = tx
        .inputs
        .iter()
        .chain(tx.reference_inputs.iter())
        .filter(|o| !is_live(o))
        .map(|o| o.out_ref)
        .collect();
    if !stale.is_empty() {
        return Err(Rejection::BadInputs(stale));
    }

    check_conservation(signed)?;

    for (index, output) in tx.outputs.iter().enumerate() {
        if output.value.is_empty() {
            return Err(Rejection::ZeroValueOutput(index));
        }
    }

    check_scripts(signed)?;

    let signers = signed.signers();
    let key_inputs = tx.inputs.iter().filter_map(|i| i.address.key_identity());
    for required in tx.required_signers.iter().chain(key_inputs) {
        if !signers.contains(required) {
            return Err(Rejection::MissingSignature(*required));
        }
    }
    Ok(())
}

fn check_conservation(signed: &SignedTx) -> Result<(), Rejection> {
    let tx = &signed.tx;
    let consumed = tx.consumed();
    let produced = tx.produced();

    let mut assets: BTreeSet<&AssetId> = consumed.assets().collect();
    assets.extend(produced.assets());
    assets.extend(tx.mint.iter().map(|(asset, _)| asset));

    for asset in assets {
        let lhs: BigInt = consumed.amount_of(asset).to_signed() + tx.mint.quantity_of(asset);
        let rhs: BigInt = produced.amount_of(asset).to_signed();
        if lhs != rhs {
            return Err(Rejection::ValueNotConserved {
                asset: asset.to_unit(),
                consumed: lhs.to_string(),
                produced: rhs.to_string(),
            });
        }
    }
    Ok(())
}

fn check_scripts(signed: &SignedTx) -> Result<(), Rejection> {
    let tx = &signed.tx;
    let mut needed: BTreeSet<ScriptHash> = tx
        .inputs
        .iter()
        .filter_map(|i| i.address.script_hash().copied())
        .collect();
    needed.extend(tx.mint.iter().map(|(asset, _)| asset.policy));

    let inline: BTreeSet<ScriptHash> = tx.scripts.iter().map(script_hash).collect();
    let referenced: BTreeSet<ScriptHash> = tx
        .reference_inputs
        .iter()
        .chain(tx.inputs.iter())
        .filter_map(|o| o.script_ref.as_ref().map(script_hash))
        .collect();

    for hash in &needed {
        if !inline.contains(hash) && !referenced.contains(hash) {
            return Err(Rejection::MissingScriptWitness(*hash));
        }
    }
    for hash in &inline {
        if !needed.contains(hash) {
            return Err(Rejection::ExtraneousScriptWitness(*hash));
        }
    }
    Ok(())
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn outputs_at(&self, address: &Address) -> LedgerResult<Vec<Output>> {
        let state = self.read()?;
        Ok(state
            .live
            .iter()
            .filter(|o| o.address == *address)
            .cloned()
            .collect())
    }

    async fn outputs_at_with_asset(
        &self,
        address: &Address,
        asset: &AssetId,
    ) -> LedgerResult<Vec<Output>> {
        let state = self.read()?;
        Ok(state
            .live
            .iter()
            .filter(|o| o.address == *address && !o.quantity_of(asset).is_zero())
            .cloned()
            .collect())
    }

    async fn outputs_by_ref(&self, refs: &[OutputRef]) -> LedgerResult<Vec<Output>> {
        let state = self.read()?;
        Ok(refs
            .iter()
            .filter_map(|r| state.live.iter().find(|o| o.out_ref == *r).cloned())
            .collect())
    }

    async fn submit(&self, signed: &SignedTx) -> LedgerResult<TxId> {
        let mut state = self.write()?;
        let tx_id = signed.id;

        if !state.injected.is_empty() {
            let reason = state.injected.remove(0);
            warn!(%tx_id, %reason, "injected rejection");
            return Err(LedgerError::Rejected { tx_id, reason });
        }

        let computed = signed.tx.id()?;
        if computed != tx_id {
            return Err(LedgerError::Serialization(format!(
                "transaction id mismatch: declared {tx_id}, computed {computed}"
            )));
        }

        if let Err(reason) = validate(&state, signed) {
            warn!(%tx_id, %reason, "transaction rejected");
            return Err(LedgerError::Rejected { tx_id, reason });
        }

        let consumed: HashSet<OutputRef> = signed.tx.inputs.iter().map(|i| i.out_ref).collect();
        state.live.retain(|o| !consumed.contains(&o.out_ref));
        for (index, out) in signed.tx.outputs.iter().enumerate() {
            state.live.push(Output {
                out_ref: OutputRef::new(tx_id, index as u32),
                address: out.address,
                value: out.value.clone(),
                datum: out.datum.clone(),
                script_ref: out.script_ref.clone(),
            });
        }
        state.confirmed.insert(tx_id);
        info!(
            %tx_id,
            inputs = consumed.len(),
            outputs = signed.tx.outputs.len(),
            "transaction applied"
        );
        Ok(tx_id)
    }

    async fn await_confirmation(&self, tx_id: &TxId) -> LedgerResult<bool> {
        Ok(self.read()?.confirmed.contains(tx_id))
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.read().map(|s| s.live.len()).unwrap_or_default();
        f.debug_struct("InMemoryLedger")
            .field("live_outputs", &count)
            .finish()
    }
}
