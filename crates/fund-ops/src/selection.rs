//! Greedy output selection.
//!
//! Every function here is pure over the candidate list it is given, so the
//! result depends only on the candidates and their order. Callers apply a
//! [`SelectionOrder`] first via [`order_candidates`].

use std::collections::BTreeSet;

use fund_types::{Amount, AssetId, Identity, Output, Value};
use fund_ledger::Mint;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::config::SelectionOrder;

pub fn order_candidates(mut outputs: Vec<Output>, order: SelectionOrder) -> Vec<Output> {
    if order == SelectionOrder::ByOutputRef {
        outputs.sort_by_key(|o| o.out_ref);
    }
    outputs
}

/// Whether a batch lists `identity` and still holds at least one unit of
/// the capability token.
pub fn batch_admits(batch: &Output, identity: &Identity, admin_token: &AssetId) -> bool {
    batch
        .registry_identities()
        .is_some_and(|ids| ids.contains(identity))
        && !batch.quantity_of(admin_token).is_zero()
}

/// First batch admitting `identity`.
pub fn find_membership<'a>(
    batches: &'a [Output],
    identity: &Identity,
    admin_token: &AssetId,
) -> Option<&'a Output> {
    batches
        .iter()
        .find(|b| batch_admits(b, identity, admin_token))
}

/// First batch whose list contains `identity`, regardless of token holdings.
pub fn find_listing<'a>(batches: &'a [Output], identity: &Identity) -> Option<&'a Output> {
    batches.iter().find(|b| {
        b.registry_identities()
            .is_some_and(|ids| ids.contains(identity))
    })
}

/// Walk batches in order, keeping each one that admits a still-uncovered
/// identity, until every identity is covered.
///
/// Returns the first uncovered identity (in `identities` order) when the
/// batches run out.
pub fn cover_identities(
    batches: &[Output],
    identities: &[Identity],
    admin_token: &AssetId,
) -> Result<Vec<Output>, Identity> {
    let mut uncovered: BTreeSet<Identity> = identities.iter().copied().collect();
    let mut chosen = Vec::new();
    for batch in batches {
        if uncovered.is_empty() {
            break;
        }
        let hits: Vec<Identity> = uncovered
            .iter()
            .filter(|id| batch_admits(batch, id, admin_token))
            .copied()
            .collect();
        if !hits.is_empty() {
            for id in &hits {
                uncovered.remove(id);
            }
            chosen.push(batch.clone());
        }
    }
    match identities.iter().find(|id| uncovered.contains(*id)) {
        Some(missing) => Err(*missing),
        None => Ok(chosen),
    }
}

/// Accumulate outputs in order until they hold at least `required` of
/// `asset`. Returns `None` if even all of them fall short.
pub fn accumulate(outputs: &[Output], asset: &AssetId, required: &Amount) -> Option<Vec<Output>> {
    let mut total = Amount::zero();
    let mut chosen = Vec::new();
    for output in outputs {
        if total >= *required {
            break;
        }
        total += &output.quantity_of(asset);
        chosen.push(output.clone());
    }
    (total >= *required).then_some(chosen)
}

pub fn total_of<'a>(outputs: impl IntoIterator<Item = &'a Output>, asset: &AssetId) -> Amount {
    outputs.into_iter().map(|o| o.quantity_of(asset)).sum()
}

/// `held - owed`, or `None` when the holdings do not cover the debt.
pub fn change(held: &Amount, owed: &Amount) -> Option<Amount> {
    held.checked_sub(owed)
}

/// Per-asset signed difference `available + mint - required`, zero entries
/// omitted.
pub fn imbalance(available: &Value, mint: &Mint, required: &Value) -> Vec<(AssetId, BigInt)> {
    let mut assets: BTreeSet<&AssetId> = available.assets().collect();
    assets.extend(required.assets());
    assets.extend(mint.iter().map(|(a, _)| a));
    assets
        .into_iter()
        .filter_map(|asset| {
            let diff = available.amount_of(asset).to_signed() + mint.quantity_of(asset)
                - required.amount_of(asset).to_signed();
            (!diff.is_zero()).then(|| (asset.clone(), diff))
        })
        .collect()
}

/// Greedily pick wallet outputs until every deficit is covered and, when
/// `need_one` is set, at least one output is picked.
pub fn cover_deficits(
    candidates: &[Output],
    deficits: &[(AssetId, BigInt)],
    need_one: bool,
) -> Result<Vec<Output>, (AssetId, Amount, Amount)> {
    let mut chosen: Vec<Output> = Vec::new();
    for (asset, deficit) in deficits.iter().filter(|(_, d)| d.is_positive()) {
        let required = Amount::from_signed(deficit).unwrap_or_default();
        let mut held = total_of(chosen.iter(), asset);
        for candidate in candidates {
            if held >= required {
                break;
            }
            if chosen.iter().any(|c| c.out_ref == candidate.out_ref) {
                continue;
            }
            let q = candidate.quantity_of(asset);
            if q.is_zero() {
                continue;
            }
            held += &q;
            chosen.push(candidate.clone());
        }
        if held < required {
            return Err((asset.clone(), required, held));
        }
    }
    if need_one && chosen.is_empty() {
        match candidates.first() {
            Some(first) => chosen.push(first.clone()),
            None => return Err((AssetId::coin(), Amount::from(1u64), Amount::zero())),
        }
    }
    Ok(chosen)
}
