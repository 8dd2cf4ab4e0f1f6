//! End-to-end engine behaviour against the in-memory ledger.

use std::sync::Arc;

use fund_ledger::{LedgerClient, Rejection, Wallet};
use fund_scripts::{BindingMode, BlueprintRepository};
use fund_store::{DeploymentStore, InMemoryStore};
use fund_types::{Amount, Identity, OutputRef, TxId};

use crate::config::SelectionOrder;
use crate::context::FundContext;
use crate::deploy::DeployTool;
use crate::error::{ErrorKind, OpsError};
use crate::testkit::{dyn_ledger, fast_config, target, usd, Fixture, FUND_ID};

// ---- 1. Registry ----

#[tokio::test]
async fn single_identity_batch_dissolves_on_removal() {
    let fx = Fixture::new().await;
    let registry = fx.ctx.registry();
    let aa = Identity::from_raw([0xaa; 28]);

    registry.add(&[aa]).await.unwrap();
    let audit = fx.audit().await;
    assert_eq!(audit.batches, 1);
    assert_eq!(audit.supply, Amount::from(1u64));

    registry.remove_by_identity(aa).await.unwrap();
    let audit = fx.audit().await;
    assert_eq!(audit.batches, 0);
    assert!(fx.admin_token_supply().is_zero());
    assert!(registry.batches().await.unwrap().is_empty());
}

#[tokio::test]
async fn removal_leaves_shorter_replacement_batch() {
    let fx = Fixture::new().await;
    let registry = fx.ctx.registry();
    let a = Identity::from_raw([0x0a; 28]);
    let b = Identity::from_raw([0x0b; 28]);

    registry.add(&[a, b]).await.unwrap();
    fx.audit().await;
    registry.remove_by_identity(a).await.unwrap();
    fx.audit().await;

    let batches = fx.ctx.view().registry_batches().await.unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].identities, vec![b]);
    assert_eq!(batches[0].tokens, Amount::from(1u64));
    assert_eq!(fx.admin_token_supply(), Amount::from(1u64));
}

#[tokio::test]
async fn second_removal_of_same_identity_is_not_found() {
    let fx = Fixture::new().await;
    let registry = fx.ctx.registry();
    let a = Identity::from_raw([0x0a; 28]);
    let b = Identity::from_raw([0x0b; 28]);

    registry.add(&[a, b]).await.unwrap();
    registry.remove_by_identity(a).await.unwrap();
    fx.audit().await;

    let err = registry.remove_by_identity(a).await.unwrap_err();
    assert!(matches!(err, OpsError::IdentityNotFound { identity, .. } if identity == a));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains(FUND_ID));
    fx.audit().await;
}

#[tokio::test]
async fn removal_drops_every_occurrence_within_the_batch() {
    let fx = Fixture::new().await;
    let registry = fx.ctx.registry();
    let a = Identity::from_raw([0x0a; 28]);
    let b = Identity::from_raw([0x0b; 28]);

    registry.add(&[a, b, a]).await.unwrap();
    fx.audit().await;
    registry.remove_by_identity(a).await.unwrap();
    let audit = fx.audit().await;
    assert_eq!(audit.listed, 1);
    assert!(!registry.is_whitelisted(&a).await.unwrap());
}

#[tokio::test]
async fn duplicate_listing_survives_one_removal() {
    let fx = Fixture::new().await;
    let registry = fx.ctx.registry();
    let a = Identity::from_raw([0x0a; 28]);

    registry.add(&[a]).await.unwrap();
    registry.add(&[a]).await.unwrap();
    fx.audit().await;

    registry.remove_by_identity(a).await.unwrap();
    fx.audit().await;
    assert!(registry.is_whitelisted(&a).await.unwrap());
    registry.remove_by_identity(a).await.unwrap();
    assert!(!registry.is_whitelisted(&a).await.unwrap());
}

#[tokio::test]
async fn empty_batch_is_rejected_before_submission() {
    let fx = Fixture::new().await;
    let before = fx.ledger.snapshot().unwrap();
    let err = fx.ctx.registry().add(&[]).await.unwrap_err();
    assert!(matches!(err, OpsError::EmptyBatch { .. }));
    assert_eq!(err.kind(), ErrorKind::EmptyInput);
    assert_eq!(fx.ledger.snapshot().unwrap(), before);
}

#[tokio::test]
async fn batches_dissolve_by_output_reference() {
    let fx = Fixture::new().await;
    let registry = fx.ctx.registry();
    let ids: Vec<Identity> = (1..=3).map(|b| Identity::from_raw([b; 28])).collect();

    registry.add(&ids[..2]).await.unwrap();
    registry.add(&ids[2..]).await.unwrap();
    fx.audit().await;

    let refs: Vec<OutputRef> = registry.batches().await.unwrap().iter().map(|b| b.out_ref).collect();
    assert_eq!(refs.len(), 2);
    registry.remove_by_output_refs(&refs).await.unwrap();

    let audit = fx.audit().await;
    assert_eq!(audit.batches, 0);
    assert!(fx.admin_token_supply().is_zero());
}

#[tokio::test]
async fn output_reference_removal_checks_its_refs() {
    let fx = Fixture::new().await;
    let registry = fx.ctx.registry();
    registry.add(&[Identity::from_raw([1; 28])]).await.unwrap();

    let err = registry.remove_by_output_refs(&[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyInput);

    let bogus = OutputRef::new(TxId::from_raw([0xee; 32]), 3);
    let err = registry.remove_by_output_refs(&[bogus]).await.unwrap_err();
    assert!(matches!(err, OpsError::OutputNotFound { out_ref, .. } if out_ref == bogus));

    let wallet_output = fx.ledger.outputs_at(&fx.admin.address()).await.unwrap()[0].out_ref;
    let err = registry.remove_by_output_refs(&[wallet_output]).await.unwrap_err();
    assert!(matches!(err, OpsError::NotARegistryBatch { .. }));
    fx.audit().await;
}

#[tokio::test]
async fn only_the_admin_can_change_the_registry() {
    let fx = Fixture::new().await;
    let mallory = fx.participant();
    let ctx = fx.acting_as(&mallory);

    let err = ctx.registry().add(&[mallory.identity()]).await.unwrap_err();
    assert!(matches!(
        err,
        OpsError::LedgerRejected { reason: Rejection::MissingSignature(id), .. } if id == fx.admin.identity()
    ));
    assert_eq!(fx.audit().await.batches, 0);
}

#[tokio::test]
async fn conflicting_submission_is_rebuilt_and_retried() {
    let fx = Fixture::new().await;
    fx.ledger
        .inject_rejections([Rejection::BadInputs(vec![])])
        .unwrap();
    let submitted = fx
        .ctx
        .registry()
        .add(&[Identity::from_raw([1; 28])])
        .await
        .unwrap();
    assert_eq!(submitted.attempts, 2);
    fx.audit().await;
}

#[tokio::test]
async fn exhausted_conflicts_surface_as_ledger_conflict() {
    let fx = Fixture::new().await;
    fx.ledger
        .inject_rejections(std::iter::repeat(Rejection::BadInputs(vec![])).take(3))
        .unwrap();
    let err = fx
        .ctx
        .registry()
        .add(&[Identity::from_raw([1; 28])])
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::LedgerConflict { attempts: 3, .. }));
    assert_eq!(fx.audit().await.batches, 0);
}

#[tokio::test]
async fn ordered_selection_removes_from_lowest_reference() {
    let mut config = fast_config();
    config.selection_order = SelectionOrder::ByOutputRef;
    let fx = Fixture::with_config(config).await;
    let registry = fx.ctx.registry();
    let a = Identity::from_raw([0x0a; 28]);
    let b = Identity::from_raw([0x0b; 28]);
    let c = Identity::from_raw([0x0c; 28]);

    registry.add(&[a, b]).await.unwrap();
    registry.add(&[a, c]).await.unwrap();
    let batches = registry.batches().await.unwrap();
    assert!(batches[0].out_ref < batches[1].out_ref);
    let first = batches[0].registry_identities().unwrap().to_vec();

    registry.remove_by_identity(a).await.unwrap();
    fx.audit().await;

    let whitelist = fx.ctx.view().whitelist().await.unwrap();
    let untouched = if first.contains(&b) { c } else { b };
    // The other batch still lists `a`; the lower one lost it.
    assert!(whitelist.contains_key(&a));
    assert!(whitelist.contains_key(&untouched));
    let remaining: Vec<Vec<Identity>> = fx
        .ctx
        .view()
        .registry_batches()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.identities)
        .collect();
    let shrunk: Vec<Identity> = first.into_iter().filter(|id| *id != a).collect();
    assert!(remaining.contains(&shrunk));
}

// ---- 2. Transfers ----

struct Pair {
    fx: Fixture,
    x: Arc<fund_ledger::KeyWallet>,
    y: Arc<fund_ledger::KeyWallet>,
}

async fn pair(whitelist_y: bool) -> Pair {
    let fx = Fixture::new().await;
    let x = fx.participant();
    let y = fx.participant();
    let mut listed = vec![x.identity()];
    if whitelist_y {
        listed.push(y.identity());
    }
    fx.ctx.registry().add(&listed).await.unwrap();
    fx.audit().await;

    let ctx = fx.acting_as(&x);
    ctx.transfer()
        .deposit(&usd(), &[target(x.identity(), 100)])
        .await
        .unwrap();
    Pair { fx, x, y }
}

#[tokio::test]
async fn transfer_pays_recipient_and_returns_change() {
    let Pair { fx, x, y } = pair(true).await;
    let ctx = fx.acting_as(&x);

    ctx.transfer()
        .transfer(&usd(), &[target(y.identity(), 40)])
        .await
        .unwrap();

    let view = ctx.view();
    assert_eq!(view.balance_of(&y.identity(), &usd()).await.unwrap(), Amount::from(40u64));
    assert_eq!(view.balance_of(&x.identity(), &usd()).await.unwrap(), Amount::from(60u64));
    let funds = view.funds().await.unwrap();
    assert_eq!(funds[&x.identity()].slots.len(), 1);
    assert_eq!(funds[&y.identity()].slots.len(), 1);
}

#[tokio::test]
async fn exact_spend_creates_no_change_slot() {
    let Pair { fx, x, y } = pair(true).await;
    let ctx = fx.acting_as(&x);

    ctx.transfer()
        .transfer(&usd(), &[target(y.identity(), 100)])
        .await
        .unwrap();
    let funds = ctx.view().funds().await.unwrap();
    assert!(!funds.contains_key(&x.identity()));
    assert_eq!(funds[&y.identity()].totals.amount_of(&usd()), Amount::from(100u64));
}

#[tokio::test]
async fn unlisted_recipient_is_refused_before_building() {
    let Pair { fx, x, y } = pair(false).await;
    let ctx = fx.acting_as(&x);
    let before = fx.ledger.snapshot().unwrap();

    let err = ctx
        .transfer()
        .transfer(&usd(), &[target(y.identity(), 40)])
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::RecipientNotWhitelisted { identity, .. } if identity == y.identity()));
    assert_eq!(fx.ledger.snapshot().unwrap(), before);
}

#[tokio::test]
async fn overdrawn_transfer_reports_shortfall() {
    let Pair { fx, x, y } = pair(true).await;
    let ctx = fx.acting_as(&x);

    let err = ctx
        .transfer()
        .transfer(&usd(), &[target(y.identity(), 101)])
        .await
        .unwrap_err();
    match err {
        OpsError::InsufficientFunds {
            owner,
            required,
            available,
            ..
        } => {
            assert_eq!(owner, x.identity());
            assert_eq!(required, Amount::from(101u64));
            assert_eq!(available, Amount::from(100u64));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[tokio::test]
async fn removing_sender_or_recipient_gates_spending() {
    let Pair { fx, x, y } = pair(true).await;
    let ctx = fx.acting_as(&x);
    let slots = ctx.transfer().slots_of(&x.identity(), &usd()).await.unwrap();

    fx.ctx.registry().remove_by_identity(y.identity()).await.unwrap();
    fx.audit().await;
    let err = ctx
        .transfer()
        .spend(&usd(), &slots, &[target(y.identity(), 10)])
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::RecipientNotWhitelisted { .. }));

    fx.ctx.registry().remove_by_identity(x.identity()).await.unwrap();
    fx.audit().await;
    let err = ctx
        .transfer()
        .spend(&usd(), &slots, &[target(x.identity(), 10)])
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::SenderNotWhitelisted { identity, .. } if identity == x.identity()));
}

#[tokio::test]
async fn explicit_spend_conserves_the_asset() {
    let Pair { fx, x, y } = pair(true).await;
    let ctx = fx.acting_as(&x);
    ctx.transfer()
        .deposit(&usd(), &[target(x.identity(), 25)])
        .await
        .unwrap();
    let slots = ctx.transfer().slots_of(&x.identity(), &usd()).await.unwrap();
    assert_eq!(slots.len(), 2);

    ctx.transfer()
        .spend(&usd(), &slots, &[target(y.identity(), 70), target(x.identity(), 5)])
        .await
        .unwrap();
    let view = ctx.view();
    assert_eq!(view.balance_of(&y.identity(), &usd()).await.unwrap(), Amount::from(70u64));
    // 5 as a target plus 50 change.
    assert_eq!(view.balance_of(&x.identity(), &usd()).await.unwrap(), Amount::from(55u64));
}

fn usd_at(outputs: &[fund_types::Output]) -> Amount {
    outputs.iter().map(|o| o.quantity_of(&usd())).sum()
}

#[tokio::test]
async fn repeated_input_is_consumed_and_counted_once() {
    let Pair { fx, x, y } = pair(true).await;
    let ctx = fx.acting_as(&x);
    let slot = ctx.transfer().slots_of(&x.identity(), &usd()).await.unwrap().remove(0);
    let wallet_before = usd_at(&fx.ledger.outputs_at(&x.address()).await.unwrap());
    let before = fx.ledger.snapshot().unwrap();

    let err = ctx
        .transfer()
        .spend(&usd(), &[slot.clone(), slot.clone()], &[target(y.identity(), 150)])
        .await
        .unwrap_err();
    match err {
        OpsError::InsufficientFunds { required, available, .. } => {
            assert_eq!(required, Amount::from(150u64));
            assert_eq!(available, Amount::from(100u64));
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(fx.ledger.snapshot().unwrap(), before);

    ctx.transfer()
        .spend(&usd(), &[slot.clone(), slot], &[target(y.identity(), 60)])
        .await
        .unwrap();
    let view = ctx.view();
    assert_eq!(view.balance_of(&y.identity(), &usd()).await.unwrap(), Amount::from(60u64));
    assert_eq!(view.balance_of(&x.identity(), &usd()).await.unwrap(), Amount::from(40u64));
    let wallet_after = usd_at(&fx.ledger.outputs_at(&x.address()).await.unwrap());
    assert_eq!(wallet_after, wallet_before);
}

#[tokio::test]
async fn inputs_the_sender_does_not_own_are_refused() {
    let Pair { fx, x, y } = pair(true).await;
    fx.acting_as(&y)
        .transfer()
        .deposit(&usd(), &[target(y.identity(), 30)])
        .await
        .unwrap();
    let ctx = fx.acting_as(&x);
    let own = ctx.transfer().slots_of(&x.identity(), &usd()).await.unwrap();
    let theirs = ctx.transfer().slots_of(&y.identity(), &usd()).await.unwrap().remove(0);
    let batch = ctx.registry().batches().await.unwrap().remove(0);
    let before = fx.ledger.snapshot().unwrap();

    for foreign in [theirs, batch] {
        let inputs = [own[0].clone(), foreign.clone()];
        let err = ctx
            .transfer()
            .spend(&usd(), &inputs, &[target(y.identity(), 10)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(matches!(err, OpsError::ForeignInput { out_ref, sender, .. }
            if out_ref == foreign.out_ref && sender == x.identity()));
    }
    assert_eq!(fx.ledger.snapshot().unwrap(), before);
}

#[tokio::test]
async fn slot_lookup_ignores_other_assets_and_owners() {
    let Pair { fx, x, y } = pair(true).await;
    let ctx = fx.acting_as(&x);
    ctx.transfer()
        .deposit(&fund_types::AssetId::coin(), &[target(x.identity(), 2_000_000)])
        .await
        .unwrap();
    ctx.transfer()
        .deposit(&usd(), &[target(y.identity(), 9)])
        .await
        .unwrap();

    let slots = ctx.transfer().slots_of(&x.identity(), &usd()).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].quantity_of(&usd()), Amount::from(100u64));
    let coin = ctx
        .transfer()
        .slots_of(&x.identity(), &fund_types::AssetId::coin())
        .await
        .unwrap();
    assert_eq!(coin.len(), 1);
}

mod conservation {
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    use fund_ledger::{LedgerClient, Wallet};
    use fund_types::Amount;

    use super::usd_at;
    use crate::error::OpsError;
    use crate::testkit::{target, usd, Fixture};

    /// Deposit `amounts` as X's slots, then spend the slots chosen by
    /// `picks` (repeats allowed) to Y.
    async fn spend_generated(amounts: Vec<u64>, picks: Vec<usize>, owed: Vec<u64>) -> Result<(), TestCaseError> {
        let fx = Fixture::new().await;
        let (x, y) = (fx.participant(), fx.participant());
        fx.ctx.registry().add(&[x.identity(), y.identity()]).await.unwrap();
        let ctx = fx.acting_as(&x);
        let deposits: Vec<_> = amounts.iter().map(|a| target(x.identity(), *a)).collect();
        ctx.transfer().deposit(&usd(), &deposits).await.unwrap();

        let slots = ctx.transfer().slots_of(&x.identity(), &usd()).await.unwrap();
        let inputs: Vec<_> = picks.iter().map(|i| slots[i % slots.len()].clone()).collect();
        let mut distinct: Vec<_> = picks.iter().map(|i| i % slots.len()).collect();
        distinct.sort_unstable();
        distinct.dedup();
        let held: Amount = distinct.iter().map(|i| slots[*i].quantity_of(&usd())).sum();
        let requested: Amount = owed.iter().map(|a| Amount::from(*a)).sum();
        let targets: Vec<_> = owed.iter().map(|a| target(y.identity(), *a)).collect();

        let fund_before = usd_at(&fx.ledger.outputs_at(&ctx.scripts().transfer.address()).await.unwrap());
        let wallet_before = usd_at(&fx.ledger.outputs_at(&x.address()).await.unwrap());
        let x_before = ctx.view().balance_of(&x.identity(), &usd()).await.unwrap();
        let snapshot = fx.ledger.snapshot().unwrap();

        match ctx.transfer().spend(&usd(), &inputs, &targets).await {
            Ok(_) => {
                let change = held.checked_sub(&requested);
                prop_assert!(change.is_some());
                let view = ctx.view();
                prop_assert_eq!(view.balance_of(&y.identity(), &usd()).await.unwrap(), requested.clone());
                prop_assert_eq!(
                    view.balance_of(&x.identity(), &usd()).await.unwrap(),
                    x_before.checked_sub(&requested).unwrap()
                );
                let fund_after = usd_at(&fx.ledger.outputs_at(&ctx.scripts().transfer.address()).await.unwrap());
                prop_assert_eq!(fund_after, fund_before);
            }
            Err(OpsError::InsufficientFunds { required, available, .. }) => {
                prop_assert!(held < requested);
                prop_assert_eq!(required, requested);
                prop_assert_eq!(available, held);
                prop_assert_eq!(fx.ledger.snapshot().unwrap(), snapshot);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
        let wallet_after = usd_at(&fx.ledger.outputs_at(&x.address()).await.unwrap());
        prop_assert_eq!(wallet_after, wallet_before);
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn spend_moves_exactly_the_requested_amount(
            amounts in proptest::collection::vec(1u64..200, 1..5),
            picks in proptest::collection::vec(0usize..8, 1..8),
            owed in proptest::collection::vec(1u64..300, 1..4),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(spend_generated(amounts, picks, owed))?;
        }
    }
}

#[tokio::test]
async fn deposits_need_no_membership() {
    let fx = Fixture::new().await;
    let outsider = fx.participant();
    let ctx = fx.acting_as(&outsider);
    ctx.transfer()
        .deposit(&usd(), &[target(outsider.identity(), 7), target(Identity::from_raw([9; 28]), 3)])
        .await
        .unwrap();
    let funds = ctx.view().funds().await.unwrap();
    assert_eq!(funds.len(), 2);
}

#[tokio::test]
async fn empty_and_zero_targets_are_rejected() {
    let Pair { fx, x, .. } = pair(true).await;
    let ctx = fx.acting_as(&x);
    let err = ctx.transfer().transfer(&usd(), &[]).await.unwrap_err();
    assert!(matches!(err, OpsError::EmptyTargets { .. }));
    let err = ctx
        .transfer()
        .deposit(&usd(), &[target(x.identity(), 0)])
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::ZeroAmount { .. }));
}

// ---- 3. Published scripts ----

async fn published_fund() -> (Arc<fund_ledger::InMemoryLedger>, Arc<fund_ledger::KeyWallet>, InMemoryStore) {
    let fx = Fixture::new().await;
    let store = InMemoryStore::new();
    let tool = DeployTool::new(
        dyn_ledger(&fx.ledger),
        fx.admin.clone(),
        Arc::new(BlueprintRepository::builtin()),
        fast_config(),
    )
    .with_retry(fast_config().retry);
    let deployment = tool.deploy(&store, "published-fund", None, true).await.unwrap();
    assert!(deployment.is_published());
    (fx.ledger.clone(), fx.admin.clone(), store)
}

#[tokio::test]
async fn published_binding_drives_the_same_operations() {
    let (ledger, admin, store) = published_fund().await;
    let mut config = fast_config();
    config.binding_mode = BindingMode::Published;
    let published = FundContext::load(dyn_ledger(&ledger), admin.clone(), &store, "published-fund", config)
        .await
        .unwrap();
    let inline = FundContext::load(dyn_ledger(&ledger), admin.clone(), &store, "published-fund", fast_config())
        .await
        .unwrap();
    assert_eq!(published.scripts().registry.address(), inline.scripts().registry.address());
    assert!(published.scripts().transfer.out_ref().is_some());

    let member = Arc::new(fund_ledger::KeyWallet::generate());
    published.registry().add(&[admin.identity(), member.identity()]).await.unwrap();
    published.registry().audit_registry().await.unwrap();
    published
        .transfer()
        .deposit(&usd(), &[target(admin.identity(), 50)])
        .await
        .unwrap();
    published
        .transfer()
        .transfer(&usd(), &[target(member.identity(), 20)])
        .await
        .unwrap();
    assert_eq!(
        inline.view().balance_of(&member.identity(), &usd()).await.unwrap(),
        Amount::from(20u64)
    );

    published.registry().remove_by_identity(member.identity()).await.unwrap();
    let audit = published.registry().audit_registry().await.unwrap();
    assert_eq!(audit.listed, 1);
}

#[tokio::test]
async fn redeploying_a_fund_id_is_refused() {
    let (ledger, admin, store) = published_fund().await;
    let tool = DeployTool::new(
        dyn_ledger(&ledger),
        admin,
        Arc::new(BlueprintRepository::builtin()),
        fast_config(),
    );
    let err = tool.deploy(&store, "published-fund", None, false).await.unwrap_err();
    assert!(matches!(err, OpsError::Store(fund_store::StoreError::DeploymentExists { .. })));
    assert_eq!(store.list_deployments().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_deployment_is_not_found() {
    let fx = Fixture::new().await;
    let store = InMemoryStore::new();
    let err = FundContext::load(dyn_ledger(&fx.ledger), fx.admin.clone(), &store, "nope", fast_config())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OpsError::DeploymentNotFound { .. }));
}

#[tokio::test]
async fn consumed_published_copy_fails_binding() {
    let (ledger, admin, store) = published_fund().await;
    let deployment = store.require_deployment("published-fund").unwrap();
    let registry_ref = deployment.script_refs.registry.unwrap();
    ledger.consume_external(&registry_ref).unwrap();

    let mut config = fast_config();
    config.binding_mode = BindingMode::Published;
    let err = FundContext::load(dyn_ledger(&ledger), admin, &store, "published-fund", config)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OpsError::Script { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
