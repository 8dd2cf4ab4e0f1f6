use std::collections::BTreeSet;

use fund_ledger::TxBuilder;
use fund_types::{Address, AssetId, Datum, Identity, Output, Value};
use tracing::{debug, info};

use crate::context::FundContext;
use crate::error::{OpsError, OpsResult};
use crate::executor::Submitted;
use crate::selection::{accumulate, change, cover_identities, find_membership, order_candidates, total_of};
use crate::target::{total_requested, TransferTarget};

/// Moves value between transfer slots, gated on registry membership of
/// the sender and every recipient.
///
/// The sender is the acting wallet's identity, fixed at construction.
pub struct TransferEngine<'a> {
    ctx: &'a FundContext,
    sender: Identity,
}

impl<'a> TransferEngine<'a> {
    pub fn new(ctx: &'a FundContext) -> Self {
        Self {
            ctx,
            sender: ctx.identity(),
        }
    }

    pub fn sender(&self) -> Identity {
        self.sender
    }

    fn check_targets(&self, targets: &[TransferTarget]) -> OpsResult<()> {
        if targets.is_empty() {
            return Err(OpsError::EmptyTargets {
                fund_id: self.ctx.fund_id().to_string(),
            });
        }
        if let Some(zero) = targets.iter().find(|t| t.amount.is_zero()) {
            return Err(OpsError::ZeroAmount {
                fund_id: self.ctx.fund_id().to_string(),
                identity: zero.identity,
            });
        }
        Ok(())
    }

    fn pay_slots(&self, builder: TxBuilder, asset: &AssetId, targets: &[TransferTarget]) -> TxBuilder {
        let address = self.ctx.scripts().transfer.address();
        targets.iter().fold(builder, |b, t| {
            b.pay_to_contract(
                address,
                Datum::Owner(t.identity),
                Value::of(asset.clone(), t.amount.clone()),
            )
        })
    }

    /// The distinct inputs, in first-seen order. Only the sender's own
    /// slots and key outputs qualify.
    fn own_inputs(&self, inputs: &[Output]) -> OpsResult<Vec<Output>> {
        let slot_address = self.ctx.scripts().transfer.address();
        let key_address = Address::Key(self.sender);
        let mut seen = BTreeSet::new();
        let mut distinct = Vec::with_capacity(inputs.len());
        for input in inputs {
            let owned = input.address == key_address
                || (input.address == slot_address && input.owner() == Some(&self.sender));
            if !owned {
                return Err(OpsError::ForeignInput {
                    fund_id: self.ctx.fund_id().to_string(),
                    out_ref: input.out_ref,
                    sender: self.sender,
                });
            }
            if seen.insert(input.out_ref) {
                distinct.push(input.clone());
            }
        }
        Ok(distinct)
    }

    /// One new slot per target. Deposits are open: nobody's membership is
    /// checked.
    pub fn build_deposit(&self, asset: &AssetId, targets: &[TransferTarget]) -> OpsResult<TxBuilder> {
        self.check_targets(targets)?;
        Ok(self.pay_slots(TxBuilder::new(), asset, targets))
    }

    /// Spend `inputs` to `targets`, returning any surplus of `asset` to the
    /// sender as a fresh slot.
    ///
    /// The sender's batch and a greedy cover of recipient batches are
    /// referenced as membership proofs.
    pub async fn build_spend(
        &self,
        asset: &AssetId,
        inputs: &[Output],
        targets: &[TransferTarget],
    ) -> OpsResult<TxBuilder> {
        self.check_targets(targets)?;
        let inputs = self.own_inputs(inputs)?;
        let fund_id = self.ctx.fund_id();
        let token = self.ctx.admin_token();

        let batches = self.ctx.registry().batches().await?;
        let sender_batch = find_membership(&batches, &self.sender, token)
            .ok_or_else(|| OpsError::SenderNotWhitelisted {
                fund_id: fund_id.to_string(),
                identity: self.sender,
            })?
            .clone();

        let recipients: Vec<Identity> = targets.iter().map(|t| t.identity).collect();
        let recipient_batches = cover_identities(&batches, &recipients, token).map_err(|identity| {
            OpsError::RecipientNotWhitelisted {
                fund_id: fund_id.to_string(),
                identity,
            }
        })?;

        let held = total_of(&inputs, asset);
        let owed = total_requested(targets);
        let rest = change(&held, &owed).ok_or_else(|| OpsError::InsufficientFunds {
            fund_id: fund_id.to_string(),
            owner: self.sender,
            asset: asset.labeled(),
            required: owed.clone(),
            available: held.clone(),
        })?;
        debug!(
            fund_id,
            sender = %self.sender,
            sender_batch = %sender_batch.out_ref,
            recipient_batches = recipient_batches.len(),
            inputs = inputs.len(),
            %held,
            %owed,
            change = %rest,
            "spend selection"
        );

        let transfer = &self.ctx.scripts().transfer;
        let mut builder = TxBuilder::new()
            .read_from([sender_batch])
            .read_from(recipient_batches)
            .add_signer(self.sender);
        if inputs.iter().any(|o| o.address == transfer.address()) {
            builder = builder.attach_script(transfer.witness());
        }
        builder = builder.collect_from(inputs);
        builder = self.pay_slots(builder, asset, targets);
        if !rest.is_zero() {
            builder = builder.pay_to_contract(
                transfer.address(),
                Datum::Owner(self.sender),
                Value::of(asset.clone(), rest),
            );
        }
        Ok(builder)
    }

    /// Accumulate the sender's own slots until they cover the request,
    /// then spend them.
    pub async fn build_transfer(&self, asset: &AssetId, targets: &[TransferTarget]) -> OpsResult<TxBuilder> {
        self.check_targets(targets)?;
        let slots = self.slots_of(&self.sender, asset).await?;
        let required = total_requested(targets);
        let inputs = accumulate(&slots, asset, &required).ok_or_else(|| OpsError::InsufficientFunds {
            fund_id: self.ctx.fund_id().to_string(),
            owner: self.sender,
            asset: asset.labeled(),
            required: required.clone(),
            available: total_of(&slots, asset),
        })?;
        debug!(
            fund_id = self.ctx.fund_id(),
            sender = %self.sender,
            slots = slots.len(),
            chosen = inputs.len(),
            "slots accumulated"
        );
        self.build_spend(asset, &inputs, targets).await
    }

    /// Live slots owned by `owner` holding some of `asset`, in the
    /// configured order.
    pub async fn slots_of(&self, owner: &Identity, asset: &AssetId) -> OpsResult<Vec<Output>> {
        let address = self.ctx.scripts().transfer.address();
        let slots: Vec<Output> = self
            .ctx
            .ledger()
            .outputs_at_with_asset(&address, asset)
            .await?
            .into_iter()
            .filter(|o| o.owner() == Some(owner))
            .collect();
        Ok(order_candidates(slots, self.ctx.config().selection_order))
    }

    pub async fn deposit(&self, asset: &AssetId, targets: &[TransferTarget]) -> OpsResult<Submitted> {
        let submitted = self
            .ctx
            .executor()
            .execute("transfer.deposit", move || async move {
                self.build_deposit(asset, targets)
            })
            .await?;
        info!(fund_id = self.ctx.fund_id(), %asset, slots = targets.len(), tx_id = %submitted.tx_id, "deposit confirmed");
        Ok(submitted)
    }

    pub async fn spend(
        &self,
        asset: &AssetId,
        inputs: &[Output],
        targets: &[TransferTarget],
    ) -> OpsResult<Submitted> {
        let submitted = self
            .ctx
            .executor()
            .execute("transfer.spend", move || self.build_spend(asset, inputs, targets))
            .await?;
        info!(fund_id = self.ctx.fund_id(), sender = %self.sender, %asset, tx_id = %submitted.tx_id, "spend confirmed");
        Ok(submitted)
    }

    pub async fn transfer(&self, asset: &AssetId, targets: &[TransferTarget]) -> OpsResult<Submitted> {
        let submitted = self
            .ctx
            .executor()
            .execute("transfer.transfer", move || self.build_transfer(asset, targets))
            .await?;
        info!(fund_id = self.ctx.fund_id(), sender = %self.sender, %asset, tx_id = %submitted.tx_id, "transfer confirmed");
        Ok(submitted)
    }
}
