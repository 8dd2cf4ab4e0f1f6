use std::collections::BTreeSet;

use fund_ledger::TxBuilder;
use fund_types::{Amount, Datum, Identity, Output, OutputRef, Value};
use num_bigint::BigInt;
use num_traits::Zero;
use tracing::{debug, info, warn};

use crate::context::FundContext;
use crate::error::{OpsError, OpsResult};
use crate::executor::Submitted;
use crate::selection::{batch_admits, find_listing, order_candidates, total_of};

/// Whitelist membership kept as batches of identities at the registry
/// address, each holding one capability token per listed identity.
///
/// The engine keeps no state between calls; every operation reads the
/// live batches afresh.
pub struct RegistryEngine<'a> {
    ctx: &'a FundContext,
}

/// Summary produced by a successful [`RegistryEngine::audit_registry`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryAudit {
    pub batches: usize,
    /// Total listed identities, counting duplicates.
    pub listed: usize,
    /// Capability tokens held at the registry address.
    pub supply: Amount,
}

impl<'a> RegistryEngine<'a> {
    pub fn new(ctx: &'a FundContext) -> Self {
        Self { ctx }
    }

    /// Live batches holding the capability token, in the configured order.
    pub async fn batches(&self) -> OpsResult<Vec<Output>> {
        let address = self.ctx.scripts().registry.address();
        let outputs = self
            .ctx
            .ledger()
            .outputs_at_with_asset(&address, self.ctx.admin_token())
            .await?;
        let batches: Vec<Output> = outputs
            .into_iter()
            .filter(|o| {
                let ok = o.registry_identities().is_some();
                if !ok {
                    warn!(out_ref = %o.out_ref, "registry output without batch datum skipped");
                }
                ok
            })
            .collect();
        Ok(order_candidates(batches, self.ctx.config().selection_order))
    }

    pub async fn is_whitelisted(&self, identity: &Identity) -> OpsResult<bool> {
        let token = self.ctx.admin_token();
        Ok(self
            .batches()
            .await?
            .iter()
            .any(|b| batch_admits(b, identity, token)))
    }

    /// Transaction adding one batch listing `identities`, minting one token
    /// per entry. Existing batches are not checked for duplicates.
    pub fn build_add(&self, identities: &[Identity]) -> OpsResult<TxBuilder> {
        if identities.is_empty() {
            return Err(OpsError::EmptyBatch {
                fund_id: self.ctx.fund_id().to_string(),
            });
        }
        let token = self.ctx.admin_token();
        let scripts = self.ctx.scripts();
        let count = Amount::from(identities.len());

        debug!(fund_id = self.ctx.fund_id(), count = identities.len(), "building registry add");
        Ok(TxBuilder::new()
            .attach_script(scripts.admin_token.witness())
            .mint(token, identities.len() as u64)
            .add_signer(self.ctx.admin())
            .pay_to_contract(
                scripts.registry.address(),
                Datum::Registry(identities.to_vec()),
                Value::of(token.clone(), count),
            ))
    }

    /// Transaction removing `identity` from the first batch listing it.
    ///
    /// The batch is consumed and its tokens burned; if anyone remains, a
    /// replacement batch with the shorter list and matching tokens is
    /// created.
    pub async fn build_remove_by_identity(&self, identity: Identity) -> OpsResult<TxBuilder> {
        let batches = self.batches().await?;
        let batch = find_listing(&batches, &identity).ok_or_else(|| OpsError::IdentityNotFound {
            fund_id: self.ctx.fund_id().to_string(),
            identity,
        })?;

        let token = self.ctx.admin_token();
        let scripts = self.ctx.scripts();
        let held = batch.quantity_of(token);
        let remaining: Vec<Identity> = batch
            .registry_identities()
            .unwrap_or_default()
            .iter()
            .filter(|id| **id != identity)
            .copied()
            .collect();

        let mut builder = TxBuilder::new()
            .collect_from([batch.clone()])
            .attach_script(scripts.registry.witness())
            .mint(token, -held.to_signed())
            .add_signer(self.ctx.admin());
        if !remaining.is_empty() {
            let count = Amount::from(remaining.len());
            builder = builder.mint(token, count.to_signed()).pay_to_contract(
                scripts.registry.address(),
                Datum::Registry(remaining.clone()),
                Value::of(token.clone(), count),
            );
        }

        let net = BigInt::from(remaining.len()) - held.to_signed();
        if !net.is_zero() {
            builder = builder.attach_script(scripts.admin_token.witness());
        }
        debug!(
            fund_id = self.ctx.fund_id(),
            %identity,
            batch = %batch.out_ref,
            remaining = remaining.len(),
            %net,
            "building registry removal"
        );
        Ok(builder)
    }

    /// Transaction dissolving the given batches entirely, burning every
    /// token they hold.
    pub async fn build_remove_by_output_refs(&self, refs: &[OutputRef]) -> OpsResult<TxBuilder> {
        let fund_id = self.ctx.fund_id();
        if refs.is_empty() {
            return Err(OpsError::EmptyReferences {
                fund_id: fund_id.to_string(),
            });
        }
        let unique: Vec<OutputRef> = refs
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let live = self.ctx.ledger().outputs_by_ref(&unique).await?;

        let scripts = self.ctx.scripts();
        let registry_address = scripts.registry.address();
        let mut batches = Vec::with_capacity(unique.len());
        for out_ref in &unique {
            let output = live
                .iter()
                .find(|o| o.out_ref == *out_ref)
                .ok_or_else(|| OpsError::OutputNotFound {
                    fund_id: fund_id.to_string(),
                    out_ref: *out_ref,
                })?;
            if output.address != registry_address || output.registry_identities().is_none() {
                return Err(OpsError::NotARegistryBatch {
                    fund_id: fund_id.to_string(),
                    out_ref: *out_ref,
                });
            }
            batches.push(output.clone());
        }

        let token = self.ctx.admin_token();
        let burned = total_of(batches.iter(), token);
        let mut builder = TxBuilder::new()
            .collect_from(batches)
            .attach_script(scripts.registry.witness())
            .add_signer(self.ctx.admin());
        if !burned.is_zero() {
            builder = builder
                .mint(token, -burned.to_signed())
                .attach_script(scripts.admin_token.witness());
        }
        debug!(fund_id, batches = unique.len(), %burned, "building batch dissolution");
        Ok(builder)
    }

    pub async fn add(&self, identities: &[Identity]) -> OpsResult<Submitted> {
        let submitted = self
            .ctx
            .executor()
            .execute("registry.add", move || async move { self.build_add(identities) })
            .await?;
        info!(fund_id = self.ctx.fund_id(), count = identities.len(), tx_id = %submitted.tx_id, "batch added");
        Ok(submitted)
    }

    pub async fn remove_by_identity(&self, identity: Identity) -> OpsResult<Submitted> {
        let submitted = self
            .ctx
            .executor()
            .execute("registry.remove", move || self.build_remove_by_identity(identity))
            .await?;
        info!(fund_id = self.ctx.fund_id(), %identity, tx_id = %submitted.tx_id, "identity removed");
        Ok(submitted)
    }

    pub async fn remove_by_output_refs(&self, refs: &[OutputRef]) -> OpsResult<Submitted> {
        let submitted = self
            .ctx
            .executor()
            .execute("registry.remove_refs", move || self.build_remove_by_output_refs(refs))
            .await?;
        info!(fund_id = self.ctx.fund_id(), batches = refs.len(), tx_id = %submitted.tx_id, "batches dissolved");
        Ok(submitted)
    }

    /// Check every output at the registry address: each batch must list at
    /// least one identity and hold exactly one token per entry.
    pub async fn audit_registry(&self) -> OpsResult<RegistryAudit> {
        let address = self.ctx.scripts().registry.address();
        let token = self.ctx.admin_token();
        let outputs = self.ctx.ledger().outputs_at(&address).await?;

        let mut audit = RegistryAudit {
            batches: 0,
            listed: 0,
            supply: Amount::zero(),
        };
        for output in &outputs {
            let held = output.quantity_of(token);
            let Some(ids) = output.registry_identities() else {
                if !held.is_zero() {
                    return Err(self.violation(output, "capability token held outside a batch"));
                }
                continue;
            };
            if ids.is_empty() {
                return Err(self.violation(output, "batch lists no identities"));
            }
            if held != Amount::from(ids.len()) {
                return Err(self.violation(
                    output,
                    &format!("batch lists {} identities but holds {held} tokens", ids.len()),
                ));
            }
            audit.batches += 1;
            audit.listed += ids.len();
            audit.supply += &held;
        }
        Ok(audit)
    }

    fn violation(&self, output: &Output, detail: &str) -> OpsError {
        OpsError::InvariantViolation {
            fund_id: self.ctx.fund_id().to_string(),
            out_ref: output.out_ref,
            detail: detail.to_string(),
        }
    }
}
