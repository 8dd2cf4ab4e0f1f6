use std::collections::BTreeMap;

use fund_types::{Amount, AssetId, Identity, Output, OutputRef, Value};

use crate::context::FundContext;
use crate::error::OpsResult;
use crate::selection::batch_admits;

/// One registry batch as seen by readers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchView {
    pub out_ref: OutputRef,
    pub identities: Vec<Identity>,
    pub tokens: Amount,
}

/// Everything one owner holds in transfer slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnerFunds {
    pub totals: Value,
    pub slots: Vec<OutputRef>,
}

/// Read-only queries over a fund's live state.
pub struct FundView<'a> {
    ctx: &'a FundContext,
}

impl<'a> FundView<'a> {
    pub fn new(ctx: &'a FundContext) -> Self {
        Self { ctx }
    }

    /// Whitelisted identities, each mapped to the first batch admitting it.
    pub async fn whitelist(&self) -> OpsResult<BTreeMap<Identity, OutputRef>> {
        let token = self.ctx.admin_token();
        let mut listed = BTreeMap::new();
        for batch in self.ctx.registry().batches().await? {
            for id in batch.registry_identities().unwrap_or_default() {
                if batch_admits(&batch, id, token) {
                    listed.entry(*id).or_insert(batch.out_ref);
                }
            }
        }
        Ok(listed)
    }

    pub async fn registry_batches(&self) -> OpsResult<Vec<BatchView>> {
        let token = self.ctx.admin_token();
        Ok(self
            .ctx
            .registry()
            .batches()
            .await?
            .into_iter()
            .map(|b| BatchView {
                out_ref: b.out_ref,
                identities: b.registry_identities().unwrap_or_default().to_vec(),
                tokens: b.quantity_of(token),
            })
            .collect())
    }

    pub async fn funds(&self) -> OpsResult<BTreeMap<Identity, OwnerFunds>> {
        let mut funds: BTreeMap<Identity, OwnerFunds> = BTreeMap::new();
        for slot in self.slots().await? {
            if let Some(owner) = slot.owner() {
                let entry = funds.entry(*owner).or_default();
                entry.totals.merge(&slot.value);
                entry.slots.push(slot.out_ref);
            }
        }
        Ok(funds)
    }

    pub async fn balance_of(&self, identity: &Identity, asset: &AssetId) -> OpsResult<Amount> {
        Ok(self
            .slots()
            .await?
            .iter()
            .filter(|s| s.owner() == Some(identity))
            .map(|s| s.quantity_of(asset))
            .sum())
    }

    async fn slots(&self) -> OpsResult<Vec<Output>> {
        let address = self.ctx.scripts().transfer.address();
        Ok(self.ctx.ledger().outputs_at(&address).await?)
    }
}

#[cfg(test)]
mod tests {
    use fund_ledger::Wallet;

    use crate::testkit::{target, usd, Fixture};
    use fund_types::Amount;

    #[tokio::test]
    async fn whitelist_points_at_first_admitting_batch() {
        let fx = Fixture::new().await;
        let (a, b) = (fx.participant().identity(), fx.participant().identity());
        fx.ctx.registry().add(&[a, b]).await.unwrap();
        fx.ctx.registry().add(&[b]).await.unwrap();

        let view = fx.ctx.view();
        let batches = view.registry_batches().await.unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].identities, vec![a, b]);
        assert_eq!(batches[0].tokens, Amount::from(2u64));
        assert_eq!(batches[1].tokens, Amount::from(1u64));

        let listed = view.whitelist().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[&a], batches[0].out_ref);
        assert_eq!(listed[&b], batches[0].out_ref);
    }

    #[tokio::test]
    async fn funds_group_slots_by_owner() {
        let fx = Fixture::new().await;
        let (x, y) = (fx.participant(), fx.participant());
        fx.ctx
            .transfer()
            .deposit(&usd(), &[target(x.identity(), 30), target(x.identity(), 12), target(y.identity(), 5)])
            .await
            .unwrap();

        let view = fx.ctx.view();
        let funds = view.funds().await.unwrap();
        assert_eq!(funds[&x.identity()].slots.len(), 2);
        assert_eq!(funds[&x.identity()].totals.amount_of(&usd()), Amount::from(42u64));
        assert_eq!(view.balance_of(&y.identity(), &usd()).await.unwrap(), Amount::from(5u64));
        assert!(view.balance_of(&fx.admin.identity(), &usd()).await.unwrap().is_zero());
    }
}
