use std::future::Future;

use fund_ledger::{LedgerClient, TxBuilder, TxOutput, UnsignedTx, Wallet};
use fund_types::{Amount, TxId, Value};
use num_bigint::BigInt;
use num_traits::Signed;
use tracing::{debug, info};

use crate::error::{OpsError, OpsResult};
use crate::retry::RetryPolicy;
use crate::selection::{cover_deficits, imbalance};

/// Result of a confirmed submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Submitted {
    pub tx_id: TxId,
    /// How many build/submit rounds it took.
    pub attempts: u32,
}

/// Balances, signs, submits and confirms transactions for one wallet.
pub struct Executor<'a> {
    ledger: &'a dyn LedgerClient,
    wallet: &'a dyn Wallet,
    retry: RetryPolicy,
    fund_id: &'a str,
}

impl<'a> Executor<'a> {
    pub fn new(
        ledger: &'a dyn LedgerClient,
        wallet: &'a dyn Wallet,
        retry: RetryPolicy,
        fund_id: &'a str,
    ) -> Self {
        Self {
            ledger,
            wallet,
            retry,
            fund_id,
        }
    }

    /// Make the transaction balance using the wallet's own outputs.
    ///
    /// Value the transaction creates beyond what it consumes and mints is
    /// drawn from outputs at the wallet address; anything left over returns
    /// to the wallet as one change output. A transaction with no inputs
    /// always gets at least one wallet input.
    pub async fn complete(&self, builder: TxBuilder) -> OpsResult<UnsignedTx> {
        let mut tx = builder.build();
        let address = self.wallet.address();

        let wallet_outputs: Vec<_> = self
            .ledger
            .outputs_at(&address)
            .await?
            .into_iter()
            .filter(|o| !tx.inputs.iter().any(|i| i.out_ref == o.out_ref))
            .collect();

        let deficits: Vec<_> = imbalance(&tx.consumed(), &tx.mint, &tx.produced())
            .into_iter()
            .filter(|(_, diff)| diff.is_negative())
            .map(|(asset, diff)| (asset, -diff))
            .collect();

        let extra = cover_deficits(&wallet_outputs, &deficits, tx.inputs.is_empty()).map_err(
            |(asset, required, available)| OpsError::InsufficientFunds {
                fund_id: self.fund_id.to_string(),
                owner: self.wallet.identity(),
                asset: asset.labeled(),
                required,
                available,
            },
        )?;
        debug!(
            wallet = %self.wallet.identity(),
            added_inputs = extra.len(),
            "balancing from wallet"
        );
        tx.inputs.extend(extra);

        let mut change = Value::new();
        for (asset, surplus) in imbalance(&tx.consumed(), &tx.mint, &tx.produced()) {
            if surplus > BigInt::from(0) {
                if let Some(amount) = Amount::from_signed(&surplus) {
                    change.add(&asset, &amount);
                }
            }
        }
        if !change.is_empty() {
            tx.outputs.push(TxOutput::new(address, change));
        }
        Ok(tx)
    }

    /// Sign with the wallet, submit, and wait for confirmation.
    pub async fn submit(&self, tx: UnsignedTx) -> OpsResult<TxId> {
        let signed = self.wallet.sign(tx)?;
        let tx_id = self.ledger.submit(&signed).await?;
        if !self.ledger.await_confirmation(&tx_id).await? {
            return Err(OpsError::NotConfirmed { tx_id });
        }
        Ok(tx_id)
    }

    /// Build, balance and submit, rebuilding from fresh ledger state on
    /// each retried attempt.
    pub async fn execute<F, Fut>(&self, operation: &str, mut build: F) -> OpsResult<Submitted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = OpsResult<TxBuilder>>,
    {
        let this = self;
        let submitted = self
            .retry
            .run(|attempt| {
                let pending = build();
                async move {
                    let builder = pending.await?;
                    let tx = this.complete(builder).await?;
                    let tx_id = this.submit(tx).await?;
                    Ok::<_, OpsError>(Submitted {
                        tx_id,
                        attempts: attempt,
                    })
                }
            })
            .await?;
        info!(
            fund_id = self.fund_id,
            operation,
            tx_id = %submitted.tx_id,
            attempts = submitted.attempts,
            "transaction confirmed"
        );
        Ok(submitted)
    }
}
