use std::sync::Arc;

use async_trait::async_trait;
use fund_types::{Address, AssetId, Output, OutputRef, TxId};

use crate::error::LedgerResult;
use crate::tx::SignedTx;

/// Query and submission boundary to the ledger.
///
/// Every call is a suspension point; nothing else in the engines blocks.
/// Return order of the query methods is whatever the backend produces and
/// is not contractually sorted.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Live outputs at an address.
    async fn outputs_at(&self, address: &Address) -> LedgerResult<Vec<Output>>;

    /// Live outputs at an address holding a non-zero quantity of `asset`.
    async fn outputs_at_with_asset(
        &self,
        address: &Address,
        asset: &AssetId,
    ) -> LedgerResult<Vec<Output>>;

    /// Live outputs for the given references. Missing references are
    /// omitted rather than reported.
    async fn outputs_by_ref(&self, refs: &[OutputRef]) -> LedgerResult<Vec<Output>>;

    /// Submit a signed transaction. Application is all-or-nothing.
    async fn submit(&self, tx: &SignedTx) -> LedgerResult<TxId>;

    /// Wait until a submitted transaction settles; `false` if it never will.
    async fn await_confirmation(&self, tx_id: &TxId) -> LedgerResult<bool>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn outputs_at(&self, address: &Address) -> LedgerResult<Vec<Output>> {
        (**self).outputs_at(address).await
    }

    async fn outputs_at_with_asset(
        &self,
        address: &Address,
        asset: &AssetId,
    ) -> LedgerResult<Vec<Output>> {
        (**self).outputs_at_with_asset(address, asset).await
    }

    async fn outputs_by_ref(&self, refs: &[OutputRef]) -> LedgerResult<Vec<Output>> {
        (**self).outputs_by_ref(refs).await
    }

    async fn submit(&self, tx: &SignedTx) -> LedgerResult<TxId> {
        (**self).submit(tx).await
    }

    async fn await_confirmation(&self, tx_id: &TxId) -> LedgerResult<bool> {
        (**self).await_confirmation(tx_id).await
    }
}
