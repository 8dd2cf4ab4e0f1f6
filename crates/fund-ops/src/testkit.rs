//! Shared fixtures for engine tests: a funded in-memory ledger, an admin
//! wallet and a freshly resolved deployment.

use std::sync::Arc;

use fund_ledger::{InMemoryLedger, KeyWallet, LedgerClient, Wallet};
use fund_scripts::BlueprintRepository;
use fund_store::Deployment;
use fund_types::{Amount, AssetId, AssetName, Identity, PolicyId, Value};

use crate::config::{OpsConfig, RetryConfig};
use crate::context::FundContext;
use crate::registry::RegistryAudit;
use crate::target::TransferTarget;

pub const FUND_ID: &str = "test-fund";

pub fn usd() -> AssetId {
    AssetId::new(PolicyId::from_raw([0x55; 28]), AssetName::from_text("USD"))
}

/// Retries without waiting so conflict tests stay fast.
pub fn fast_config() -> OpsConfig {
    OpsConfig {
        retry: RetryConfig {
            max_attempts: 3,
            delay_ms: 0,
            reason_filter: None,
        },
        ..OpsConfig::default()
    }
}

pub fn target(identity: Identity, amount: u64) -> TransferTarget {
    TransferTarget::new(identity, amount)
}

pub struct Fixture {
    pub ledger: Arc<InMemoryLedger>,
    pub admin: Arc<KeyWallet>,
    /// Context acting as the admin.
    pub ctx: FundContext,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(fast_config()).await
    }

    pub async fn with_config(config: OpsConfig) -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        let admin = Arc::new(KeyWallet::generate());
        fund_wallet(&ledger, admin.as_ref());

        let deployment =
            Deployment::create(&BlueprintRepository::builtin(), FUND_ID, admin.identity()).unwrap();
        let ctx = FundContext::new(dyn_ledger(&ledger), admin.clone(), deployment, config)
            .await
            .unwrap();
        Self { ledger, admin, ctx }
    }

    /// A new participant with coin and USD at their key address.
    pub fn participant(&self) -> Arc<KeyWallet> {
        let wallet = Arc::new(KeyWallet::generate());
        fund_wallet(&self.ledger, wallet.as_ref());
        wallet
    }

    pub fn acting_as(&self, wallet: &Arc<KeyWallet>) -> FundContext {
        self.ctx.with_wallet(wallet.clone())
    }

    /// Check batch token accounting; every registry mutation in tests is
    /// followed by this.
    pub async fn audit(&self) -> RegistryAudit {
        self.ctx.registry().audit_registry().await.unwrap()
    }

    pub fn admin_token_supply(&self) -> Amount {
        let token = self.ctx.admin_token();
        self.ledger
            .all_outputs()
            .unwrap()
            .iter()
            .map(|o| o.quantity_of(token))
            .sum()
    }
}

pub fn dyn_ledger(ledger: &Arc<InMemoryLedger>) -> Arc<dyn LedgerClient> {
    ledger.clone()
}

fn fund_wallet(ledger: &InMemoryLedger, wallet: &dyn Wallet) {
    ledger
        .fund(wallet.address(), Value::of(AssetId::coin(), Amount::from(100_000_000u64)))
        .unwrap();
    ledger
        .fund(wallet.address(), Value::of(usd(), Amount::from(1_000u64)))
        .unwrap();
}
