use std::sync::Arc;

use fund_ledger::{LedgerClient, Wallet};
use fund_scripts::{ScriptBinder, ScriptHandle, ScriptsBag};
use fund_store::{Deployment, DeploymentStore};
use fund_types::{AssetId, Identity};
use tracing::debug;

use crate::config::OpsConfig;
use crate::error::{OpsError, OpsResult};
use crate::executor::Executor;
use crate::registry::RegistryEngine;
use crate::retry::RetryPolicy;
use crate::transfer::TransferEngine;
use crate::view::FundView;

/// Everything an operation on one fund needs, passed explicitly.
///
/// Built once per invocation: the deployment is read, its validators are
/// bound according to the configured mode, and the acting wallet is fixed.
pub struct FundContext {
    ledger: Arc<dyn LedgerClient>,
    wallet: Arc<dyn Wallet>,
    deployment: Deployment,
    admin: Identity,
    scripts: ScriptsBag<ScriptHandle>,
    config: OpsConfig,
}

impl FundContext {
    /// Look up `fund_id` in `store` and bind its scripts.
    pub async fn load(
        ledger: Arc<dyn LedgerClient>,
        wallet: Arc<dyn Wallet>,
        store: &dyn DeploymentStore,
        fund_id: &str,
        config: OpsConfig,
    ) -> OpsResult<Self> {
        let deployment = store.require_deployment(fund_id)?;
        Self::new(ledger, wallet, deployment, config).await
    }

    pub async fn new(
        ledger: Arc<dyn LedgerClient>,
        wallet: Arc<dyn Wallet>,
        deployment: Deployment,
        config: OpsConfig,
    ) -> OpsResult<Self> {
        let admin = deployment.admin().ok_or_else(|| {
            OpsError::Config(format!(
                "deployment {} has no admin identity in its build arguments",
                deployment.fund_id
            ))
        })?;
        let scripts = ScriptBinder::new(config.binding_mode)
            .bind_all(ledger.as_ref(), &deployment.scripts, &deployment.script_refs)
            .await
            .map_err(|source| OpsError::Script {
                fund_id: deployment.fund_id.clone(),
                source,
            })?;
        debug!(
            fund_id = %deployment.fund_id,
            mode = %config.binding_mode,
            registry = %scripts.registry.hash(),
            transfer = %scripts.transfer.hash(),
            "fund context ready"
        );
        Ok(Self {
            ledger,
            wallet,
            deployment,
            admin,
            scripts,
            config,
        })
    }

    /// Same fund, acting through another wallet.
    pub fn with_wallet(&self, wallet: Arc<dyn Wallet>) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            wallet,
            deployment: self.deployment.clone(),
            admin: self.admin,
            scripts: self.scripts.clone(),
            config: self.config.clone(),
        }
    }

    pub fn fund_id(&self) -> &str {
        &self.deployment.fund_id
    }

    pub fn admin_token(&self) -> &AssetId {
        &self.deployment.params.admin_token
    }

    pub fn admin(&self) -> Identity {
        self.admin
    }

    /// Identity of the acting wallet.
    pub fn identity(&self) -> Identity {
        self.wallet.identity()
    }

    pub fn ledger(&self) -> &dyn LedgerClient {
        self.ledger.as_ref()
    }

    pub fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn scripts(&self) -> &ScriptsBag<ScriptHandle> {
        &self.scripts
    }

    pub fn config(&self) -> &OpsConfig {
        &self.config
    }

    pub fn executor(&self) -> Executor<'_> {
        Executor::new(
            self.ledger(),
            self.wallet(),
            RetryPolicy::from(&self.config.retry),
            self.fund_id(),
        )
    }

    pub fn registry(&self) -> RegistryEngine<'_> {
        RegistryEngine::new(self)
    }

    pub fn transfer(&self) -> TransferEngine<'_> {
        TransferEngine::new(self)
    }

    pub fn view(&self) -> FundView<'_> {
        FundView::new(self)
    }
}
