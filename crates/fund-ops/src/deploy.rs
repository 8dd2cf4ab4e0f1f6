use std::sync::Arc;

use fund_ledger::{LedgerClient, TxBuilder, TxOutput, Wallet};
use fund_scripts::{ScriptRepository, ValidatorName};
use fund_store::{Deployment, DeploymentStore, StoreError};
use fund_types::{Address, Amount, AssetId, Datum, OutputRef, Script, Value};
use tracing::info;

use crate::config::{OpsConfig, RetryConfig};
use crate::error::OpsResult;
use crate::executor::Executor;
use crate::retry::RetryPolicy;

/// Creates, publishes and rebuilds fund deployments.
///
/// The acting wallet becomes the fund admin and pays for publication.
pub struct DeployTool {
    ledger: Arc<dyn LedgerClient>,
    wallet: Arc<dyn Wallet>,
    repo: Arc<dyn ScriptRepository>,
    config: OpsConfig,
    retry: RetryConfig,
}

impl DeployTool {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        wallet: Arc<dyn Wallet>,
        repo: Arc<dyn ScriptRepository>,
        config: OpsConfig,
    ) -> Self {
        Self {
            ledger,
            wallet,
            repo,
            config,
            retry: RetryConfig::deployment(),
        }
    }

    /// Override the publication retry profile.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Resolve the validators for `fund_id`, optionally publish them, and
    /// record the deployment.
    pub async fn deploy(
        &self,
        store: &dyn DeploymentStore,
        fund_id: &str,
        description: Option<String>,
        publish: bool,
    ) -> OpsResult<Deployment> {
        if store.get_deployment(fund_id)?.is_some() {
            return Err(StoreError::DeploymentExists {
                fund_id: fund_id.to_string(),
            }
            .into());
        }
        let mut deployment = Deployment::create(self.repo.as_ref(), fund_id, self.wallet.identity())?;
        if let Some(description) = description {
            deployment = deployment.with_description(description);
        }
        if publish {
            self.publish_all(&mut deployment).await?;
        }
        store.add_deployment(&deployment)?;
        info!(
            fund_id,
            admin = %self.wallet.identity(),
            admin_token = %deployment.params.admin_token,
            published = deployment.is_published(),
            "fund deployed"
        );
        Ok(deployment)
    }

    /// Recompute scripts and derived hashes for an existing deployment and
    /// store the result. Published copies of changed scripts are republished
    /// when `publish` is set.
    pub async fn rebuild(
        &self,
        store: &dyn DeploymentStore,
        fund_id: &str,
        publish: bool,
    ) -> OpsResult<Deployment> {
        let current = store.require_deployment(fund_id)?;
        let mut rebuilt = current.rebuild(self.repo.as_ref())?;
        if publish {
            self.publish_all(&mut rebuilt).await?;
        }
        store.replace_deployment(&rebuilt)?;
        info!(
            fund_id,
            admin_token = %rebuilt.params.admin_token,
            changed = rebuilt.params != current.params,
            "deployment rebuilt"
        );
        Ok(rebuilt)
    }

    /// Publish every script that has no recorded copy yet.
    async fn publish_all(&self, deployment: &mut Deployment) -> OpsResult<()> {
        for name in ValidatorName::ALL {
            if deployment.script_refs.get(name).is_some() {
                continue;
            }
            let script = deployment.scripts.get(name).clone();
            let out_ref = self.publish_script(&deployment.fund_id, script).await?;
            info!(fund_id = %deployment.fund_id, %name, %out_ref, "validator published");
            *deployment.script_refs.get_mut(name) = Some(out_ref);
        }
        Ok(())
    }

    /// Park `script` at the unspendable address so later transactions can
    /// reference it instead of carrying it.
    pub async fn publish_script(&self, fund_id: &str, script: Script) -> OpsResult<OutputRef> {
        let holder = TxOutput::new(
            Address::unspendable(),
            Value::of(AssetId::coin(), Amount::from(self.config.publish_deposit)),
        )
        .with_datum(Datum::Void)
        .with_script_ref(script);

        let executor = Executor::new(
            self.ledger.as_ref(),
            self.wallet.as_ref(),
            RetryPolicy::from(&self.retry),
            fund_id,
        );
        let submitted = executor
            .execute("deploy.publish", || {
                let holder = holder.clone();
                async move { Ok(TxBuilder::new().pay_to(holder)) }
            })
            .await?;
        // The holder is always the first output; change follows it.
        Ok(OutputRef::new(submitted.tx_id, 0))
    }
}
