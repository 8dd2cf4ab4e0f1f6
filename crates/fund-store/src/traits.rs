//! Storage interfaces for fund metadata.
//!
//! Engines receive these through an explicit context object; nothing in the
//! workspace keeps process-wide store state.

use crate::account::Account;
use crate::deployment::Deployment;
use crate::error::{Result, StoreError};

/// Deployment records keyed by fund id.
pub trait DeploymentStore: Send + Sync {
    /// Returns `Ok(None)` if no deployment exists for `fund_id`.
    fn get_deployment(&self, fund_id: &str) -> Result<Option<Deployment>>;

    /// Insert a new deployment. Fails if the fund id is taken.
    fn add_deployment(&self, deployment: &Deployment) -> Result<()>;

    /// Replace an existing deployment (rebuild).
    fn replace_deployment(&self, deployment: &Deployment) -> Result<()>;

    /// All deployments, ordered by fund id.
    fn list_deployments(&self) -> Result<Vec<Deployment>>;

    fn require_deployment(&self, fund_id: &str) -> Result<Deployment> {
        self.get_deployment(fund_id)?
            .ok_or_else(|| StoreError::DeploymentNotFound {
                fund_id: fund_id.to_string(),
            })
    }
}

/// Named key records.
pub trait AccountStore: Send + Sync {
    fn get_account(&self, alias: &str) -> Result<Option<Account>>;

    /// Insert a new account. Fails if the alias is taken.
    fn add_account(&self, account: &Account) -> Result<()>;

    /// All accounts, ordered by alias.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    fn require_account(&self, alias: &str) -> Result<Account> {
        self.get_account(alias)?
            .ok_or_else(|| StoreError::AccountNotFound {
                alias: alias.to_string(),
            })
    }
}
