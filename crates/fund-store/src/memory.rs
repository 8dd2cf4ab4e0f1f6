//! In-memory metadata store for tests and ephemeral use.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::deployment::Deployment;
use crate::error::{Result, StoreError};
use crate::traits::{AccountStore, DeploymentStore};

/// Serialized contents shared by every store backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub deployments: BTreeMap<String, Deployment>,
    #[serde(default)]
    pub accounts: BTreeMap<String, Account>,
}

impl StoreState {
    pub(crate) fn add_deployment(&mut self, deployment: &Deployment) -> Result<()> {
        if self.deployments.contains_key(&deployment.fund_id) {
            return Err(StoreError::DeploymentExists {
                fund_id: deployment.fund_id.clone(),
            });
        }
        self.deployments
            .insert(deployment.fund_id.clone(), deployment.clone());
        Ok(())
    }

    pub(crate) fn replace_deployment(&mut self, deployment: &Deployment) -> Result<()> {
        match self.deployments.get_mut(&deployment.fund_id) {
            Some(slot) => {
                *slot = deployment.clone();
                Ok(())
            }
            None => Err(StoreError::DeploymentNotFound {
                fund_id: deployment.fund_id.clone(),
            }),
        }
    }

    pub(crate) fn add_account(&mut self, account: &Account) -> Result<()> {
        if self.accounts.contains_key(&account.alias) {
            return Err(StoreError::AccountExists {
                alias: account.alias.clone(),
            });
        }
        self.accounts.insert(account.alias.clone(), account.clone());
        Ok(())
    }
}

/// A [`DeploymentStore`] + [`AccountStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|e| StoreError::Serialization(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|e| StoreError::Serialization(format!("lock poisoned: {e}")))
    }
}

impl DeploymentStore for InMemoryStore {
    fn get_deployment(&self, fund_id: &str) -> Result<Option<Deployment>> {
        Ok(self.read()?.deployments.get(fund_id).cloned())
    }

    fn add_deployment(&self, deployment: &Deployment) -> Result<()> {
        self.write()?.add_deployment(deployment)
    }

    fn replace_deployment(&self, deployment: &Deployment) -> Result<()> {
        self.write()?.replace_deployment(deployment)
    }

    fn list_deployments(&self) -> Result<Vec<Deployment>> {
        Ok(self.read()?.deployments.values().cloned().collect())
    }
}

impl AccountStore for InMemoryStore {
    fn get_account(&self, alias: &str) -> Result<Option<Account>> {
        Ok(self.read()?.accounts.get(alias).cloned())
    }

    fn add_account(&self, account: &Account) -> Result<()> {
        self.write()?.add_account(account)
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.read()?.accounts.values().cloned().collect())
    }
}
