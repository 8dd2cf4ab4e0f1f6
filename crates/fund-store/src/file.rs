//! JSON-file metadata store.
//!
//! The whole state lives in one pretty-printed JSON document. Every
//! mutation rewrites the file through a temporary sibling and a rename, so
//! a crash leaves either the old or the new document on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::account::Account;
use crate::deployment::Deployment;
use crate::error::{Result, StoreError};
use crate::memory::StoreState;
use crate::traits::{AccountStore, DeploymentStore};

pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text).map_err(|e| StoreError::Serialization(e.to_string()))?
        } else {
            StoreState::default()
        };
        debug!(path = %path.display(), "metadata store opened");
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `f` to a copy of the state and persist it; memory is updated
    /// only after the write succeeds.
    fn mutate(&self, f: impl FnOnce(&mut StoreState) -> Result<()>) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|e| StoreError::Serialization(format!("lock poisoned: {e}")))?;
        let mut next = guard.clone();
        f(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T> {
        let guard = self
            .state
            .read()
            .map_err(|e| StoreError::Serialization(format!("lock poisoned: {e}")))?;
        Ok(f(&guard))
    }
}

impl DeploymentStore for JsonFileStore {
    fn get_deployment(&self, fund_id: &str) -> Result<Option<Deployment>> {
        self.read(|s| s.deployments.get(fund_id).cloned())
    }

    fn add_deployment(&self, deployment: &Deployment) -> Result<()> {
        self.mutate(|s| s.add_deployment(deployment))
    }

    fn replace_deployment(&self, deployment: &Deployment) -> Result<()> {
        self.mutate(|s| s.replace_deployment(deployment))
    }

    fn list_deployments(&self) -> Result<Vec<Deployment>> {
        self.read(|s| s.deployments.values().cloned().collect())
    }
}

impl AccountStore for JsonFileStore {
    fn get_account(&self, alias: &str) -> Result<Option<Account>> {
        self.read(|s| s.accounts.get(alias).cloned())
    }

    fn add_account(&self, account: &Account) -> Result<()> {
        self.mutate(|s| s.add_account(account))
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.read(|s| s.accounts.values().cloned().collect())
    }
}
