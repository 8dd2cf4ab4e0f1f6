use fund_crypto::SigningKey;
use fund_types::{Address, Identity};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// A named key held by the local operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub alias: String,
    /// Ed25519 secret key, hex encoded.
    pub secret_key: String,
    pub identity: Identity,
}

impl Account {
    pub fn generate(alias: impl Into<String>) -> Self {
        Self::from_key(alias, &SigningKey::generate())
    }

    pub fn from_key(alias: impl Into<String>, key: &SigningKey) -> Self {
        Self {
            alias: alias.into(),
            secret_key: key.to_hex(),
            identity: key.identity(),
        }
    }

    pub fn signing_key(&self) -> Result<SigningKey> {
        let key = SigningKey::from_hex(&self.secret_key).map_err(|e| StoreError::InvalidKey {
            alias: self.alias.clone(),
            reason: e.to_string(),
        })?;
        if key.identity() != self.identity {
            return Err(StoreError::InvalidKey {
                alias: self.alias.clone(),
                reason: "identity does not match key".into(),
            });
        }
        Ok(key)
    }

    pub fn address(&self) -> Address {
        Address::Key(self.identity)
    }
}
