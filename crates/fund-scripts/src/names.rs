use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three validators every fund deploys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValidatorName {
    /// Minting policy of the capability token.
    AdminToken,
    /// Spend validator guarding whitelist batches.
    Registry,
    /// Spend validator guarding transfer slots.
    Transfer,
}

impl ValidatorName {
    pub const ALL: [ValidatorName; 3] = [
        ValidatorName::AdminToken,
        ValidatorName::Registry,
        ValidatorName::Transfer,
    ];

    /// Title of the validator inside a compiled blueprint.
    pub fn blueprint_title(&self) -> &'static str {
        match self {
            ValidatorName::AdminToken => "admin_token_policy.admin_token_policy.mint",
            ValidatorName::Registry => "registry.registry.spend",
            ValidatorName::Transfer => "transfer.transfer.spend",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidatorName::AdminToken => "AdminToken",
            ValidatorName::Registry => "Registry",
            ValidatorName::Transfer => "Transfer",
        }
    }
}

impl fmt::Display for ValidatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidatorName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidatorName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown validator '{s}'"))
    }
}

/// One value per validator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptsBag<T> {
    #[serde(rename = "AdminToken")]
    pub admin_token: T,
    #[serde(rename = "Registry")]
    pub registry: T,
    #[serde(rename = "Transfer")]
    pub transfer: T,
}

impl<T> ScriptsBag<T> {
    pub fn get(&self, name: ValidatorName) -> &T {
        match name {
            ValidatorName::AdminToken => &self.admin_token,
            ValidatorName::Registry => &self.registry,
            ValidatorName::Transfer => &self.transfer,
        }
    }

    pub fn get_mut(&mut self, name: ValidatorName) -> &mut T {
        match name {
            ValidatorName::AdminToken => &mut self.admin_token,
            ValidatorName::Registry => &mut self.registry,
            ValidatorName::Transfer => &mut self.transfer,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ValidatorName, &T)> {
        ValidatorName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    pub fn map<U>(self, mut f: impl FnMut(ValidatorName, T) -> U) -> ScriptsBag<U> {
        ScriptsBag {
            admin_token: f(ValidatorName::AdminToken, self.admin_token),
            registry: f(ValidatorName::Registry, self.registry),
            transfer: f(ValidatorName::Transfer, self.transfer),
        }
    }

    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(ValidatorName, T) -> Result<U, E>,
    ) -> Result<ScriptsBag<U>, E> {
        Ok(ScriptsBag {
            admin_token: f(ValidatorName::AdminToken, self.admin_token)?,
            registry: f(ValidatorName::Registry, self.registry)?,
            transfer: f(ValidatorName::Transfer, self.transfer)?,
        })
    }
}
