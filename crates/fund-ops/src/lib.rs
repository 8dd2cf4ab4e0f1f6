//! Operations on a whitelisted fund.
//!
//! A fund keeps its whitelist as registry batches: outputs at the Registry
//! validator listing identities and holding one capability token each.
//! Value lives in transfer slots, each owned by a single identity, and may
//! only move between whitelisted participants.
//!
//! # Key Types
//!
//! - [`FundContext`] — deployment, bound scripts, ledger and wallet for one
//!   invocation
//! - [`RegistryEngine`] — add batches, remove identities, dissolve batches,
//!   audit token accounting
//! - [`TransferEngine`] — deposit, spend and transfer between slots
//! - [`FundView`] — read-only whitelist and balance queries
//! - [`Executor`] — balance, sign, submit and confirm with bounded retry
//! - [`DeployTool`] — create, publish and rebuild deployments

pub mod config;
pub mod context;
pub mod deploy;
pub mod error;
pub mod executor;
pub mod registry;
pub mod retry;
pub mod selection;
pub mod target;
pub mod transfer;
pub mod view;

#[cfg(test)]
mod testkit;

#[cfg(test)]
mod scenarios;

pub use config::{OpsConfig, RetryConfig, SelectionOrder};
pub use context::FundContext;
pub use deploy::DeployTool;
pub use error::{ErrorKind, OpsError, OpsResult};
pub use executor::{Executor, Submitted};
pub use registry::{RegistryAudit, RegistryEngine};
pub use retry::RetryPolicy;
pub use target::TransferTarget;
pub use transfer::TransferEngine;
pub use view::{BatchView, FundView, OwnerFunds};
