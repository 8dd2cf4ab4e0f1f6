//! Fund metadata: deployments and operator accounts.
//!
//! - [`Deployment`] binds a fund id to its validators, capability token and
//!   published script references
//! - [`DeploymentStore`] / [`AccountStore`] are the storage seams
//! - [`InMemoryStore`] and [`JsonFileStore`] implement both

pub mod account;
pub mod deployment;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use account::Account;
pub use deployment::{Deployment, DeploymentParams};
pub use error::{Result, StoreError};
pub use file::JsonFileStore;
pub use memory::{InMemoryStore, StoreState};
pub use traits::{AccountStore, DeploymentStore};
