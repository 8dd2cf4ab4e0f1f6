//! Foundation types for the whitelisted fund.
//!
//! This crate provides the value and identity model shared by every other
//! crate in the workspace. The types carry no behaviour beyond equality,
//! ordering, parsing and formatting.
//!
//! # Key Types
//!
//! - [`Identity`] — 28-byte participant credential hash
//! - [`AssetId`] — (policy, name) pair with a lossless compact unit form
//! - [`Amount`] — arbitrary-precision non-negative quantity
//! - [`Value`] — asset-amount map held by an output
//! - [`OutputRef`] / [`Output`] — ledger outputs and their references
//! - [`Datum`] — registry batch list or transfer slot owner

pub mod amount;
pub mod asset;
pub mod error;
pub mod identity;
pub mod output;
pub mod value;

pub use amount::Amount;
pub use asset::{AssetId, AssetName};
pub use error::TypeError;
pub use identity::{Identity, PolicyId, ScriptHash, CREDENTIAL_HASH_LEN};
pub use output::{Address, Datum, Output, OutputRef, Script, ScriptLanguage, TxId};
pub use value::Value;
