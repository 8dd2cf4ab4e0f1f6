//! Ledger boundary for the whitelisted fund.
//!
//! This crate provides:
//! - The transaction model ([`UnsignedTx`], [`TxBuilder`], [`SignedTx`])
//! - The [`LedgerClient`] trait every engine talks to
//! - The [`Wallet`] signer trait and a key-backed [`KeyWallet`]
//! - [`InMemoryLedger`], a UTXO ledger enforcing inputs, conservation,
//!   script witnesses and signatures, for tests and local devnets

pub mod error;
pub mod memory;
pub mod traits;
pub mod tx;
pub mod wallet;

pub use error::{LedgerError, LedgerResult, Rejection};
pub use memory::{InMemoryLedger, LedgerSnapshot};
pub use traits::LedgerClient;
pub use tx::{Mint, ScriptWitness, SignedTx, TxBuilder, TxOutput, UnsignedTx, VKeyWitness};
pub use wallet::{KeyWallet, Wallet};
