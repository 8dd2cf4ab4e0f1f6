//! Cryptographic primitives for the whitelisted fund.
//!
//! Provides domain-separated BLAKE3 hashing for script credentials,
//! participant identities and transaction ids, plus Ed25519 signing.
//!
//! Hashing is `blake3`, signatures are `ed25519-dalek`; nothing here
//! implements a primitive of its own.

pub mod hasher;
pub mod signer;

pub use hasher::{key_identity, script_hash, tx_id, ContentHasher, HasherError};
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
