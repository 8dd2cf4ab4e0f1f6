use fund_crypto::SigningKey;
use fund_types::{Address, Identity};

use crate::error::LedgerResult;
use crate::tx::{SignedTx, UnsignedTx, VKeyWitness};

/// Signer bound to one participant identity.
///
/// Engines only ever ask for the identity (to add it as a required signer
/// or tag change outputs); key material stays behind this trait.
pub trait Wallet: Send + Sync {
    fn identity(&self) -> Identity;

    /// Key address holding this wallet's own funds.
    fn address(&self) -> Address {
        Address::Key(self.identity())
    }

    /// Attach this wallet's witness to a transaction.
    fn sign(&self, tx: UnsignedTx) -> LedgerResult<SignedTx>;

    /// Add this wallet's witness to an already signed transaction.
    fn cosign(&self, signed: SignedTx) -> LedgerResult<SignedTx>;
}

/// Wallet backed by a single Ed25519 key.
#[derive(Clone, Debug)]
pub struct KeyWallet {
    key: SigningKey,
}

impl KeyWallet {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn generate() -> Self {
        Self::new(SigningKey::generate())
    }

    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    fn witness(&self, signed: &SignedTx) -> VKeyWitness {
        VKeyWitness {
            key: self.key.verifying_key(),
            signature: self.key.sign(signed.id.as_bytes()),
        }
    }
}

impl Wallet for KeyWallet {
    fn identity(&self) -> Identity {
        self.key.identity()
    }

    fn sign(&self, tx: UnsignedTx) -> LedgerResult<SignedTx> {
        let signed = SignedTx {
            id: tx.id()?,
            tx,
            witnesses: Vec::new(),
        };
        self.cosign(signed)
    }

    fn cosign(&self, mut signed: SignedTx) -> LedgerResult<SignedTx> {
        let witness = self.witness(&signed);
        signed.witnesses.push(witness);
        Ok(signed)
    }
}
