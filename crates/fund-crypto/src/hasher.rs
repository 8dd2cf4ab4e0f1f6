use fund_types::{Identity, Script, ScriptHash, TxId, CREDENTIAL_HASH_LEN};

/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a script and a key with identical bytes never produce
/// the same credential. Credentials are the first 28 bytes of the digest.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for validator scripts (script credentials, minting policies).
    pub const SCRIPT: Self = Self {
        domain: "fund-script-v1",
    };
    /// Hasher for public keys (participant identities).
    pub const KEY: Self = Self {
        domain: "fund-key-v1",
    };
    /// Hasher for transaction bodies.
    pub const TX: Self = Self {
        domain: "fund-tx-v1",
    };

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Full 32-byte digest with domain separation.
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    fn credential(&self, data: &[u8]) -> [u8; CREDENTIAL_HASH_LEN] {
        let digest = self.digest(data);
        let mut out = [0u8; CREDENTIAL_HASH_LEN];
        out.copy_from_slice(&digest[..CREDENTIAL_HASH_LEN]);
        out
    }

    /// Hash a serializable value as JSON with domain separation.
    pub fn digest_json<T: serde::Serialize>(&self, value: &T) -> Result<[u8; 32], HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.digest(&data))
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Credential hash of a validator. The language tag is part of the preimage.
pub fn script_hash(script: &Script) -> ScriptHash {
    let mut preimage = Vec::with_capacity(script.code.len() + 16);
    preimage.extend_from_slice(format!("{:?}:", script.language).as_bytes());
    preimage.extend_from_slice(&script.code);
    ScriptHash::from_raw(ContentHasher::SCRIPT.credential(&preimage))
}

/// Participant identity of an Ed25519 public key.
pub fn key_identity(public_key: &[u8; 32]) -> Identity {
    Identity::from_raw(ContentHasher::KEY.credential(public_key))
}

/// Transaction id of a serialized transaction body.
pub fn tx_id(body: &[u8]) -> TxId {
    TxId::from_raw(ContentHasher::TX.digest(body))
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use fund_types::ScriptLanguage;

    #[test]
    fn same_key_bytes_give_same_identity() {
        assert_eq!(key_identity(&[3; 32]), key_identity(&[3; 32]));
        assert_ne!(key_identity(&[3; 32]), key_identity(&[4; 32]));
    }

    #[test]
    fn key_and_script_credentials_never_collide() {
        let bytes = [7u8; 32];
        let as_key = key_identity(&bytes);
        let as_script = script_hash(&Script::new(ScriptLanguage::PlutusV3, bytes.to_vec()));
        assert_ne!(as_key.as_bytes()[..], as_script.as_bytes()[..]);
        assert_ne!(as_key.as_bytes()[..], tx_id(&bytes).as_bytes()[..28]);
    }

    #[test]
    fn script_hash_depends_on_language() {
        let v2 = Script::new(ScriptLanguage::PlutusV2, vec![1, 2, 3]);
        let v3 = Script::new(ScriptLanguage::PlutusV3, vec![1, 2, 3]);
        assert_ne!(script_hash(&v2), script_hash(&v3));
        assert_eq!(script_hash(&v3), script_hash(&v3.clone()));
    }

    #[test]
    fn json_digest_tracks_content() {
        let alpha = serde_json::json!({"fund": "alpha", "batch": 1});
        let beta = serde_json::json!({"fund": "beta", "batch": 1});
        let digest = |v| ContentHasher::TX.digest_json(&v).unwrap();
        assert_eq!(digest(alpha.clone()), digest(alpha));
        assert_ne!(digest(beta.clone()), ContentHasher::SCRIPT.digest_json(&beta).unwrap());
    }

    #[test]
    fn domain_tag_is_part_of_preimage() {
        let registry = ContentHasher::new("fund-registry-v1");
        assert_eq!(registry.domain(), "fund-registry-v1");
        assert_ne!(registry.digest(b"batch"), ContentHasher::TX.digest(b"batch"));
    }
}
