//! Error types for metadata store operations.

use fund_scripts::ScriptError;
use thiserror::Error;

/// Errors that can occur while reading or writing fund metadata.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No deployment is recorded for this fund.
    #[error("deployment not found: {fund_id}")]
    DeploymentNotFound { fund_id: String },

    /// A deployment with this fund id already exists.
    #[error("deployment already exists: {fund_id}")]
    DeploymentExists { fund_id: String },

    #[error("account not found: {alias}")]
    AccountNotFound { alias: String },

    #[error("account already exists: {alias}")]
    AccountExists { alias: String },

    /// Stored secret key does not decode.
    #[error("invalid key for account {alias}: {reason}")]
    InvalidKey { alias: String, reason: String },

    /// Rebuilding or creating a deployment failed to resolve a validator.
    #[error("script resolution failed: {0}")]
    Script(#[from] ScriptError),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error in the file-backed store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
