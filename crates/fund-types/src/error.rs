use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// An asset unit could not be split into a policy segment plus name.
    #[error("malformed asset unit '{unit}': {reason}")]
    MalformedUnit { unit: String, reason: String },

    /// An output reference did not parse as `txid#index`.
    #[error("malformed output reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("invalid amount '{0}': expected a non-negative integer")]
    InvalidAmount(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
