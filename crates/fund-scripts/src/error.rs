use fund_ledger::LedgerError;
use fund_types::OutputRef;

use crate::names::ValidatorName;

/// Errors from validator resolution and script binding.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The blueprint has no validator under the expected title.
    #[error("validator {title} not present in blueprint")]
    UnknownValidator { title: String },

    /// The blueprint document could not be parsed.
    #[error("invalid blueprint: {0}")]
    Blueprint(String),

    /// Parameters do not belong to the validator they were applied to.
    #[error("parameters for {given} applied to {expected}")]
    ParamsMismatch {
        expected: ValidatorName,
        given: ValidatorName,
    },

    /// A published copy is gone or no longer carries the expected script.
    #[error("published {name} script missing at {out_ref}: {reason}")]
    PublishedScriptMissing {
        name: ValidatorName,
        out_ref: OutputRef,
        reason: String,
    },

    /// Published binding requested but the deployment never published this script.
    #[error("no published reference recorded for {0}")]
    NotPublished(ValidatorName),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result alias for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;
