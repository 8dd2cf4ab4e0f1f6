use fund_ledger::{LedgerError, Rejection};
use fund_scripts::ScriptError;
use fund_store::StoreError;
use fund_types::{Amount, Identity, OutputRef, TxId, TypeError};
use thiserror::Error;

/// Coarse failure classes callers branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvariantViolation,
    InsufficientFunds,
    EmptyInput,
    Malformed,
    LedgerConflict,
    LedgerUnavailable,
}

/// Errors surfaced by fund operations.
///
/// Each variant names the fund, asset, identity or output involved so the
/// failure is actionable without consulting logs.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error("fund {fund_id}: cannot add an empty batch")]
    EmptyBatch { fund_id: String },

    #[error("fund {fund_id}: no transfer targets given")]
    EmptyTargets { fund_id: String },

    #[error("fund {fund_id}: no output references given")]
    EmptyReferences { fund_id: String },

    #[error("fund {fund_id}: identity {identity} is not in any registry batch")]
    IdentityNotFound { fund_id: String, identity: Identity },

    #[error("fund {fund_id}: no live output at {out_ref}")]
    OutputNotFound { fund_id: String, out_ref: OutputRef },

    #[error("fund {fund_id}: output {out_ref} is not a registry batch")]
    NotARegistryBatch { fund_id: String, out_ref: OutputRef },

    #[error("fund {fund_id}: sender {identity} is not whitelisted")]
    SenderNotWhitelisted { fund_id: String, identity: Identity },

    #[error("fund {fund_id}: recipient {identity} is not whitelisted")]
    RecipientNotWhitelisted { fund_id: String, identity: Identity },

    #[error("fund {fund_id}: {owner} holds {available} of {asset}, needs {required}")]
    InsufficientFunds {
        fund_id: String,
        owner: Identity,
        asset: String,
        required: Amount,
        available: Amount,
    },

    #[error("fund {fund_id}: input {out_ref} is not spendable by {sender}")]
    ForeignInput {
        fund_id: String,
        out_ref: OutputRef,
        sender: Identity,
    },

    #[error("fund {fund_id}: target {identity} has a zero amount")]
    ZeroAmount { fund_id: String, identity: Identity },

    #[error("deployment not found: {fund_id}")]
    DeploymentNotFound { fund_id: String },

    #[error("fund {fund_id}: {source}")]
    Script {
        fund_id: String,
        #[source]
        source: ScriptError,
    },

    #[error("fund {fund_id}: invariant violated at {out_ref}: {detail}")]
    InvariantViolation {
        fund_id: String,
        out_ref: OutputRef,
        detail: String,
    },

    #[error("malformed target '{text}': {reason}")]
    MalformedTarget { text: String, reason: String },

    #[error(transparent)]
    Malformed(#[from] TypeError),

    #[error("transaction {tx_id} conflicted after {attempts} attempt(s): {reason}")]
    LedgerConflict {
        tx_id: TxId,
        reason: Rejection,
        attempts: u32,
    },

    #[error("transaction {tx_id} rejected: {reason}")]
    LedgerRejected { tx_id: TxId, reason: Rejection },

    #[error("transaction {tx_id} was not confirmed")]
    NotConfirmed { tx_id: TxId },

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl OpsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OpsError::EmptyBatch { .. }
            | OpsError::EmptyTargets { .. }
            | OpsError::EmptyReferences { .. } => ErrorKind::EmptyInput,
            OpsError::IdentityNotFound { .. }
            | OpsError::OutputNotFound { .. }
            | OpsError::SenderNotWhitelisted { .. }
            | OpsError::RecipientNotWhitelisted { .. }
            | OpsError::DeploymentNotFound { .. } => ErrorKind::NotFound,
            OpsError::Script { source, .. } => match source {
                ScriptError::PublishedScriptMissing { .. } | ScriptError::NotPublished(_) => {
                    ErrorKind::NotFound
                }
                ScriptError::Ledger(_) => ErrorKind::LedgerUnavailable,
                _ => ErrorKind::InvariantViolation,
            },
            OpsError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            OpsError::ZeroAmount { .. }
            | OpsError::ForeignInput { .. }
            | OpsError::MalformedTarget { .. }
            | OpsError::Malformed(_)
            | OpsError::Config(_) => ErrorKind::Malformed,
            OpsError::NotARegistryBatch { .. }
            | OpsError::InvariantViolation { .. }
            | OpsError::LedgerRejected { .. } => ErrorKind::InvariantViolation,
            OpsError::LedgerConflict { .. } => ErrorKind::LedgerConflict,
            OpsError::NotConfirmed { .. } | OpsError::LedgerUnavailable(_) => {
                ErrorKind::LedgerUnavailable
            }
            OpsError::Store(StoreError::DeploymentNotFound { .. })
            | OpsError::Store(StoreError::AccountNotFound { .. }) => ErrorKind::NotFound,
            OpsError::Store(_) => ErrorKind::LedgerUnavailable,
        }
    }

    /// Whether the error originated at the ledger boundary.
    pub fn is_ledger_error(&self) -> bool {
        matches!(
            self,
            OpsError::LedgerConflict { .. }
                | OpsError::LedgerRejected { .. }
                | OpsError::NotConfirmed { .. }
                | OpsError::LedgerUnavailable(_)
        )
    }
}

impl From<LedgerError> for OpsError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected { tx_id, reason } => match reason {
                Rejection::BadInputs(_) => OpsError::LedgerConflict {
                    tx_id,
                    reason,
                    attempts: 1,
                },
                reason => OpsError::LedgerRejected { tx_id, reason },
            },
            LedgerError::Unavailable(msg) => OpsError::LedgerUnavailable(msg),
            LedgerError::Serialization(msg) => OpsError::LedgerUnavailable(msg),
        }
    }
}

impl From<StoreError> for OpsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DeploymentNotFound { fund_id } => OpsError::DeploymentNotFound { fund_id },
            other => OpsError::Store(other),
        }
    }
}

pub type OpsResult<T> = Result<T, OpsError>;
