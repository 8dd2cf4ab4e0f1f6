use std::fmt;

use fund_types::{Identity, OutputRef, ScriptHash, TxId};

/// Why the ledger refused a transaction.
///
/// Display strings start with the ledger's rule name so retry filters can
/// match on a stable substring (e.g. `"BadInputsUTxO"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The transaction consumes nothing.
    NoInputs,
    /// Inputs or reference inputs that are no longer live.
    BadInputs(Vec<OutputRef>),
    DuplicateInput(OutputRef),
    ValueNotConserved {
        asset: String,
        consumed: String,
        produced: String,
    },
    ZeroValueOutput(usize),
    MissingScriptWitness(ScriptHash),
    ExtraneousScriptWitness(ScriptHash),
    MissingSignature(Identity),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoInputs => write!(f, "InputSetEmptyUTxO"),
            Rejection::BadInputs(refs) => {
                let refs: Vec<String> = refs.iter().map(ToString::to_string).collect();
                write!(f, "BadInputsUTxO: {}", refs.join(", "))
            }
            Rejection::DuplicateInput(r) => write!(f, "DuplicateInputUTxO: {r}"),
            Rejection::ValueNotConserved {
                asset,
                consumed,
                produced,
            } => write!(
                f,
                "ValueNotConservedUTxO: {asset} consumed+minted {consumed} != produced {produced}"
            ),
            Rejection::ZeroValueOutput(index) => write!(f, "OutputTooSmallUTxO: output {index}"),
            Rejection::MissingScriptWitness(hash) => {
                write!(f, "MissingScriptWitnessesUTXOW: {hash}")
            }
            Rejection::ExtraneousScriptWitness(hash) => {
                write!(f, "ExtraneousScriptWitnessesUTXOW: {hash}")
            }
            Rejection::MissingSignature(id) => write!(f, "MissingVKeyWitnessesUTXOW: {id}"),
        }
    }
}

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("transaction {tx_id} rejected: {reason}")]
    Rejected { tx_id: TxId, reason: Rejection },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    /// A rejection caused by a racing transaction consuming our inputs.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            LedgerError::Rejected {
                reason: Rejection::BadInputs(_),
                ..
            }
        )
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
