use std::fmt;
use std::str::FromStr;

use fund_types::{Amount, Identity};

use crate::error::OpsError;

/// One recipient of a deposit or spend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferTarget {
    pub identity: Identity,
    pub amount: Amount,
}

impl TransferTarget {
    pub fn new(identity: Identity, amount: impl Into<Amount>) -> Self {
        Self {
            identity,
            amount: amount.into(),
        }
    }
}

impl fmt::Display for TransferTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.identity, self.amount)
    }
}

/// Parses `identity_hex:amount`.
impl FromStr for TransferTarget {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| OpsError::MalformedTarget {
            text: s.to_string(),
            reason,
        };
        let (id, amount) = s
            .split_once(':')
            .ok_or_else(|| malformed("expected identity:amount".to_string()))?;
        let identity = Identity::from_hex(id.trim()).map_err(|e| malformed(e.to_string()))?;
        let amount = amount
            .trim()
            .parse::<Amount>()
            .map_err(|e| malformed(e.to_string()))?;
        Ok(Self { identity, amount })
    }
}

/// Sum of all target amounts.
pub fn total_requested(targets: &[TransferTarget]) -> Amount {
    targets.iter().map(|t| t.amount.clone()).sum()
}
