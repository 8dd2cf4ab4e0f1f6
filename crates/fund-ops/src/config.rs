use std::path::Path;
use std::time::Duration;

use fund_scripts::BindingMode;
use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};

/// Bounded retry for ledger submissions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay_ms: u64,
    /// Only retry errors whose message contains this substring.
    pub reason_filter: Option<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay_ms: 3000,
            reason_filter: None,
        }
    }
}

impl RetryConfig {
    /// Retry profile used while publishing validators.
    pub fn deployment() -> Self {
        Self {
            max_attempts: 8,
            delay_ms: 3000,
            reason_filter: Some("ValueNotConserved".into()),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Order in which candidate outputs are scanned by greedy selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrder {
    /// Whatever order the ledger client returns.
    #[default]
    LedgerOrder,
    /// Sorted by output reference (transaction id, then index).
    ByOutputRef,
}

/// Operational settings for the engines and executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    pub retry: RetryConfig,
    pub binding_mode: BindingMode,
    pub selection_order: SelectionOrder,
    /// Native coin locked with each published validator.
    pub publish_deposit: u64,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            binding_mode: BindingMode::Inline,
            selection_order: SelectionOrder::LedgerOrder,
            publish_deposit: 2_000_000,
        }
    }
}

impl OpsConfig {
    pub fn from_toml_str(text: &str) -> OpsResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| OpsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> OpsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| OpsError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> OpsResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(OpsError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.publish_deposit == 0 {
            return Err(OpsError::Config("publish_deposit must be positive".into()));
        }
        Ok(())
    }
}
