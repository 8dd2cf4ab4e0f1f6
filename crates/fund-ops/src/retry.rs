use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{ErrorKind, OpsError, OpsResult};

/// Bounded, fixed-delay retry around a fallible async operation.
///
/// Only ledger-side failures are retried. Without a reason filter that
/// means conflicts and unavailability; with a filter, any ledger error
/// whose message contains the filter.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    reason_filter: Option<String>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration, reason_filter: Option<String>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            reason_filter,
        }
    }

    /// Run the operation exactly once.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO, None)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn should_retry(&self, err: &OpsError) -> bool {
        if !err.is_ledger_error() {
            return false;
        }
        match &self.reason_filter {
            Some(filter) => err.to_string().contains(filter.as_str()),
            None => matches!(
                err.kind(),
                ErrorKind::LedgerConflict | ErrorKind::LedgerUnavailable
            ),
        }
    }

    /// Call `op` until it succeeds, fails with a non-retryable error, or
    /// attempts run out. An exhausted conflict reports the attempt count.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> OpsResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = OpsResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && self.should_retry(&err) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(OpsError::LedgerConflict { tx_id, reason, .. }) => {
                    return Err(OpsError::LedgerConflict {
                        tx_id,
                        reason,
                        attempts: attempt,
                    })
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.delay(),
            config.reason_filter.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fund_ledger::Rejection;
    use fund_types::TxId;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn conflict() -> OpsError {
        OpsError::LedgerConflict {
            tx_id: TxId::from_raw([0; 32]),
            reason: Rejection::BadInputs(vec![]),
            attempts: 1,
        }
    }

    fn not_conserved() -> OpsError {
        OpsError::LedgerRejected {
            tx_id: TxId::from_raw([0; 32]),
            reason: Rejection::ValueNotConserved {
                asset: "x".into(),
                consumed: "1".into(),
                produced: "2".into(),
            },
        }
    }

    #[tokio::test]
    async fn conflicts_retry_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(5, Duration::ZERO, None);
        let result = policy
            .run(move |_| async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(conflict())
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();
        assert_eq!(result, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_conflict_reports_attempts() {
        let policy = RetryPolicy::new(3, Duration::ZERO, None);
        let err = policy
            .run(|_| async { Err::<(), _>(conflict()) })
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::LedgerConflict { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn validation_errors_are_never_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(5, Duration::ZERO, None);
        let err = policy
            .run(move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(OpsError::EmptyBatch {
                    fund_id: "f".into(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::EmptyBatch { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn filter_restricts_retry_to_matching_reason() {
        let policy = RetryPolicy::new(8, Duration::ZERO, Some("ValueNotConserved".into()));
        assert!(policy.should_retry(&not_conserved()));
        assert!(!policy.should_retry(&conflict()));

        let unfiltered = RetryPolicy::new(8, Duration::ZERO, None);
        assert!(!unfiltered.should_retry(&not_conserved()));
        assert!(unfiltered.should_retry(&conflict()));
    }
}
