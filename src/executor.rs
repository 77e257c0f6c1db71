//! Retrying statement executor.
//!
//! One retry loop serves both failure policies: callers that must succeed
//! propagate the exhaustion error with `?` (schema creation, space
//! selection), callers that may lose a batch use [`Executor::execute_recorded`]
//! to append the error to the run's error list and carry on.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::client::GraphSession;
use crate::error::StoreError;
use crate::stats::ImportStats;

pub struct Executor<'a, S: GraphSession> {
    session: &'a S,
    max_retries: u32,
    retry_delay: Duration,
}

impl<'a, S: GraphSession> Executor<'a, S> {
    pub fn new(session: &'a S, max_retries: u32, retry_delay: Duration) -> Executor<'a, S> {
        Executor {
            session,
            max_retries,
            retry_delay,
        }
    }

    /// Execute a statement, retrying transient failures with a fixed delay.
    ///
    /// Makes exactly `max_retries + 1` attempts before giving up with
    /// [`StoreError::Exhausted`].
    pub async fn execute(&self, statement: &str) -> Result<(), StoreError> {
        let attempts = self.max_retries.saturating_add(1);
        let mut last = String::new();

        for attempt in 1..=attempts {
            match self.session.execute(statement).await {
                Ok(outcome) if outcome.is_succeeded() => return Ok(()),
                Ok(outcome) => {
                    last = format!("code {}: {}", outcome.code, outcome.message);
                }
                Err(e) => {
                    last = e.to_string();
                }
            }

            if attempt < attempts {
                warn!(
                    "Statement failed (attempt {}/{}): {}",
                    attempt, attempts, last
                );
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Err(StoreError::Exhausted { attempts, last })
    }

    /// Execute a statement, recording a terminal failure instead of
    /// propagating it. Returns whether the statement succeeded.
    pub async fn execute_recorded(&self, statement: &str, stats: &mut ImportStats) -> bool {
        match self.execute(statement).await {
            Ok(()) => true,
            Err(e) => {
                error!("Statement failed permanently: {}", e);
                debug!("Failed statement: {}", statement);
                stats.record_error(e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ExecOutcome;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio_test::{assert_err, assert_ok};

    /// Session that fails the first `failures` calls, then succeeds.
    struct FlakySession {
        failures: u32,
        calls: AtomicU32,
        transport_errors: bool,
    }

    impl FlakySession {
        fn failing(failures: u32) -> FlakySession {
            FlakySession {
                failures,
                calls: AtomicU32::new(0),
                transport_errors: false,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GraphSession for FlakySession {
        async fn execute(&self, _statement: &str) -> Result<ExecOutcome, StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                if self.transport_errors {
                    return Err(StoreError::MalformedResponse("boom".into()));
                }
                return Ok(ExecOutcome {
                    code: -1005,
                    message: "storage is busy".into(),
                    data: serde_json::Value::Null,
                });
            }
            Ok(ExecOutcome::ok())
        }

        async fn disconnect(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_always_failing_statement_uses_full_attempt_budget() {
        let session = FlakySession::failing(u32::MAX);
        let executor = Executor::new(&session, 3, Duration::ZERO);

        let err = executor.execute("INSERT VERTEX ...").await.unwrap_err();
        assert_eq!(session.calls(), 4);
        match err {
            StoreError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 4);
                assert!(last.contains("storage is busy"));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let session = FlakySession::failing(2);
        let executor = Executor::new(&session, 3, Duration::ZERO);

        assert_ok!(executor.execute("CREATE TAG ...").await);
        assert_eq!(session.calls(), 3);
    }

    #[tokio::test]
    async fn test_maximum_retry_setting_does_not_wrap() {
        let session = FlakySession::failing(0);
        let executor = Executor::new(&session, u32::MAX, Duration::ZERO);

        assert_ok!(executor.execute("USE graphrag").await);
        assert_eq!(session.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried_too() {
        let session = FlakySession {
            failures: 1,
            calls: AtomicU32::new(0),
            transport_errors: true,
        };
        let executor = Executor::new(&session, 1, Duration::ZERO);

        assert_ok!(executor.execute("USE graphrag").await);
        assert_eq!(session.calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let session = FlakySession::failing(1);
        let executor = Executor::new(&session, 0, Duration::ZERO);

        assert_err!(executor.execute("USE graphrag").await);
        assert_eq!(session.calls(), 1);
    }

    #[tokio::test]
    async fn test_execute_recorded_appends_to_error_list() {
        let session = FlakySession::failing(u32::MAX);
        let executor = Executor::new(&session, 1, Duration::ZERO);
        let mut stats = ImportStats::default();

        let ok = executor.execute_recorded("INSERT EDGE ...", &mut stats).await;
        assert!(!ok);
        assert_eq!(stats.errors().len(), 1);
        assert!(stats.errors()[0].contains("after 2 attempts"));
    }
}
