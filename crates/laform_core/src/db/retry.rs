//! Bounded retry for connection acquisition and query execution.
//!
//! # Invariants
//! - Only transient SQLite failures (busy, locked, cannot-open) are retried.
//! - Total time spent sleeping never pushes past `max_elapsed`.
//! - Backoff doubles per attempt up to `max_backoff`.

use super::{DbError, DbResult};
use log::warn;
use rusqlite::ErrorCode;
use std::time::{Duration, Instant};

/// Wall-clock retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_elapsed: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_elapsed: Duration::from_secs(10),
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_elapsed: Duration::ZERO,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Default backoff with a custom wall-clock window.
    pub fn with_max_elapsed(max_elapsed: Duration) -> Self {
        Self {
            max_elapsed,
            ..Self::default()
        }
    }

    fn next_backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_backoff)
    }
}

/// Runs `op` until it succeeds, fails permanently, or the policy window closes.
///
/// `operation` names the call in logs and in [`DbError::RetryExhausted`].
pub fn retry_with_policy<T, F>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut op: F,
) -> DbResult<T>
where
    F: FnMut() -> rusqlite::Result<T>,
{
    let started_at = Instant::now();
    let mut backoff = policy.initial_backoff;
    let mut attempts = 0_u32;

    loop {
        attempts += 1;
        let err = match op() {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_transient(&err) {
            return Err(DbError::Sqlite(err));
        }

        let elapsed = started_at.elapsed();
        if elapsed + backoff >= policy.max_elapsed {
            return Err(DbError::RetryExhausted {
                operation,
                attempts,
                elapsed,
                source: err,
            });
        }

        warn!(
            "event=db_retry module=db status=retry operation={} attempt={} backoff_ms={} error={}",
            operation,
            attempts,
            backoff.as_millis(),
            err
        );
        std::thread::sleep(backoff);
        backoff = policy.next_backoff(backoff);
    }
}

/// Returns whether a SQLite failure may clear up on its own.
pub fn is_transient(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => matches!(
            failure.code,
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen
        ),
        _ => false,
    }
}
