//! SQLite access for résumé data.
//!
//! # Responsibility
//! - Open and configure the read-only connection used for one render run.
//! - Run fixed queries and hand back fixed-arity tuples of [`FieldValue`].
//! - Bound connection and query retries by wall-clock time.
//!
//! # Invariants
//! - One connection per executor; it is reused for every query.
//! - Core code never writes; the schema belongs to whoever owns the database.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod executor;
mod open;
pub mod retry;

pub use executor::{FieldValue, QueryExecutor, SqliteExecutor};
pub use open::{open_db, open_db_in_memory};
pub use retry::{retry_with_policy, RetryPolicy};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A transient failure outlived the retry window.
    RetryExhausted {
        operation: &'static str,
        attempts: u32,
        elapsed: Duration,
        source: rusqlite::Error,
    },
    InvalidData(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::RetryExhausted {
                operation,
                attempts,
                elapsed,
                source,
            } => write!(
                f,
                "{operation} failed after {attempts} attempts in {}ms: {source}",
                elapsed.as_millis()
            ),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::RetryExhausted { source, .. } => Some(source),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
