//! Query executor contract and its SQLite implementation.
//!
//! # Responsibility
//! - Run a fixed SQL string and return fixed-arity tuples.
//! - Keep rusqlite types out of the shaping and rendering layers.

use super::open::open_db;
use super::retry::{retry_with_policy, RetryPolicy};
use super::{DbError, DbResult};
use chrono::NaiveDate;
use log::{debug, error};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// One scalar cell carried from storage through rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// Short type label used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// Synchronous read-only query interface over the résumé store.
pub trait QueryExecutor {
    /// Runs `sql` with positional `params` and returns every row as a tuple.
    fn query(&self, sql: &str, params: &[FieldValue]) -> DbResult<Vec<Vec<FieldValue>>>;

    /// Drops and re-acquires the underlying connection where that makes sense.
    fn reconnect(&mut self) -> DbResult<()> {
        Ok(())
    }
}

/// SQLite-backed executor owning one connection for its lifetime.
pub struct SqliteExecutor {
    conn: Connection,
    path: Option<PathBuf>,
    policy: RetryPolicy,
}

impl SqliteExecutor {
    /// Opens the database file at `path` under the bounded retry `policy`.
    pub fn open(path: impl AsRef<Path>, policy: RetryPolicy) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_db(&path, &policy)?;
        Ok(Self {
            conn,
            path: Some(path),
            policy,
        })
    }

    /// Wraps an already configured connection.
    ///
    /// `reconnect` is a no-op for executors built this way.
    pub fn from_connection(conn: Connection, policy: RetryPolicy) -> Self {
        Self {
            conn,
            path: None,
            policy,
        }
    }

    fn run(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<Vec<FieldValue>>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut tuples = Vec::new();

        while let Some(row) = rows.next()? {
            let mut tuple = Vec::with_capacity(width);
            for index in 0..width {
                tuple.push(field_from_ref(row.get_ref(index)?).map_err(|message| {
                    rusqlite::Error::FromSqlConversionFailure(
                        index,
                        rusqlite::types::Type::Blob,
                        message.into(),
                    )
                })?);
            }
            tuples.push(tuple);
        }

        Ok(tuples)
    }
}

impl QueryExecutor for SqliteExecutor {
    fn query(&self, sql: &str, params: &[FieldValue]) -> DbResult<Vec<Vec<FieldValue>>> {
        let bound = params.iter().map(field_to_value).collect::<Vec<_>>();
        let tuples = retry_with_policy(&self.policy, "db_query", || self.run(sql, &bound))
            .map_err(|err| match err {
                DbError::Sqlite(rusqlite::Error::FromSqlConversionFailure(index, _, message)) => {
                    DbError::InvalidData(format!("column {index}: {message}"))
                }
                other => other,
            })?;
        debug!("event=db_query module=db status=ok rows={}", tuples.len());
        Ok(tuples)
    }

    fn reconnect(&mut self) -> DbResult<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        match open_db(path, &self.policy) {
            Ok(conn) => {
                self.conn = conn;
                Ok(())
            }
            Err(err) => {
                error!("event=db_reconnect module=db status=error error={}", err);
                Err(err)
            }
        }
    }
}

fn field_from_ref(value: ValueRef<'_>) -> Result<FieldValue, String> {
    match value {
        ValueRef::Null => Ok(FieldValue::Null),
        ValueRef::Integer(value) => Ok(FieldValue::Integer(value)),
        ValueRef::Real(value) => Ok(FieldValue::Real(value)),
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map(FieldValue::Text)
            .map_err(|err| format!("text is not valid UTF-8: {err}")),
        ValueRef::Blob(_) => Err("blob columns are not supported".to_string()),
    }
}

fn field_to_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(value) => Value::Integer(*value),
        FieldValue::Real(value) => Value::Real(*value),
        FieldValue::Text(value) => Value::Text(value.clone()),
        FieldValue::Date(value) => Value::Text(value.format("%Y-%m-%d").to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, QueryExecutor, SqliteExecutor};
    use crate::db::{open_db_in_memory, DbError, RetryPolicy};
    use chrono::NaiveDate;

    fn executor_with(sql: &str) -> SqliteExecutor {
        let conn = open_db_in_memory().expect("in-memory db should open");
        conn.execute_batch(sql).expect("fixture sql should run");
        SqliteExecutor::from_connection(conn, RetryPolicy::no_retry())
    }

    #[test]
    fn query_returns_fixed_arity_tuples_in_row_order() {
        let executor = executor_with(
            "CREATE TABLE t (id INTEGER, name TEXT, score REAL, note TEXT);
             INSERT INTO t VALUES (2, 'b', 1.5, NULL), (1, 'a', 0.5, 'x');",
        );

        let rows = executor
            .query("SELECT id, name, score, note FROM t ORDER BY id DESC", &[])
            .expect("select should succeed");

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![
                FieldValue::Integer(2),
                FieldValue::Text("b".to_string()),
                FieldValue::Real(1.5),
                FieldValue::Null,
            ]
        );
        assert_eq!(rows[1][3], FieldValue::Text("x".to_string()));
    }

    #[test]
    fn query_binds_positional_params() {
        let executor = executor_with(
            "CREATE TABLE t (id INTEGER, name TEXT);
             INSERT INTO t VALUES (1, 'a'), (2, 'b');",
        );

        let rows = executor
            .query("SELECT name FROM t WHERE id = ?1", &[FieldValue::Integer(2)])
            .expect("parameterized select should succeed");
        assert_eq!(rows, vec![vec![FieldValue::Text("b".to_string())]]);
    }

    #[test]
    fn blob_columns_are_invalid_data() {
        let executor = executor_with("CREATE TABLE t (b BLOB); INSERT INTO t VALUES (x'00ff');");

        let err = executor
            .query("SELECT b FROM t", &[])
            .expect_err("blob cells should be rejected");
        assert!(matches!(err, DbError::InvalidData(_)));
    }

    #[test]
    fn sql_errors_surface_unchanged() {
        let executor = executor_with("CREATE TABLE t (id INTEGER);");

        let err = executor
            .query("SELECT missing FROM t", &[])
            .expect_err("unknown column should fail");
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[test]
    fn display_renders_plain_values() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
        assert_eq!(FieldValue::Date(date).to_string(), "2020-01-01");
        assert_eq!(FieldValue::Null.to_string(), "");
        assert_eq!(FieldValue::from(7).to_string(), "7");
    }
}
