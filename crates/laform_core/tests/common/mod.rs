#![allow(dead_code)]

use laform_core::db::open_db_in_memory;
use laform_core::{RetryPolicy, ResumeData, SqliteExecutor};
use rusqlite::Connection;

pub const SCHEMA: &str = include_str!("../fixtures/schema.sql");
pub const SAMPLE: &str = include_str!("../fixtures/sample.sql");

/// In-memory database with the résumé schema and the sample rows loaded.
pub fn sample_connection() -> Connection {
    let conn = open_db_in_memory().expect("in-memory database should open");
    conn.execute_batch(SCHEMA).expect("schema should load");
    conn.execute_batch(SAMPLE).expect("sample rows should load");
    conn
}

pub fn executor(conn: Connection) -> SqliteExecutor {
    SqliteExecutor::from_connection(conn, RetryPolicy::no_retry())
}

pub fn sample_data() -> ResumeData<SqliteExecutor> {
    ResumeData::new(executor(sample_connection()))
}

/// Sample data after running `edit` against the seeded connection.
pub fn edited_data(edit: &str) -> ResumeData<SqliteExecutor> {
    let conn = sample_connection();
    conn.execute_batch(edit).expect("edit should apply");
    ResumeData::new(executor(conn))
}
