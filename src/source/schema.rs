//! Table layout of the upstream `autopkgtest.db`.
//!
//! The tool never writes to the real dataset. [`create`] exists so tests and
//! local tooling can build a database with the same shape.

use anyhow::Result;
use rusqlite::Connection;

/// Tables the query depends on.
pub const REQUIRED_TABLES: [&str; 2] = ["test", "result"];

/// Create the `test` and `result` tables if they do not exist.
pub fn create(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS test (
            id INTEGER PRIMARY KEY,
            release CHAR[20],
            arch CHAR[20],
            package CHAR[120]
        );

        CREATE TABLE IF NOT EXISTS result (
            test_id INTEGER,
            run_id CHAR[30],
            version VARCHAR[200],
            triggers TEXT,
            duration INTEGER,
            exitcode INTEGER,
            requester TEXT,
            env TEXT,
            uuid TEXT,
            PRIMARY KEY(test_id, run_id),
            FOREIGN KEY(test_id) REFERENCES test(id)
        );

        CREATE INDEX IF NOT EXISTS test_package_idx ON test(package);",
    )?;
    Ok(())
}

/// Insert a `test` row and return its id.
pub fn insert_test(conn: &Connection, release: &str, arch: &str, package: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO test (release, arch, package) VALUES (?1, ?2, ?3)",
        rusqlite::params![release, arch, package],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a `result` row for an existing test id.
pub fn insert_result(
    conn: &Connection,
    test_id: i64,
    run_id: &str,
    exit_code: i64,
    triggers: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO result (test_id, run_id, version, triggers, duration, exitcode)
         VALUES (?1, ?2, 'unknown', ?3, 0, ?4)",
        rusqlite::params![test_id, run_id, triggers, exit_code],
    )?;
    Ok(())
}
