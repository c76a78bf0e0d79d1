//! SQLite-backed [`ResultSource`] over a local copy of `autopkgtest.db`.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use super::{schema, ResultSource, SourceError, TestRun};

const RUNS_QUERY: &str = "SELECT DISTINCT result.run_id, result.exitcode, test.package, \
     test.arch, result.triggers \
     FROM test JOIN result ON test.id = result.test_id \
     WHERE test.package = ?1 AND test.arch = ?2 AND test.release = ?3 \
     ORDER BY test.package";

/// A single read-only connection, used sequentially for every query.
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open the database file read-only and check it has the expected tables.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let label = path.display().to_string();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| SourceError::Open {
            path: label.clone(),
            source,
        })?;
        Self::from_connection(conn, label)
    }

    /// Wrap an already-open connection (e.g. an in-memory fixture).
    pub fn from_connection(conn: Connection, label: impl Into<String>) -> Result<Self, SourceError> {
        let label = label.into();
        for table in schema::REQUIRED_TABLES {
            let found: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .map_err(|source| SourceError::Open {
                    path: label.clone(),
                    source,
                })?;
            if found == 0 {
                return Err(SourceError::MissingTable { path: label, table });
            }
        }
        tracing::debug!(path = %label, "results database opened");
        Ok(Self { conn })
    }
}

impl ResultSource for SqliteSource {
    fn runs(&self, package: &str, arch: &str, release: &str) -> Result<Vec<TestRun>, SourceError> {
        let query_err = |source: rusqlite::Error| SourceError::Query {
            package: package.to_string(),
            arch: arch.to_string(),
            release: release.to_string(),
            source,
        };

        let mut stmt = self.conn.prepare_cached(RUNS_QUERY).map_err(query_err)?;
        let rows = stmt
            .query_map(rusqlite::params![package, arch, release], |row| {
                Ok(TestRun {
                    run_id: row.get(0)?,
                    exit_code: row.get(1)?,
                    package: row.get(2)?,
                    arch: row.get(3)?,
                    triggers: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                })
            })
            .map_err(query_err)?;

        let runs = rows.collect::<Result<Vec<_>, _>>().map_err(query_err)?;
        tracing::trace!(%package, %arch, %release, count = runs.len(), "fetched runs");
        Ok(runs)
    }
}
