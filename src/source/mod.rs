//! Result Source -- read-only access to autopkgtest run records.

pub mod schema;
pub mod sqlite;

pub use self::sqlite::SqliteSource;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open results database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("results database {path} is missing table '{table}'")]
    MissingTable { path: String, table: &'static str },

    #[error("query for {package}/{arch} ({release}) failed: {source}")]
    Query {
        package: String,
        arch: String,
        release: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// One autopkgtest execution as recorded in the results dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    pub run_id: String,
    pub exit_code: i64,
    pub package: String,
    pub arch: String,
    pub triggers: String,
}

/// Anything that can list the runs of one package on one architecture.
pub trait ResultSource {
    /// All runs matching `package`, `arch` and `release` exactly.
    fn runs(&self, package: &str, arch: &str, release: &str) -> Result<Vec<TestRun>, SourceError>;
}
