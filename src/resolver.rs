//! Reference resolution: pick the latest run on each side of a cutoff.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::run_id::{self, RunIdError};
use crate::source::{ResultSource, SourceError, TestRun};

/// Why a single (package, arch) pair could not be resolved.
#[derive(Debug, Error)]
pub enum PairError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("{package}/{arch}: {source}")]
    RunId {
        package: String,
        arch: String,
        #[source]
        source: RunIdError,
    },

    #[error("{package}/{arch}: {source}")]
    LogUrl {
        package: String,
        arch: String,
        #[source]
        source: crate::log_url::LogUrlError,
    },
}

/// The latest run strictly before the reference instant and the latest run
/// at or after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPair {
    pub before: TestRun,
    pub after: TestRun,
}

/// Query `source` for one pair and resolve it against `reference`.
///
/// `Ok(None)` means "no data": no runs at all, or nothing on one side of the
/// cutoff.
pub fn resolve_pair<S: ResultSource + ?Sized>(
    source: &S,
    package: &str,
    arch: &str,
    release: &str,
    reference: NaiveDateTime,
) -> Result<Option<RunPair>, PairError> {
    let runs = source.runs(package, arch, release)?;
    split_latest(runs, reference).map_err(|source| PairError::RunId {
        package: package.to_string(),
        arch: arch.to_string(),
        source,
    })
}

/// Partition `runs` around `reference` and keep the newest of each bucket.
///
/// A run stamped exactly at `reference` counts as "after". Runs sharing a
/// timestamp are ordered by run id, greatest wins. Any unparseable run id
/// fails the whole pair.
pub fn split_latest(
    runs: Vec<TestRun>,
    reference: NaiveDateTime,
) -> Result<Option<RunPair>, RunIdError> {
    let mut before: Option<(NaiveDateTime, TestRun)> = None;
    let mut after: Option<(NaiveDateTime, TestRun)> = None;

    for run in runs {
        let stamp = run_id::parse_timestamp(&run.run_id)?;
        let slot = if stamp < reference {
            &mut before
        } else {
            &mut after
        };
        let newer = match slot.as_ref() {
            Some((best, held)) => (stamp, run.run_id.as_str()) > (*best, held.run_id.as_str()),
            None => true,
        };
        if newer {
            *slot = Some((stamp, run));
        }
    }

    Ok(match (before, after) {
        (Some((_, before)), Some((_, after))) => Some(RunPair { before, after }),
        _ => None,
    })
}
