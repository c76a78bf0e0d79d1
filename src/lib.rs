//! autopkgtest-diff -- compare autopkgtest results across a reference date.
//!
//! For every selected package and architecture the latest run before the
//! reference date is compared with the latest run at or after it, and the
//! pair is filed as no news, good news (fixed) or bad news (regressed).

pub mod classify;
pub mod config;
pub mod exit_code;
pub mod fetch;
pub mod input;
pub mod log_url;
pub mod report;
pub mod resolver;
pub mod run_id;
pub mod source;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

use crate::classify::Classification;
use crate::config::{DiffConfig, OnError};
use crate::report::{LogLocation, Reports};
use crate::resolver::PairError;
use crate::source::{ResultSource, SqliteSource};

/// Parameters for one batch of comparisons.
#[derive(Debug, Clone)]
pub struct DiffOptions<'a> {
    pub reference: NaiveDateTime,
    pub release: &'a str,
    pub arches: &'a [String],
    pub logs: Option<LogLocation<'a>>,
    pub on_error: OnError,
}

/// A pair left out of the reports because it could not be resolved.
#[derive(Debug)]
pub struct FailedPair {
    pub package: String,
    pub arch: String,
    pub error: PairError,
}

/// Result of a batch: the three reports plus what was left out of them.
#[derive(Debug, Default)]
pub struct DiffOutcome {
    pub reports: Reports,
    /// Pairs without a run on both sides of the reference date.
    pub no_data: Vec<(String, String)>,
    /// Pairs that failed under [`OnError::Skip`].
    pub failed: Vec<FailedPair>,
}

/// Compare every (package, arch) combination, sequentially.
pub fn diff_packages<S: ResultSource + ?Sized>(
    source: &S,
    packages: &[String],
    opts: &DiffOptions<'_>,
) -> Result<DiffOutcome> {
    let mut outcome = DiffOutcome::default();

    for package in packages {
        for arch in opts.arches {
            match diff_pair(source, package, arch, opts) {
                Ok(Some((class, record))) => {
                    tracing::debug!(%package, %arch, category = %class, "classified");
                    outcome.reports.insert(class, package, arch, record);
                }
                Ok(None) => {
                    tracing::debug!(%package, %arch, "no data on both sides of reference date");
                    outcome.no_data.push((package.clone(), arch.clone()));
                }
                Err(error) => match opts.on_error {
                    OnError::Abort => {
                        tracing::error!(%package, %arch, %error, "pair failed, aborting");
                        return Err(error).with_context(|| format!("comparing {package}/{arch}"));
                    }
                    OnError::Skip => {
                        tracing::warn!(%package, %arch, %error, "pair failed, skipping");
                        outcome.failed.push(FailedPair {
                            package: package.clone(),
                            arch: arch.clone(),
                            error,
                        });
                    }
                },
            }
        }
    }

    Ok(outcome)
}

fn diff_pair<S: ResultSource + ?Sized>(
    source: &S,
    package: &str,
    arch: &str,
    opts: &DiffOptions<'_>,
) -> Result<Option<(Classification, report::PairRecord)>, PairError> {
    let Some(pair) = resolver::resolve_pair(source, package, arch, opts.release, opts.reference)?
    else {
        return Ok(None);
    };
    let class = classify::classify(pair.before.exit_code, pair.after.exit_code);
    let record = report::build_pair(&pair, opts.logs).map_err(|source| PairError::LogUrl {
        package: package.to_string(),
        arch: arch.to_string(),
        source,
    })?;
    Ok(Some((class, record)))
}

/// What a full run produced.
#[derive(Debug)]
pub struct Summary {
    /// Category, written path and number of pairs in it.
    pub written: Vec<(Classification, PathBuf, usize)>,
    pub no_data: usize,
    pub failed: usize,
}

/// The results database could not be obtained or opened.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("cannot fetch results database: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("cannot open results database: {0}")]
    Open(#[from] source::SourceError),
}

/// Run one invocation end to end: make sure the database is cached, select
/// packages, compare and write the three reports.
///
/// `team` switches from the local package list to the team mapping and adds
/// the team name to report file names.
pub async fn run(config: &DiffConfig, date: NaiveDate, team: Option<&str>) -> Result<Summary> {
    let reference = date.and_time(chrono::NaiveTime::MIN);

    fetch::ensure_database(&config.source.database_path, &config.source.database_url)
        .await
        .map_err(DatabaseError::from)?;

    let packages = match team {
        Some(team) => {
            let mapping = fetch::fetch_team_mapping(&config.input.teams_url).await?;
            input::team_packages(&mapping, team)?
        }
        None => input::read_package_list(&config.input.packages_file)?,
    };
    tracing::info!(packages = packages.len(), ?team, %date, "selected packages");

    let source = SqliteSource::open(&config.source.database_path).map_err(DatabaseError::from)?;

    let include_log_url = config.output.include_log_url.unwrap_or(team.is_some());
    let logs = include_log_url.then(|| LogLocation {
        base_url: &config.output.log_base_url,
        release: &config.source.release,
    });
    let opts = DiffOptions {
        reference,
        release: &config.source.release,
        arches: &config.source.arches,
        logs,
        on_error: config.output.on_error,
    };
    let outcome = diff_packages(&source, &packages, &opts)?;

    let written = outcome
        .reports
        .write_all(&config.output.directory, date, team)?
        .into_iter()
        .map(|(class, path)| (class, path, outcome.reports.count(class)))
        .collect();

    tracing::info!(
        no_news = outcome.reports.count(Classification::NoNews),
        good_news = outcome.reports.count(Classification::GoodNews),
        bad_news = outcome.reports.count(Classification::BadNews),
        no_data = outcome.no_data.len(),
        failed = outcome.failed.len(),
        "comparison finished"
    );

    Ok(Summary {
        written,
        no_data: outcome.no_data.len(),
        failed: outcome.failed.len(),
    })
}
