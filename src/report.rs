//! Report building and JSON output.
//!
//! Each category report maps `package -> arch -> {"before", "after"}` where
//! both sides describe one test run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::Classification;
use crate::exit_code;
use crate::log_url::{self, LogUrlError};
use crate::resolver::RunPair;
use crate::source::TestRun;

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub result: String,
    pub exit_code: i64,
    pub test_run_id: String,
    pub triggers: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_log: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairRecord {
    pub before: RunRecord,
    pub after: RunRecord,
}

/// `package -> arch -> record`.
pub type CategoryReport = BTreeMap<String, BTreeMap<String, PairRecord>>;

/// Where test logs are published; `None` in [`build_pair`] omits `test_log`.
#[derive(Debug, Clone, Copy)]
pub struct LogLocation<'a> {
    pub base_url: &'a str,
    pub release: &'a str,
}

fn build_run(run: &TestRun, logs: Option<LogLocation<'_>>) -> Result<RunRecord, LogUrlError> {
    let test_log = logs
        .map(|loc| log_url::log_url(loc.base_url, loc.release, &run.package, &run.arch, &run.run_id))
        .transpose()?;
    Ok(RunRecord {
        result: exit_code::describe(run.exit_code),
        exit_code: run.exit_code,
        test_run_id: run.run_id.clone(),
        triggers: run.triggers.clone(),
        test_log,
    })
}

/// Assemble the report record for a resolved pair.
pub fn build_pair(pair: &RunPair, logs: Option<LogLocation<'_>>) -> Result<PairRecord, LogUrlError> {
    Ok(PairRecord {
        before: build_run(&pair.before, logs)?,
        after: build_run(&pair.after, logs)?,
    })
}

/// The three category reports of one invocation.
#[derive(Debug, Default)]
pub struct Reports {
    no_news: CategoryReport,
    good_news: CategoryReport,
    bad_news: CategoryReport,
}

impl Reports {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a record under `class`. Other architectures of the same package
    /// are kept.
    pub fn insert(&mut self, class: Classification, package: &str, arch: &str, record: PairRecord) {
        self.get_mut(class)
            .entry(package.to_string())
            .or_default()
            .insert(arch.to_string(), record);
    }

    pub fn get(&self, class: Classification) -> &CategoryReport {
        match class {
            Classification::NoNews => &self.no_news,
            Classification::GoodNews => &self.good_news,
            Classification::BadNews => &self.bad_news,
        }
    }

    fn get_mut(&mut self, class: Classification) -> &mut CategoryReport {
        match class {
            Classification::NoNews => &mut self.no_news,
            Classification::GoodNews => &mut self.good_news,
            Classification::BadNews => &mut self.bad_news,
        }
    }

    /// Number of (package, arch) pairs filed under `class`.
    pub fn count(&self, class: Classification) -> usize {
        self.get(class).values().map(BTreeMap::len).sum()
    }

    /// Write all three reports into `dir`, returning the written paths.
    pub fn write_all(
        &self,
        dir: &Path,
        date: NaiveDate,
        team: Option<&str>,
    ) -> Result<Vec<(Classification, PathBuf)>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;

        let mut written = Vec::with_capacity(Classification::ALL.len());
        for class in Classification::ALL {
            let path = dir.join(file_name(class, date, team));
            write_json(&path, self.get(class))?;
            tracing::info!(
                category = %class,
                pairs = self.count(class),
                path = %path.display(),
                "report written"
            );
            written.push((class, path));
        }
        Ok(written)
    }
}

/// `bad_news_2024-03-01.json`, or `bad_news_<team>_2024-03-01.json` in team mode.
pub fn file_name(class: Classification, date: NaiveDate, team: Option<&str>) -> String {
    let date = date.format("%Y-%m-%d");
    match team {
        Some(team) => format!("{class}_{team}_{date}.json"),
        None => format!("{class}_{date}.json"),
    }
}

/// Serialize `value` as JSON indented by four spaces.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = to_json_string(value)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: &str, exit_code: i64, package: &str, arch: &str) -> TestRun {
        TestRun {
            run_id: id.to_string(),
            exit_code,
            package: package.to_string(),
            arch: arch.to_string(),
            triggers: format!("{package}/1.0"),
        }
    }

    fn pair(package: &str, arch: &str, before: i64, after: i64) -> RunPair {
        RunPair {
            before: run("20240201_000000_a@", before, package, arch),
            after: run("20240401_000000_b@", after, package, arch),
        }
    }

    const LOGS: LogLocation<'static> = LogLocation {
        base_url: "https://autopkgtest.ubuntu.com/results",
        release: "noble",
    };

    #[test]
    fn test_build_pair_fills_both_sides() {
        let record = build_pair(&pair("libfoo", "amd64", 0, 4), Some(LOGS)).unwrap();
        assert_eq!(record.before.result, "all tests passed");
        assert_eq!(record.after.result, "at least one test failed");
        assert_eq!(record.after.exit_code, 4);
        assert_eq!(record.after.test_run_id, "20240401_000000_b@");
        assert_eq!(record.after.triggers, "libfoo/1.0");
        assert_eq!(
            record.before.test_log.as_deref(),
            Some("https://autopkgtest.ubuntu.com/results/autopkgtest-noble/noble/amd64/libf/libfoo/20240201_000000_a@/log.gz")
        );
    }

    #[test]
    fn test_test_log_omitted_without_location() {
        let record = build_pair(&pair("foo", "amd64", 0, 0), None).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["before"].get("test_log").is_none());
        assert_eq!(json["before"]["test_run_id"], "20240201_000000_a@");
    }

    #[test]
    fn test_insert_keeps_every_arch() {
        let mut reports = Reports::new();
        for arch in ["amd64", "arm64", "s390x"] {
            let record = build_pair(&pair("foo", arch, 0, 4), None).unwrap();
            reports.insert(Classification::BadNews, "foo", arch, record);
        }
        let record = build_pair(&pair("bar", "amd64", 4, 0), None).unwrap();
        reports.insert(Classification::GoodNews, "bar", "amd64", record);

        assert_eq!(reports.count(Classification::BadNews), 3);
        assert_eq!(reports.get(Classification::BadNews)["foo"].len(), 3);
        assert_eq!(reports.count(Classification::GoodNews), 1);
        assert_eq!(reports.count(Classification::NoNews), 0);
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(file_name(Classification::BadNews, date, None), "bad_news_2024-03-01.json");
        assert_eq!(
            file_name(Classification::NoNews, date, Some("foundations")),
            "no_news_foundations_2024-03-01.json"
        );
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        assert_eq!(to_json_string(&map).unwrap(), "{\n    \"a\": 1\n}");
        assert_eq!(to_json_string(&CategoryReport::new()).unwrap(), "{}");
    }

    #[test]
    fn test_write_all_creates_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut reports = Reports::new();
        let record = build_pair(&pair("foo", "amd64", 0, 4), None).unwrap();
        reports.insert(Classification::BadNews, "foo", "amd64", record);

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let out = dir.path().join("out");
        let written = reports.write_all(&out, date, None).unwrap();
        assert_eq!(written.len(), 3);

        let bad: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("bad_news_2024-03-01.json")).unwrap())
                .unwrap();
        assert_eq!(bad["foo"]["amd64"]["after"]["exit_code"], 4);

        let good = std::fs::read_to_string(out.join("good_news_2024-03-01.json")).unwrap();
        assert_eq!(good, "{}");
    }
}
