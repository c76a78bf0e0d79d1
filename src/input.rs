//! Package selection: a local package list or one team from the team mapping.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read package list {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("team mapping is not a JSON object of package lists: {0}")]
    BadMapping(#[from] serde_json::Error),

    #[error("team '{team}' not found in team mapping ({known} teams listed)")]
    UnknownTeam { team: String, known: usize },
}

/// `team -> [package]` as published by the archive team.
pub type TeamMapping = BTreeMap<String, Vec<String>>;

/// Parse a package list: one name per line, blank lines and `#` comments
/// ignored, first occurrence wins.
pub fn parse_package_list(text: &str) -> Vec<String> {
    dedup(
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string),
    )
}

/// Read a package list from disk.
pub fn read_package_list(path: &Path) -> Result<Vec<String>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_package_list(&text))
}

pub fn parse_team_mapping(json: &str) -> Result<TeamMapping, InputError> {
    Ok(serde_json::from_str(json)?)
}

/// Packages owned by `team`, in mapping order.
pub fn team_packages(mapping: &TeamMapping, team: &str) -> Result<Vec<String>, InputError> {
    let packages = mapping.get(team).ok_or_else(|| InputError::UnknownTeam {
        team: team.to_string(),
        known: mapping.len(),
    })?;
    Ok(dedup(
        packages
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string),
    ))
}

fn dedup(packages: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    packages.filter(|p| seen.insert(p.clone())).collect()
}
