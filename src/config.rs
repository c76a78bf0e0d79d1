//! TOML configuration for autopkgtest-diff.
//!
//! Every key is optional. The file is looked up via the
//! `AUTOPKGTEST_DIFF_CONFIG` environment variable, then
//! `./autopkgtest-diff.toml`, and compiled-in defaults apply otherwise.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "AUTOPKGTEST_DIFF_CONFIG";

/// Config file picked up from the working directory.
pub const LOCAL_CONFIG: &str = "autopkgtest-diff.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DiffConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Resolve the config file the way the binary does.
    ///
    /// An explicitly named file that cannot be loaded is an error; a missing
    /// local file just means defaults.
    pub fn discover() -> Result<Self> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&env_path));
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.is_file() {
            return Self::load(local);
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where the results database comes from and what is queried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Local cache of the results database; downloaded only if absent.
    pub database_path: PathBuf,
    pub database_url: String,
    /// Release channel every query is pinned to.
    pub release: String,
    pub arches: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("autopkgtest.db"),
            database_url: "https://autopkgtest.ubuntu.com/static/autopkgtest.db".to_string(),
            release: "noble".to_string(),
            arches: ["amd64", "arm64", "ppc64el", "s390x"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Package list used when no team is given.
    pub packages_file: PathBuf,
    /// JSON `team -> [package]` mapping used in team mode.
    pub teams_url: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            packages_file: PathBuf::from("packages"),
            teams_url: "https://ubuntu-archive-team.ubuntu.com/package-team-mapping.json"
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// What to do when one (package, arch) pair cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Stop at the first failing pair; nothing is written.
    #[default]
    Abort,
    /// Log the pair, leave it out of every report and carry on.
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub log_base_url: String,
    /// Emit `test_log` URLs in run records. Unset means team mode only.
    pub include_log_url: Option<bool>,
    pub on_error: OnError,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            log_base_url: "https://autopkgtest.ubuntu.com/results".to_string(),
            include_log_url: None,
            on_error: OnError::Abort,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
