//! Public test log locations.
//!
//! Logs live at `<base>/autopkgtest-<release>/<release>/<arch>/<prefix>/<package>/<run_id>/log.gz`
//! where `<prefix>` is the Debian pool bucket of the source package.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogUrlError {
    #[error("cannot build a log URL for an empty package name")]
    EmptyPackage,
}

/// Pool bucket for a package: `libf` for `libfoo`, `b` for `bar`.
pub fn pool_prefix(package: &str) -> Result<&str, LogUrlError> {
    let take = if package.starts_with("lib") { 4 } else { 1 };
    let end = package
        .char_indices()
        .nth(take)
        .map_or(package.len(), |(idx, _)| idx);
    match &package[..end] {
        "" => Err(LogUrlError::EmptyPackage),
        prefix => Ok(prefix),
    }
}

/// Build the log URL for one run.
pub fn log_url(
    base: &str,
    release: &str,
    package: &str,
    arch: &str,
    run_id: &str,
) -> Result<String, LogUrlError> {
    let prefix = pool_prefix(package)?;
    Ok(format!(
        "{}/autopkgtest-{release}/{release}/{arch}/{prefix}/{package}/{run_id}/log.gz",
        base.trim_end_matches('/'),
    ))
}
