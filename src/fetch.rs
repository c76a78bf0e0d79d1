//! Remote inputs: the results database and the team mapping.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::input::{self, InputError, TeamMapping};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Input(#[from] InputError),
}

fn client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Make sure the results database exists locally, downloading it from `url`
/// when absent. An existing file is reused as-is.
///
/// Returns `true` if a download happened.
pub async fn ensure_database(path: &Path, url: &str) -> Result<bool, FetchError> {
    if path.is_file() {
        tracing::debug!(path = %path.display(), "using cached results database");
        return Ok(false);
    }

    tracing::info!(%url, path = %path.display(), "downloading results database");
    let http_err = |source: reqwest::Error| FetchError::Http {
        url: url.to_string(),
        source,
    };

    let mut response = client()
        .map_err(http_err)?
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(http_err)?;

    let partial = partial_path(path);
    let bytes = match write_body(&mut response, &partial, url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&partial).await {
                tracing::debug!(path = %partial.display(), error = %rm, "could not remove partial download");
            }
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, path)
        .await
        .map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })?;
    tracing::info!(path = %path.display(), bytes, "results database downloaded");
    Ok(true)
}

/// Stream the response body into `partial`, returning the byte count.
async fn write_body(
    response: &mut reqwest::Response,
    partial: &Path,
    url: &str,
) -> Result<u64, FetchError> {
    let io_err = |source: std::io::Error| FetchError::Io {
        path: partial.display().to_string(),
        source,
    };
    let mut file = tokio::fs::File::create(partial).await.map_err(io_err)?;
    let mut bytes = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })? {
        file.write_all(&chunk).await.map_err(io_err)?;
        bytes += chunk.len() as u64;
    }
    file.flush().await.map_err(io_err)?;
    Ok(bytes)
}

/// Download partials go next to the target so the final rename stays on one
/// filesystem.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Fetch and parse the `team -> [package]` mapping.
pub async fn fetch_team_mapping(url: &str) -> Result<TeamMapping, FetchError> {
    let http_err = |source: reqwest::Error| FetchError::Http {
        url: url.to_string(),
        source,
    };
    tracing::info!(%url, "fetching team mapping");
    let body = client()
        .map_err(http_err)?
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(http_err)?
        .text()
        .await
        .map_err(http_err)?;
    Ok(input::parse_team_mapping(&body)?)
}
