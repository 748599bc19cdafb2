//! HTTP download support for the download manifest processor.
//!
//! Provides a trait-based abstraction over file retrieval so the download
//! task can be tested without network access. No timeout is applied: a hung
//! transfer blocks the run, exactly like any other external step.

use std::path::Path;
use std::sync::OnceLock;

/// Trait for fetching a URL into a local file.
#[cfg_attr(test, mockall::automock)]
pub trait Downloader: Send + Sync {
    /// Download `url` and write the body to `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file cannot be written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested file was not found (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Default)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)
            .map_err(DownloadError::Io)?;
        Ok(())
    }
}

/// Shared `ureq` agent.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(ureq::Agent::new_with_defaults)
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Derive the staged file name from a URL: its final path segment.
#[must_use]
pub fn file_name_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}
