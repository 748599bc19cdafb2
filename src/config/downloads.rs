//! The structured download manifest (`downloads.toml`).
//!
//! Each entry pairs a source URL with the directory name (under the install
//! root) that the downloaded artefact should be extracted into:
//!
//! ```toml
//! [[download]]
//! url = "https://example.com/releases/tool.zip"
//! dest = "tool"
//! ```
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

/// One download manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownloadItem {
    /// Source URL to fetch.
    pub url: String,
    /// Destination directory name under the install root.
    pub dest: String,
}

#[derive(Debug, Deserialize)]
struct DownloadsFile {
    #[serde(default, rename = "download")]
    downloads: Vec<DownloadItem>,
}

/// Load the download manifest.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML
/// (callers treat either case as an empty manifest and warn).
pub fn load(path: &Path) -> Result<Vec<DownloadItem>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read download manifest: {}", path.display()))?;
    let file: DownloadsFile = toml::from_str(&contents)
        .with_context(|| format!("parse download manifest: {}", path.display()))?;
    Ok(file.downloads)
}
