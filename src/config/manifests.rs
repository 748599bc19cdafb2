//! Line-oriented package manifests.
//!
//! Each of the apt/git/pip/snap manifests is a flat text file, one entry per
//! line. Every non-empty line is taken literally: no comment syntax, no
//! quoting, no sections.
use std::io;
use std::path::Path;

/// Load the non-empty lines of a manifest file.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be read (callers
/// treat a missing manifest as an empty one and warn).
pub fn load_lines(path: &Path) -> io::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
