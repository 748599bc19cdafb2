//! The shell-rc patch manifest (`shellrc.toml`).
//!
//! Declares line-level edits to apply to the invoking user's `.zshrc`:
//!
//! ```toml
//! [[operation]]
//! kind = "replace"
//! line = 100
//! text = "PROMPT='...'"
//!
//! [[operation]]
//! kind = "insert"
//! line = 245
//! text = "alias ls='ls -la'"
//! ```
//!
//! Line numbers are 1-based and evaluated in ascending order against the
//! buffer as mutated by earlier operations in the same pass.
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

/// Edit kind for a [`LineOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Overwrite the line at the target index.
    Replace,
    /// Insert a new line before the target index.
    Insert,
}

/// A single line-level edit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineOp {
    /// What to do at the target line.
    pub kind: OpKind,
    /// Target line number, 1-based.
    pub line: usize,
    /// Replacement or inserted text (without trailing newline).
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct ShellRcFile {
    #[serde(default, rename = "operation")]
    operations: Vec<LineOp>,
}

/// Load the shell-rc patch manifest.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML
/// (callers treat either case as an empty patch list and warn).
pub fn load(path: &Path) -> Result<Vec<LineOp>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read shell-rc manifest: {}", path.display()))?;
    let file: ShellRcFile = toml::from_str(&contents)
        .with_context(|| format!("parse shell-rc manifest: {}", path.display()))?;
    Ok(file.operations)
}
