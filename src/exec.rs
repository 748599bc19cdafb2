//! Command execution abstraction.
//!
//! Every external tool (apt-get, git, pip, snap, chown, make, …) is invoked
//! through the [`Executor`] trait so tasks can be unit-tested without touching
//! a real system. A non-zero exit status is *not* an `Err`: per-item failures
//! are reported in [`ExecResult`] and handled by the caller, which logs and
//! continues. `Err` is reserved for the process failing to spawn at all.
use anyhow::{Context as _, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Raw exit code, if the process terminated normally.
    pub code: Option<i32>,
}

impl ExecResult {
    /// Combined stdout and stderr, trimmed, for logging.
    #[must_use]
    pub fn combined_output(&self) -> String {
        let out = self.stdout.trim();
        let err = self.stderr.trim();
        if err.is_empty() {
            out.to_string()
        } else if out.is_empty() {
            err.to_string()
        } else {
            format!("{out}\n{err}")
        }
    }
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over external command execution.
pub trait Executor: Send + Sync {
    /// Run a command and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned. A non-zero
    /// exit is reported through [`ExecResult::success`].
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command in a specific working directory.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] that spawns real processes.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("failed to execute: {program} in {}", dir.display()))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
