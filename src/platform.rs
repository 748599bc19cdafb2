//! Privilege and invoking-user identity checks.
//!
//! The installer runs under `sudo`, but several operations (pip installs,
//! ownership fixes, the shell-rc patch) must act on behalf of the invoking
//! non-root user. [`Invoker`] captures that identity once at startup. All
//! queries go through the [`Executor`] so tests never touch a real privilege
//! boundary.
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::exec::Executor;

/// Usernames that are refused outright.
const DENYLIST: &[&str] = &["rene"];

/// The non-root user on whose behalf the installer acts.
#[derive(Debug, Clone)]
pub struct Invoker {
    /// Login name of the invoking user (from `SUDO_USER`, or `id -un`).
    pub user: String,
    /// The invoking user's home directory.
    pub home: PathBuf,
}

impl Invoker {
    /// Create an invoker with explicit values (for tests and fixtures).
    #[must_use]
    pub fn new(user: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            home: home.into(),
        }
    }

    /// Detect the invoking user behind `sudo`.
    ///
    /// Prefers `SUDO_USER`, falling back to `id -un`. The home directory is
    /// resolved from the passwd database via `getent`, falling back to
    /// `/home/<user>` (`/root` for root).
    #[must_use]
    pub fn detect(executor: &dyn Executor) -> Self {
        let user = std::env::var("SUDO_USER")
            .ok()
            .filter(|u| !u.is_empty())
            .or_else(|| {
                executor
                    .run("id", &["-un"])
                    .ok()
                    .filter(|r| r.success)
                    .map(|r| r.stdout.trim().to_string())
            })
            .unwrap_or_else(|| "root".to_string());

        let home = passwd_home(executor, &user).unwrap_or_else(|| {
            if user == "root" {
                PathBuf::from("/root")
            } else {
                PathBuf::from("/home").join(&user)
            }
        });

        Self { user, home }
    }

    /// Whether this user matches the built-in denylist.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        DENYLIST.iter().any(|denied| self.user.contains(denied))
    }

    /// `user:group` ownership spec for `chown`.
    #[must_use]
    pub fn ownership_spec(&self) -> String {
        format!("{0}:{0}", self.user)
    }
}

/// Look up a user's home directory in the passwd database.
fn passwd_home(executor: &dyn Executor, user: &str) -> Option<PathBuf> {
    let result = executor.run("getent", &["passwd", user]).ok()?;
    if !result.success {
        return None;
    }
    // passwd(5): name:passwd:uid:gid:gecos:home:shell
    let home = result.stdout.trim().split(':').nth(5)?;
    if home.is_empty() {
        None
    } else {
        Some(PathBuf::from(home))
    }
}

/// Query the effective user id by running `id -u` through the executor.
///
/// # Errors
///
/// Returns an error if the command cannot be spawned, exits non-zero, or
/// produces unparseable output.
pub fn effective_uid(executor: &dyn Executor) -> Result<u32> {
    let result = executor
        .run("id", &["-u"])
        .context("failed to query effective uid")?;
    anyhow::ensure!(result.success, "id -u exited non-zero");
    result
        .stdout
        .trim()
        .parse()
        .context("unexpected output from id -u")
}
