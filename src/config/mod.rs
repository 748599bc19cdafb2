//! Manifest loading and validation.
//!
//! All inputs live under `<root>/manifests/`: four line-oriented package
//! manifests (`apt.list`, `git.list`, `pip.list`, `snap.list`) and two
//! structured TOML manifests (`downloads.toml`, `shellrc.toml`). A missing
//! or malformed manifest never fails the load — the affected step is simply
//! skipped later, so the warning here is the only trace.
pub mod downloads;
pub mod manifests;
pub mod shellrc;

use std::path::{Path, PathBuf};

pub use downloads::DownloadItem;
pub use shellrc::{LineOp, OpKind};

use crate::logging::Log;
use crate::progress::FIXED_STEPS;

/// Fully loaded run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Manifest root directory.
    pub root: PathBuf,
    /// Staging/install root for clones, downloads, and extractions.
    pub install_root: PathBuf,
    /// Directory on the command search path where shortcuts are linked.
    pub bin_dir: PathBuf,
    /// Packages to install with apt.
    pub apt_packages: Vec<String>,
    /// Repository URLs to clone into the install root.
    pub git_repos: Vec<String>,
    /// Packages to install with pip as the invoking user.
    pub pip_packages: Vec<String>,
    /// Packages to install with snap.
    pub snap_packages: Vec<String>,
    /// Ordered download manifest.
    pub downloads: Vec<DownloadItem>,
    /// Line operations for the shell-rc patch.
    pub shell_ops: Vec<LineOp>,
}

impl Config {
    /// Load all manifests under `<root>/manifests/`.
    ///
    /// Missing or malformed manifests are logged and treated as empty.
    #[must_use]
    pub fn load(root: &Path, log: &dyn Log) -> Self {
        let dir = root.join("manifests");

        let line_manifest = |name: &str| -> Vec<String> {
            let path = dir.join(name);
            match manifests::load_lines(&path) {
                Ok(lines) => lines,
                Err(e) => {
                    log.warn(&format!("manifest {} unavailable: {e}", path.display()));
                    Vec::new()
                }
            }
        };

        let apt_packages = line_manifest("apt.list");
        let git_repos = line_manifest("git.list");
        let pip_packages = line_manifest("pip.list");
        let snap_packages = line_manifest("snap.list");

        let downloads = downloads::load(&dir.join("downloads.toml")).unwrap_or_else(|e| {
            log.warn(&format!("download manifest unavailable: {e:#}"));
            Vec::new()
        });

        let shell_ops = shellrc::load(&dir.join("shellrc.toml")).unwrap_or_else(|e| {
            log.warn(&format!("shell-rc manifest unavailable: {e:#}"));
            Vec::new()
        });

        Self {
            root: root.to_path_buf(),
            install_root: PathBuf::from("/opt"),
            bin_dir: PathBuf::from("/usr/bin"),
            apt_packages,
            git_repos,
            pip_packages,
            snap_packages,
            downloads,
            shell_ops,
        }
    }

    /// Total planned step count, computed before any step executes.
    ///
    /// One step per manifest line, one per download item, plus
    /// [`FIXED_STEPS`] for the build, shell-patch, and shortcut steps.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn total_steps(&self) -> u32 {
        let counted = self.apt_packages.len()
            + self.git_repos.len()
            + self.pip_packages.len()
            + self.snap_packages.len()
            + self.downloads.len();
        counted as u32 + FIXED_STEPS
    }
}
