//! Shortcut symlink resource.
//!
//! A shortcut links a tool installed in a non-standard location (under the
//! install root, or a discovered pip entry point) into the system binary
//! directory. Unlike a dotfile symlink, an existing entry is never replaced:
//! whatever occupies the name wins, and the second run of the linker skips
//! it.
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use std::sync::Arc;

use super::{Resource, ResourceChange, ResourceState};
use crate::operations::FileSystemOps;

/// A shortcut symlink that can be checked and applied.
#[derive(Debug, Clone)]
pub struct ShortcutLink {
    /// The executable the shortcut points at.
    pub source: PathBuf,
    /// The link path inside the system binary directory.
    pub link: PathBuf,
    fs_ops: Arc<dyn FileSystemOps>,
}

impl ShortcutLink {
    /// Create a new shortcut resource.
    #[must_use]
    pub fn new(source: PathBuf, link: PathBuf, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        Self {
            source,
            link,
            fs_ops,
        }
    }
}

impl Resource for ShortcutLink {
    fn description(&self) -> String {
        format!("{} -> {}", self.link.display(), self.source.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if !self.fs_ops.exists(&self.source) {
            return Ok(ResourceState::Invalid {
                reason: format!("executable not found: {}", self.source.display()),
            });
        }

        if let Ok(existing) = self.fs_ops.read_link(&self.link) {
            if existing == self.source {
                return Ok(ResourceState::Correct);
            }
            return Ok(ResourceState::Occupied {
                current: format!("points to {}", existing.display()),
            });
        }

        if self.fs_ops.entry_exists(&self.link) {
            return Ok(ResourceState::Occupied {
                current: "not a symlink".to_string(),
            });
        }

        Ok(ResourceState::Missing)
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Missing => {
                self.fs_ops
                    .symlink(&self.source, &self.link)
                    .with_context(|| format!("create link: {}", self.link.display()))?;
                Ok(ResourceChange::Applied)
            }
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Occupied { current } => Ok(ResourceChange::Skipped {
                reason: format!("{} already exists ({current})", self.link.display()),
            }),
            ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
        }
    }
}
