//! Idempotent resource primitives (check + apply pattern).
pub mod line_patch;
pub mod shortcut;

use anyhow::Result;

/// State of a resource (shortcut link, patched file, …).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist yet.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Something else occupies the resource location.
    Occupied {
        /// Description of what is currently there.
        current: String,
    },
    /// Resource cannot be applied (e.g., the link source does not exist).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped, with a reason.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Unified interface for resources that can be checked and applied.
///
/// The shortcut linker never overwrites: `apply` on anything but a
/// [`ResourceState::Missing`] resource is a skip, which is what makes a
/// second identical run a no-op.
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined due to I/O
    /// failures.
    fn current_state(&self) -> Result<ResourceState>;

    /// Apply the resource change.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O
    /// failures or permission issues.
    fn apply(&self) -> Result<ResourceChange>;
}
