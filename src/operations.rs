//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that tasks can be unit-tested
//! without touching the real filesystem or a privilege boundary. Production
//! code uses [`SystemFileSystemOps`]; tests use `MockFileSystemOps`.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem primitives used by tasks.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Returns `true` if `path` has any execute permission bit set.
    fn is_executable(&self, path: &Path) -> bool;

    /// Grant execute permission (`u+x,g+x,o+x`) on `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read or the permission
    /// change fails.
    fn set_executable(&self, path: &Path) -> io::Result<()>;

    /// Create a symbolic link at `link` pointing at `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created.
    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()>;

    /// Read the target of the symbolic link at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be read.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Returns `true` if anything (file, directory, or symlink, including a
    /// dangling one) occupies `path`.
    fn entry_exists(&self, path: &Path) -> bool;

    /// Read the whole file at `path` into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write `contents` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Remove the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_executable(&self, path: &Path) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            std::fs::metadata(path).is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
        }
        #[cfg(not(unix))]
        {
            path.exists()
        }
    }

    fn set_executable(&self, path: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(perms.mode() | 0o111);
            std::fs::set_permissions(path, perms)
        }
        #[cfg(not(unix))]
        {
            let _ = path;
            Ok(())
        }
    }

    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(source, link)
        }
        #[cfg(not(unix))]
        {
            let _ = (source, link);
            Err(io::Error::other("symlinks are only supported on unix"))
        }
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn entry_exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure existing paths, file contents, and executables with the
/// builder-style methods; inspect the mutations recorded by tasks afterwards.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    existing: Vec<PathBuf>,
    files: std::collections::HashMap<PathBuf, String>,
    executables: std::sync::Mutex<std::collections::HashSet<PathBuf>>,
    symlinks: std::sync::Mutex<std::collections::HashMap<PathBuf, PathBuf>>,
    written: std::sync::Mutex<std::collections::HashMap<PathBuf, String>>,
    removed: std::sync::Mutex<std::collections::HashSet<PathBuf>>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as existing without making it a file.
    #[must_use]
    pub fn with_existing(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing.push(path.into());
        self
    }

    /// Register a regular file at `path` with the given contents.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: &str) -> Self {
        let p = path.into();
        self.existing.push(p.clone());
        self.files.insert(p, contents.to_string());
        self
    }

    /// Mark `path` as already executable.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_executable(self, path: impl Into<PathBuf>) -> Self {
        self.executables
            .lock()
            .expect("mock executables poisoned")
            .insert(path.into());
        self
    }

    /// Register `path` as a symbolic link pointing to `target`.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_symlink(self, path: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        self.symlinks
            .lock()
            .expect("mock symlinks poisoned")
            .insert(path.into(), target.into());
        self
    }

    /// Symlinks created through the mock, as `(link, source)` pairs.
    #[allow(clippy::expect_used)]
    pub fn created_symlinks(&self) -> Vec<(PathBuf, PathBuf)> {
        self.symlinks
            .lock()
            .expect("mock symlinks poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Paths that had execute permission granted through the mock.
    #[allow(clippy::expect_used)]
    pub fn chmodded(&self) -> Vec<PathBuf> {
        self.executables
            .lock()
            .expect("mock executables poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Contents written to `path` through the mock, if any.
    #[allow(clippy::expect_used)]
    pub fn written_contents(&self, path: &Path) -> Option<String> {
        self.written
            .lock()
            .expect("mock written poisoned")
            .get(path)
            .cloned()
    }

    /// Returns `true` if `path` was removed through the mock.
    #[allow(clippy::expect_used)]
    pub fn was_removed(&self, path: &Path) -> bool {
        self.removed
            .lock()
            .expect("mock removed poisoned")
            .contains(path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        !self.was_removed(path)
            && (self.existing.iter().any(|p| p == path)
                || self
                    .symlinks
                    .lock()
                    .expect("mock symlinks poisoned")
                    .contains_key(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_executable(&self, path: &Path) -> bool {
        self.executables
            .lock()
            .expect("mock executables poisoned")
            .contains(path)
    }

    fn set_executable(&self, path: &Path) -> io::Result<()> {
        self.executables
            .lock()
            .expect("mock executables poisoned")
            .insert(path.to_path_buf());
        Ok(())
    }

    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()> {
        self.symlinks
            .lock()
            .expect("mock symlinks poisoned")
            .insert(link.to_path_buf(), source.to_path_buf());
        Ok(())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.symlinks
            .lock()
            .expect("mock symlinks poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))
    }

    fn entry_exists(&self, path: &Path) -> bool {
        self.exists(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.written
            .lock()
            .expect("mock written poisoned")
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.removed
            .lock()
            .expect("mock removed poisoned")
            .insert(path.to_path_buf());
        Ok(())
    }
}
