//! Archive extraction for downloaded artefacts.
//!
//! Extracts `.zip` and `.tar.gz`/`.tgz` archives into a destination
//! directory with path traversal protection, and classifies staged file
//! names so the download task can dispatch on them.

use std::path::{Component, Path};

/// How a staged download should be handled, judged by its file name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.zip` archive.
    Zip,
    /// `.tar.gz` or `.tgz` archive.
    TarGz,
    /// `.sh` script to mark executable and run in place.
    Script,
}

impl ArchiveKind {
    /// Classify a staged file name, or `None` when no handler applies.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".sh") {
            Some(Self::Script)
        } else {
            None
        }
    }
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed zip archive.
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },
}

/// Extract a `.zip` archive into `dest_dir`, returning the extracted entry
/// names.
///
/// # Errors
///
/// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
/// escape the destination directory, and I/O or format errors otherwise.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<Vec<String>, ExtractionError> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(entry_path) = entry.enclosed_name() else {
            return Err(ExtractionError::PathTraversal {
                path: entry.name().to_string(),
            });
        };

        let dest_path = dest_dir.join(&entry_path);
        if entry.is_dir() {
            std::fs::create_dir_all(&dest_path)?;
        } else {
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = std::fs::File::create(&dest_path)?;
            std::io::copy(&mut entry, &mut out)?;
            if let Some(name) = entry_path.file_name() {
                extracted.push(name.to_string_lossy().into_owned());
            }
        }
    }

    Ok(extracted)
}

/// Extract a `.tar.gz`/`.tgz` archive into `dest_dir`, returning the
/// extracted entry names.
///
/// # Errors
///
/// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
/// escape the destination directory, and I/O errors otherwise.
pub fn extract_tar_gz(
    archive_path: &Path,
    dest_dir: &Path,
) -> Result<Vec<String>, ExtractionError> {
    let file = std::fs::File::open(archive_path)?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);
    let mut extracted = Vec::new();

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_path = entry.path()?.into_owned();

        validate_entry_path(&entry_path)?;

        let dest_path = dest_dir.join(&entry_path);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        entry.unpack(&dest_path)?;

        if entry.header().entry_type().is_file()
            && let Some(name) = entry_path.file_name()
        {
            extracted.push(name.to_string_lossy().into_owned());
        }
    }

    Ok(extracted)
}

/// Validate that a tar entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    if path.is_absolute() {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(ExtractionError::PathTraversal {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::path::PathBuf;

    #[test]
    fn classify_zip() {
        assert_eq!(ArchiveKind::from_name("tool.zip"), Some(ArchiveKind::Zip));
    }

    #[test]
    fn classify_tarballs() {
        assert_eq!(
            ArchiveKind::from_name("tool.tar.gz"),
            Some(ArchiveKind::TarGz)
        );
        assert_eq!(ArchiveKind::from_name("tool.tgz"), Some(ArchiveKind::TarGz));
    }

    #[test]
    fn classify_script() {
        assert_eq!(
            ArchiveKind::from_name("installer.sh"),
            Some(ArchiveKind::Script)
        );
    }

    #[test]
    fn classify_unknown_is_none() {
        assert_eq!(ArchiveKind::from_name("tool.deb"), None);
        assert_eq!(ArchiveKind::from_name("tool.gz"), None);
    }

    #[test]
    fn extract_real_zip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("test.zip");
        let dest_dir = temp_dir.path().join("out");

        let file = std::fs::File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("sub/hello.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hello world").unwrap();
        writer.finish().unwrap();

        let files = extract_zip(&archive_path, &dest_dir).unwrap();
        assert_eq!(files, vec!["hello.txt"]);
        assert_eq!(
            std::fs::read_to_string(dest_dir.join("sub/hello.txt")).unwrap(),
            "hello world"
        );
    }

    #[test]
    fn extract_real_tar_gz() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("test.tar.gz");
        let dest_dir = temp_dir.path().join("out");

        let source = temp_dir.path().join("hello.txt");
        std::fs::write(&source, b"from the tarball").unwrap();

        // Explicitly finish both the tar builder and the gzip encoder so the
        // stream is complete.
        let output = std::fs::File::create(&archive_path).unwrap();
        let encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_path_with_name(&source, "dir/hello.txt")
            .unwrap();
        let encoder = builder.into_inner().unwrap();
        encoder.finish().unwrap();

        let files = extract_tar_gz(&archive_path, &dest_dir).unwrap();
        assert_eq!(files, vec!["hello.txt"]);
        assert_eq!(
            std::fs::read_to_string(dest_dir.join("dir/hello.txt")).unwrap(),
            "from the tarball"
        );
    }

    #[test]
    fn rejects_parent_dir_traversal() {
        let result = validate_entry_path(&PathBuf::from("foo/../../escape.txt"));
        assert!(matches!(
            result,
            Err(ExtractionError::PathTraversal { .. })
        ));
    }

    #[test]
    fn rejects_absolute_path() {
        let result = validate_entry_path(&PathBuf::from("/etc/passwd"));
        assert!(matches!(
            result,
            Err(ExtractionError::PathTraversal { .. })
        ));
    }

    #[test]
    fn accepts_normal_paths() {
        assert!(validate_entry_path(&PathBuf::from("bin/tool")).is_ok());
    }

    #[test]
    fn missing_archive_is_io_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = extract_zip(&temp_dir.path().join("missing.zip"), temp_dir.path());
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }
}
