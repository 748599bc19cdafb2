//! The download manifest processor.
//!
//! Fetches each manifest item into the staging root, then dispatches on the
//! staged file name: archives are extracted into their destination directory
//! and deleted, shell scripts are marked executable and run in place.
//! Partial failure of one item never stops the manifest.
use anyhow::{Context as _, Result};
use std::path::Path;

use super::{Context, Task, TaskResult};
use crate::archive::{self, ArchiveKind};
use crate::download::{Downloader, HttpDownloader, file_name_from_url};

/// Process the ordered download manifest.
pub struct FetchDownloads {
    downloader: Box<dyn Downloader>,
}

impl std::fmt::Debug for FetchDownloads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchDownloads")
            .field("downloader", &"<dyn Downloader>")
            .finish()
    }
}

impl Default for FetchDownloads {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchDownloads {
    /// Create the task with the production HTTP downloader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            downloader: Box::new(HttpDownloader),
        }
    }

    /// Create the task with an injected downloader (for tests).
    #[must_use]
    pub fn with_downloader(downloader: Box<dyn Downloader>) -> Self {
        Self { downloader }
    }

    /// Dispatch one successfully staged file on its name suffix.
    fn handle_staged(
        ctx: &Context,
        file_name: &str,
        staged: &Path,
        dest: &Path,
    ) -> Result<()> {
        match ArchiveKind::from_name(file_name) {
            Some(ArchiveKind::Zip) => {
                let files = archive::extract_zip(staged, dest)?;
                ctx.log.info(&format!(
                    "extracted {} entries to {}",
                    files.len(),
                    dest.display()
                ));
                ctx.fs_ops
                    .remove_file(staged)
                    .with_context(|| format!("remove staged archive: {}", staged.display()))?;
                ctx.chown_to_invoker(dest);
            }
            Some(ArchiveKind::TarGz) => {
                let files = archive::extract_tar_gz(staged, dest)?;
                ctx.log.info(&format!(
                    "extracted {} entries to {}",
                    files.len(),
                    dest.display()
                ));
                ctx.fs_ops
                    .remove_file(staged)
                    .with_context(|| format!("remove staged archive: {}", staged.display()))?;
                ctx.chown_to_invoker(dest);
            }
            Some(ArchiveKind::Script) => {
                ctx.fs_ops
                    .set_executable(staged)
                    .with_context(|| format!("mark executable: {}", staged.display()))?;
                let staged_str = staged.to_string_lossy();
                ctx.run_command(&staged_str, &[]);
                ctx.log.info(&format!("executed {file_name}"));
                ctx.chown_to_invoker(dest);
            }
            None => {
                ctx.log
                    .debug(&format!("no handler for {file_name}, leaving in place"));
            }
        }
        Ok(())
    }
}

impl Task for FetchDownloads {
    fn name(&self) -> &str {
        "Process download manifest"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.config.downloads.is_empty() {
            return Ok(TaskResult::Skipped("no downloads listed".to_string()));
        }

        for item in &ctx.config.downloads {
            let file_name = file_name_from_url(&item.url);
            let staged = ctx.config.install_root.join(&file_name);
            let dest = ctx.config.install_root.join(&item.dest);

            if ctx.simulate {
                ctx.log.simulate(&format!(
                    "would download {} to {}",
                    item.url,
                    staged.display()
                ));
                ctx.progress.advance(&*ctx.log);
                continue;
            }

            ctx.log.info(&format!("downloading {file_name}"));
            match self.downloader.fetch(&item.url, &staged) {
                Ok(()) => {
                    ctx.log
                        .debug(&format!("downloaded {file_name} to {}", staged.display()));
                    if let Err(e) = Self::handle_staged(ctx, &file_name, &staged, &dest) {
                        ctx.log.error(&format!("error handling {file_name}: {e:#}"));
                    }
                }
                Err(e) => {
                    ctx.log.warn(&format!("download failed for {}: {e}", item.url));
                }
            }
            ctx.progress.advance(&*ctx.log);
        }

        if ctx.simulate {
            Ok(TaskResult::Simulated)
        } else {
            Ok(TaskResult::Ok)
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::DownloadItem;
    use crate::download::{DownloadError, MockDownloader};
    use crate::exec::Executor;
    use crate::tasks::test_helpers::{RecordingExecutor, empty_config, make_context};
    use std::io::Write as _;
    use std::sync::Arc;

    fn config_with(dir: &Path, items: Vec<DownloadItem>) -> crate::config::Config {
        let mut config = empty_config();
        config.install_root = dir.to_path_buf();
        config.downloads = items;
        config
    }

    fn item(url: &str, dest: &str) -> DownloadItem {
        DownloadItem {
            url: url.to_string(),
            dest: dest.to_string(),
        }
    }

    /// Write a real single-entry zip at `path`.
    fn write_zip(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("bin/tool", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"binary contents").unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn zip_item_extracts_to_dest_and_removes_archive() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with(temp.path(), vec![item("https://x/tool.zip", "tool")]);
        let executor = Arc::new(RecordingExecutor::new());
        let ctx = make_context(config, false, Arc::clone(&executor) as Arc<dyn Executor>);

        let mut downloader = MockDownloader::new();
        downloader.expect_fetch().returning(|_, dest| {
            write_zip(dest);
            Ok(())
        });

        let task = FetchDownloads::with_downloader(Box::new(downloader));
        assert_eq!(task.run(&ctx).unwrap(), TaskResult::Ok);

        assert!(
            temp.path().join("tool/bin/tool").is_file(),
            "files must land under <root>/<dest>/"
        );
        assert!(
            !temp.path().join("tool.zip").exists(),
            "staged archive must be deleted after extraction"
        );
        // Ownership of the extracted tree is handed back to the invoker.
        let calls = executor.recorded_calls();
        assert!(calls.iter().any(|(prog, _)| prog == "chown"));
        assert_eq!(ctx.progress.completed(), 1);
    }

    #[test]
    fn failed_download_logs_and_continues() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with(
            temp.path(),
            vec![
                item("https://x/broken.zip", "broken"),
                item("https://x/tool.zip", "tool"),
            ],
        );
        let ctx = make_context(config, false, Arc::new(RecordingExecutor::new()));

        let mut downloader = MockDownloader::new();
        downloader.expect_fetch().returning(|url, dest| {
            if url.contains("broken") {
                Err(DownloadError::NotFound {
                    url: url.to_string(),
                })
            } else {
                write_zip(dest);
                Ok(())
            }
        });

        let task = FetchDownloads::with_downloader(Box::new(downloader));
        assert_eq!(task.run(&ctx).unwrap(), TaskResult::Ok);

        assert!(temp.path().join("tool/bin/tool").is_file());
        assert_eq!(
            ctx.progress.completed(),
            2,
            "both items advance progress, the failed one included"
        );
    }

    #[test]
    fn script_item_is_made_executable_and_run() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with(temp.path(), vec![item("https://x/setup.sh", "unused")]);
        let executor = Arc::new(RecordingExecutor::new());
        let ctx = make_context(config, false, Arc::clone(&executor) as Arc<dyn Executor>);

        let mut downloader = MockDownloader::new();
        downloader.expect_fetch().returning(|_, dest| {
            std::fs::write(dest, "#!/bin/sh\nexit 0\n")?;
            Ok(())
        });

        let task = FetchDownloads::with_downloader(Box::new(downloader));
        task.run(&ctx).unwrap();

        let staged = temp.path().join("setup.sh");
        assert!(ctx.fs_ops.is_executable(&staged), "script must be chmod +x");
        let calls = executor.recorded_calls();
        assert_eq!(calls[0].0, staged.to_string_lossy());
        assert!(calls[0].1.is_empty());
        // Ownership is handed back afterwards, like any other item.
        assert_eq!(calls[1].0, "getent");
        assert_eq!(calls[2].0, "chown");
    }

    #[test]
    fn unknown_suffix_is_left_in_place() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with(temp.path(), vec![item("https://x/tool.deb", "tool")]);
        let executor = Arc::new(RecordingExecutor::new());
        let ctx = make_context(config, false, Arc::clone(&executor) as Arc<dyn Executor>);

        let mut downloader = MockDownloader::new();
        downloader.expect_fetch().returning(|_, dest| {
            std::fs::write(dest, "deb contents")?;
            Ok(())
        });

        let task = FetchDownloads::with_downloader(Box::new(downloader));
        task.run(&ctx).unwrap();

        assert!(temp.path().join("tool.deb").is_file(), "file stays staged");
        assert!(executor.recorded_calls().is_empty());
        assert_eq!(ctx.progress.completed(), 1);
    }

    #[test]
    fn corrupt_archive_is_caught_and_loop_continues() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with(
            temp.path(),
            vec![
                item("https://x/corrupt.zip", "corrupt"),
                item("https://x/good.zip", "good"),
            ],
        );
        let ctx = make_context(config, false, Arc::new(RecordingExecutor::new()));

        let mut downloader = MockDownloader::new();
        downloader.expect_fetch().returning(|url, dest| {
            if url.contains("corrupt") {
                std::fs::write(dest, "this is not a zip")?;
            } else {
                write_zip(dest);
            }
            Ok(())
        });

        let task = FetchDownloads::with_downloader(Box::new(downloader));
        assert_eq!(task.run(&ctx).unwrap(), TaskResult::Ok);

        assert!(temp.path().join("good/bin/tool").is_file());
        assert_eq!(ctx.progress.completed(), 2);
    }

    #[test]
    fn simulation_fetches_nothing_but_advances() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with(
            temp.path(),
            vec![item("https://x/a.zip", "a"), item("https://x/b.tgz", "b")],
        );
        let ctx = make_context(config, true, Arc::new(RecordingExecutor::new()));

        let mut downloader = MockDownloader::new();
        downloader.expect_fetch().never();

        let task = FetchDownloads::with_downloader(Box::new(downloader));
        assert_eq!(task.run(&ctx).unwrap(), TaskResult::Simulated);
        assert_eq!(ctx.progress.completed(), 2);
    }

    #[test]
    fn empty_manifest_is_skipped() {
        let ctx = make_context(empty_config(), false, Arc::new(RecordingExecutor::new()));
        let task = FetchDownloads::new();
        assert!(matches!(task.run(&ctx).unwrap(), TaskResult::Skipped(_)));
    }
}
