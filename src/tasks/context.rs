use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::exec::{ExecResult, Executor};
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::platform::Invoker;
use crate::progress::Progress;

/// Shared context for task execution.
pub struct Context {
    /// Configuration loaded from the manifest files.
    pub config: Config,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to suppress real side effects (simulation mode).
    pub simulate: bool,
    /// The non-root user on whose behalf the installer acts.
    pub invoker: Invoker,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Filesystem operation abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
    /// Explicit progress state, total computed before any step runs.
    pub progress: Progress,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("simulate", &self.simulate)
            .field("invoker", &self.invoker)
            .field("executor", &"<dyn Executor>")
            .field("fs_ops", &"<dyn FileSystemOps>")
            .field("progress", &self.progress)
            .finish()
    }
}

impl Context {
    /// Create a context for task execution.
    ///
    /// The progress total is computed here, from the loaded config, before
    /// any task runs.
    #[must_use]
    pub fn new(
        config: Config,
        log: Arc<dyn Log>,
        simulate: bool,
        invoker: Invoker,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let progress = Progress::new(config.total_steps());
        Self {
            config,
            log,
            simulate,
            invoker,
            executor,
            fs_ops: Arc::new(SystemFileSystemOps),
            progress,
        }
    }

    /// Replace the [`FileSystemOps`] implementation (for tests).
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }

    /// Run one external command, logging the command string and its combined
    /// output.
    ///
    /// In simulation mode nothing is executed; the command is logged with a
    /// "not actually executed" marker and `None` is returned. `None` is also
    /// returned when the process cannot be spawned. A command that ran but
    /// exited non-zero is returned as `Some` with `success == false`, after
    /// logging a warning — per-item failures never stop the run.
    pub fn run_command(&self, program: &str, args: &[&str]) -> Option<ExecResult> {
        self.dispatch_command(program, args, None)
    }

    /// Like [`Context::run_command`], but in a specific working directory.
    pub fn run_command_in(&self, dir: &Path, program: &str, args: &[&str]) -> Option<ExecResult> {
        self.dispatch_command(program, args, Some(dir))
    }

    fn dispatch_command(
        &self,
        program: &str,
        args: &[&str],
        dir: Option<&Path>,
    ) -> Option<ExecResult> {
        let cmd = if args.is_empty() {
            program.to_string()
        } else {
            format!("{program} {}", args.join(" "))
        };
        self.log.debug(&format!("running: {cmd}"));

        if self.simulate {
            self.log
                .simulate(&format!("{cmd}: command not actually executed"));
            return None;
        }

        let spawned = dir.map_or_else(
            || self.executor.run(program, args),
            |d| self.executor.run_in(d, program, args),
        );

        match spawned {
            Ok(result) => {
                let output = result.combined_output();
                if !output.is_empty() {
                    self.log.debug(&output);
                }
                if !result.success {
                    self.log.warn(&format!(
                        "command failed (exit {}): {cmd}",
                        result.code.unwrap_or(-1)
                    ));
                }
                Some(result)
            }
            Err(e) => {
                self.log.error(&format!("{e:#}"));
                None
            }
        }
    }

    /// Recursively change ownership of `path` to the invoking user.
    ///
    /// The user is verified against the passwd database first; an unknown
    /// user skips the change instead of failing the step.
    pub fn chown_to_invoker(&self, path: &Path) {
        if !self.simulate {
            let known = self
                .executor
                .run("getent", &["passwd", &self.invoker.user])
                .is_ok_and(|r| r.success);
            if !known {
                self.log.warn(&format!(
                    "user '{}' not found, skipping ownership change",
                    self.invoker.user
                ));
                return;
            }
        }
        let spec = self.invoker.ownership_spec();
        let path_str = path.to_string_lossy();
        self.run_command("chown", &["-R", &spec, &path_str]);
    }
}
