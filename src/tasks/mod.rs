//! Named units of work, run strictly sequentially in a fixed order.
//!
//! There is no branching on prior-step success or failure: every task runs
//! to completion (or is recorded as failed) before the next starts, and
//! per-item failures inside a task are logged and skipped.
pub mod build_step;
mod context;
pub mod downloads;
pub mod installers;
pub mod shell_patch;
pub mod shortcuts;

pub use context::Context;

use anyhow::Result;

use crate::logging::TaskStatus;

/// Outcome of one task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task skipped itself, with a reason.
    Skipped(String),
    /// Task ran in simulation mode; no changes were applied.
    Simulated,
}

/// A named, executable task.
pub trait Task {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that abort the whole task (e.g.
    /// the patched file cannot be written back). Per-item failures are
    /// logged inside the task and do not surface here.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The complete install sequence, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(installers::InstallAptPackages),
        Box::new(installers::CloneGitRepositories),
        Box::new(installers::InstallPipPackages),
        Box::new(installers::InstallSnapPackages),
        Box::new(downloads::FetchDownloads::new()),
        Box::new(build_step::BuildKiterunner),
        Box::new(shell_patch::PatchShellRc),
        Box::new(shortcuts::LinkShortcuts),
    ]
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::Simulated) => {
            ctx.log.record_task(task.name(), TaskStatus::Simulated, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
