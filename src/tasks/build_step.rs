//! Post-download build step for the kiterunner checkout.
//!
//! Kiterunner ships as source and is built in place with its own Makefile.
//! This is one of the three fixed (non-manifest) steps, so it advances
//! progress once in every outcome.
use anyhow::Result;

use super::{Context, Task, TaskResult};

/// Run `make build` inside the kiterunner checkout under the install root.
#[derive(Debug)]
pub struct BuildKiterunner;

impl Task for BuildKiterunner {
    fn name(&self) -> &str {
        "Build kiterunner"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let dir = ctx.config.install_root.join("kiterunner");

        let result = if ctx.fs_ops.exists(&dir) {
            let built = ctx
                .run_command_in(&dir, "make", &["build"])
                .is_some_and(|r| r.success);
            if ctx.simulate {
                TaskResult::Simulated
            } else if built {
                ctx.log
                    .info(&format!("built kiterunner in {}", dir.display()));
                TaskResult::Ok
            } else {
                // Logged by run_command; the run carries on regardless.
                TaskResult::Ok
            }
        } else {
            ctx.log
                .warn(&format!("{} not found, skipping build", dir.display()));
            TaskResult::Skipped("kiterunner checkout missing".to_string())
        };

        ctx.progress.advance(&*ctx.log);
        Ok(result)
    }
}
