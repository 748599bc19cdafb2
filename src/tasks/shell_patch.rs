//! Patch the invoking user's shell startup file.
//!
//! Reads `~/.zshrc`, applies the line operations from `shellrc.toml`, and
//! writes the whole buffer back. One of the three fixed steps: progress
//! advances once whether the patch applied or the step was skipped.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};
use crate::resources::line_patch::apply_line_operations;

/// Apply the configured line operations to `~/.zshrc`.
#[derive(Debug)]
pub struct PatchShellRc;

impl Task for PatchShellRc {
    fn name(&self) -> &str {
        "Patch shell rc"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let rc_path = ctx.invoker.home.join(".zshrc");

        if ctx.config.shell_ops.is_empty() {
            ctx.progress.advance(&*ctx.log);
            return Ok(TaskResult::Skipped("no operations listed".to_string()));
        }

        if ctx.simulate {
            ctx.log.simulate(&format!(
                "would apply {} line operations to {}",
                ctx.config.shell_ops.len(),
                rc_path.display()
            ));
            ctx.progress.advance(&*ctx.log);
            return Ok(TaskResult::Simulated);
        }

        let Ok(contents) = ctx.fs_ops.read_to_string(&rc_path) else {
            ctx.log.warn(&format!(
                "{} not found for user {}, skipping patch",
                rc_path.display(),
                ctx.invoker.user
            ));
            ctx.progress.advance(&*ctx.log);
            return Ok(TaskResult::Skipped("shell rc missing".to_string()));
        };

        let mut lines: Vec<String> = contents.lines().map(String::from).collect();
        let stats = apply_line_operations(&mut lines, &ctx.config.shell_ops, &*ctx.log);

        let mut patched = lines.join("\n");
        if !patched.is_empty() {
            patched.push('\n');
        }
        ctx.fs_ops
            .write(&rc_path, &patched)
            .with_context(|| format!("write patched file: {}", rc_path.display()))?;

        ctx.log.info(&format!(
            "{} replaced, {} inserted, {} out of range",
            stats.replaced, stats.inserted, stats.out_of_range
        ));
        ctx.progress.advance(&*ctx.log);
        Ok(TaskResult::Ok)
    }
}
