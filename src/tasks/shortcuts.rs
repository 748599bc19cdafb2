//! Shortcut linking for tools installed in non-standard locations.
//!
//! Two sources feed the link table: a fixed list of well-known executables
//! under the install root, and pip packages whose entry-point file is
//! discovered by asking pip (as the invoking user) where the package landed.
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use super::{Context, Task, TaskResult};
use crate::resources::shortcut::ShortcutLink;
use crate::resources::{Resource as _, ResourceChange};

/// Well-known executables under the install root, with their link names.
const SHORTCUTS: &[(&str, &str)] = &[
    ("kiterunner/dist/kr", "kr"),
    ("jwt_tool/jwt_tool.py", "jwt_tool"),
];

/// Entry-point file names for pip packages that need a shortcut.
const PIP_ENTRY_POINTS: &[(&str, &str)] = &[("autorecon", "main.py")];

/// Create shortcut symlinks in the system binary directory.
#[derive(Debug)]
pub struct LinkShortcuts;

impl Task for LinkShortcuts {
    fn name(&self) -> &str {
        "Link shortcuts"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut pairs: Vec<(PathBuf, String)> = SHORTCUTS
            .iter()
            .map(|(rel, name)| (ctx.config.install_root.join(rel), (*name).to_string()))
            .collect();
        pairs.extend(discover_pip_entry_points(ctx));

        let mut linked = 0u32;
        let mut already_ok = 0u32;
        let mut skipped = 0u32;

        for (source, name) in pairs {
            let link = ctx.config.bin_dir.join(&name);

            if ctx.simulate {
                if ctx.fs_ops.exists(&source) {
                    ctx.log.simulate(&format!(
                        "would link {} -> {}",
                        link.display(),
                        source.display()
                    ));
                    linked += 1;
                } else {
                    ctx.log
                        .info(&format!("executable {} not found", source.display()));
                    skipped += 1;
                }
                continue;
            }

            // Make the target runnable before linking to it.
            if ctx.fs_ops.exists(&source) && !ctx.fs_ops.is_executable(&source) {
                match ctx.fs_ops.set_executable(&source) {
                    Ok(()) => ctx
                        .log
                        .debug(&format!("set executable permission for {}", source.display())),
                    Err(e) => ctx.log.warn(&format!(
                        "cannot set executable permission for {}: {e}",
                        source.display()
                    )),
                }
            }

            let resource = ShortcutLink::new(source, link, Arc::clone(&ctx.fs_ops));
            match resource.apply() {
                Ok(ResourceChange::Applied) => {
                    ctx.log.debug(&format!("linked {}", resource.description()));
                    linked += 1;
                }
                Ok(ResourceChange::AlreadyCorrect) => {
                    ctx.log
                        .debug(&format!("already linked: {}", resource.description()));
                    already_ok += 1;
                }
                Ok(ResourceChange::Skipped { reason }) => {
                    ctx.log.info(&reason);
                    skipped += 1;
                }
                Err(e) => {
                    ctx.log
                        .warn(&format!("{}: {e:#}", resource.description()));
                    skipped += 1;
                }
            }
        }

        ctx.log.info(&format!(
            "{linked} linked, {already_ok} already ok, {skipped} skipped"
        ));
        ctx.progress.advance(&*ctx.log);

        if ctx.simulate {
            Ok(TaskResult::Simulated)
        } else {
            Ok(TaskResult::Ok)
        }
    }
}

/// Resolve pip-installed packages to their runnable entry-point files.
///
/// Queries `pip show` as the invoking non-root user; a failed query or a
/// missing entry file drops the package from the table without failing the
/// task.
fn discover_pip_entry_points(ctx: &Context) -> Vec<(PathBuf, String)> {
    if ctx.simulate {
        ctx.log
            .simulate("would query pip for entry-point locations");
        return Vec::new();
    }

    let mut found = Vec::new();
    for (package, entry_file) in PIP_ENTRY_POINTS {
        let result = ctx
            .executor
            .run("sudo", &["-u", &ctx.invoker.user, "pip", "show", package]);
        let Ok(result) = result else {
            ctx.log
                .warn(&format!("failed to query pip for {package}"));
            continue;
        };
        if !result.success {
            ctx.log.warn(&format!(
                "failed to find the installation location for {package}"
            ));
            continue;
        }

        let Some(location) = pip_location(&result.stdout) else {
            ctx.log
                .debug(&format!("pip show output for {package} has no location"));
            continue;
        };

        let entry = location.join(package).join(entry_file);
        if ctx.fs_ops.exists(&entry) {
            if !ctx.fs_ops.is_executable(&entry)
                && let Err(e) = ctx.fs_ops.set_executable(&entry)
            {
                ctx.log
                    .warn(&format!("cannot mark {} executable: {e}", entry.display()));
            }
            found.push((entry, (*package).to_string()));
        } else {
            ctx.log
                .debug(&format!("entry point not found for {package}"));
        }
    }
    found
}

/// Extract the `Location:` path from `pip show` output.
fn pip_location(stdout: &str) -> Option<PathBuf> {
    stdout.lines().find_map(|line| {
        let rest = line.strip_prefix("Location:")?.trim();
        if rest.is_empty() {
            None
        } else {
            Some(PathBuf::from(rest))
        }
    })
}
