//! The four source-list installers: apt, git, pip, snap.
//!
//! All four share the same shape: iterate the manifest lines and invoke one
//! external install command per line. A failed command is logged with its
//! combined output and iteration continues; every line advances progress
//! exactly once, success or failure.
use anyhow::Result;

use super::{Context, Task, TaskResult};

/// Map a task body's end state to the conventional result.
fn finish(ctx: &Context) -> TaskResult {
    if ctx.simulate {
        TaskResult::Simulated
    } else {
        TaskResult::Ok
    }
}

/// Install packages listed in `apt.list` with apt-get.
#[derive(Debug)]
pub struct InstallAptPackages;

impl Task for InstallAptPackages {
    fn name(&self) -> &str {
        "Install apt packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.config.apt_packages.is_empty() {
            return Ok(TaskResult::Skipped("no packages listed".to_string()));
        }

        // Refresh the index once; not counted as a step.
        ctx.run_command("apt-get", &["update", "-y"]);

        for package in &ctx.config.apt_packages {
            ctx.log.info(&format!("installing {package}"));
            ctx.run_command("apt-get", &["install", "-y", package]);
            ctx.progress.advance(&*ctx.log);
        }
        Ok(finish(ctx))
    }
}

/// Clone repositories listed in `git.list` into the install root.
#[derive(Debug)]
pub struct CloneGitRepositories;

impl Task for CloneGitRepositories {
    fn name(&self) -> &str {
        "Clone git repositories"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.config.git_repos.is_empty() {
            return Ok(TaskResult::Skipped("no repositories listed".to_string()));
        }

        for repo in &ctx.config.git_repos {
            let name = repo_name(repo);
            let target = ctx.config.install_root.join(&name);
            let target_str = target.to_string_lossy().into_owned();
            ctx.log.info(&format!("cloning {name} into {target_str}"));
            let cloned = ctx
                .run_command("git", &["clone", repo, &target_str])
                .is_some_and(|r| r.success);
            if cloned {
                ctx.chown_to_invoker(&target);
                ctx.log.info(&format!("installed {name} in {target_str}"));
            }
            ctx.progress.advance(&*ctx.log);
        }
        Ok(finish(ctx))
    }
}

/// Install packages listed in `pip.list` as the invoking user.
#[derive(Debug)]
pub struct InstallPipPackages;

impl Task for InstallPipPackages {
    fn name(&self) -> &str {
        "Install pip packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.config.pip_packages.is_empty() {
            return Ok(TaskResult::Skipped("no packages listed".to_string()));
        }

        for package in &ctx.config.pip_packages {
            ctx.log.info(&format!("installing python package {package}"));
            ctx.run_command("sudo", &["-u", &ctx.invoker.user, "pip", "install", package]);
            ctx.progress.advance(&*ctx.log);
        }
        Ok(finish(ctx))
    }
}

/// Install packages listed in `snap.list` with snap.
#[derive(Debug)]
pub struct InstallSnapPackages;

impl Task for InstallSnapPackages {
    fn name(&self) -> &str {
        "Install snap packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.config.snap_packages.is_empty() {
            return Ok(TaskResult::Skipped("no packages listed".to_string()));
        }

        for package in &ctx.config.snap_packages {
            ctx.log.info(&format!("installing {package} via snap"));
            ctx.run_command("snap", &["install", package]);
            ctx.progress.advance(&*ctx.log);
        }
        Ok(finish(ctx))
    }
}

/// Derive the clone directory name from a repository URL: the last path
/// segment with any `.git` suffix removed.
fn repo_name(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .trim_end_matches(".git")
        .to_string()
}
