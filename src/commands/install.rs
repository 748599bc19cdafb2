//! The install command: preconditions, confirmation, and the task sequence.
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::platform::{self, Invoker};
use crate::tasks::{self, Context};

/// Run the install command.
///
/// The flow is strictly linear: precondition checks, manifest loading, an
/// interactive confirmation, then every task in order with no branching on
/// prior-task failure.
///
/// # Errors
///
/// Returns an error (nonzero exit) when not running as root or when the
/// invoking user is denylisted. A declined confirmation is a clean exit.
pub fn run(args: &Cli, log: &Arc<Logger>) -> Result<()> {
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);

    let version = option_env!("KITSTRAP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("kitstrap {version}"));

    let uid = platform::effective_uid(&*executor)?;
    anyhow::ensure!(
        uid == 0,
        "kitstrap must be run as root; use sudo (kitstrap --help works without)"
    );

    let invoker = Invoker::detect(&*executor);
    anyhow::ensure!(
        !invoker.is_denied(),
        "user '{}' is not permitted to run the installer",
        invoker.user
    );

    log.stage("Loading manifests");
    let root = resolve_root(args)?;
    let config = Config::load(&root, &**log);
    log.info(&format!(
        "loaded {} apt, {} git, {} pip, {} snap entries, {} downloads, {} shell edits",
        config.apt_packages.len(),
        config.git_repos.len(),
        config.pip_packages.len(),
        config.snap_packages.len(),
        config.downloads.len(),
        config.shell_ops.len(),
    ));
    log.info(&format!("planned steps: {}", config.total_steps()));

    if !args.yes && !confirm("Proceed with installation? [Y/n] ")? {
        log.info("exiting at user request");
        return Ok(());
    }

    if args.simulation {
        log.info("simulation mode: no command will actually be executed");
    }

    let ctx = Context::new(
        config,
        Arc::clone(log) as Arc<dyn Log>,
        args.simulation,
        invoker,
        executor,
    );

    for task in tasks::all_install_tasks() {
        tasks::execute(task.as_ref(), &ctx);
    }

    log.print_summary();
    log.info("installation finished; open a new terminal for shell changes");
    Ok(())
}

/// Resolve the manifest root from CLI arguments, defaulting to the current
/// directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
fn resolve_root(args: &Cli) -> Result<PathBuf> {
    if let Some(root) = &args.root {
        return Ok(root.clone());
    }
    Ok(std::env::current_dir()?)
}

/// Prompt for a yes/no answer on stdin.
///
/// # Errors
///
/// Returns an error if stdin or stdout is unavailable.
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(parse_confirmation(&input))
}

/// Interpret a confirmation answer: empty, `y`, and `yes` (any case) accept;
/// everything else declines.
fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "" | "y" | "yes")
}
