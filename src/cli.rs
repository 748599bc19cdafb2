//! Command-line argument surface.
use clap::Parser;

/// Top-level CLI entry point for the provisioning engine.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "kitstrap",
    about = "Post-install provisioning engine for security-tooling workstations",
    version
)]
pub struct Cli {
    /// Preview the run without executing any external command
    #[arg(long)]
    pub simulation: bool,

    /// Echo command output and debug messages on the console
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip the interactive confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Override the manifest root directory (default: current directory)
    #[arg(long)]
    pub root: Option<std::path::PathBuf>,
}
