//! Binary entry point: parse arguments, initialise logging, run the installer.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use kitstrap::cli::Cli;
use kitstrap::commands;
use kitstrap::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let args = Cli::parse();
    init_subscriber(args.verbose);
    let log = Arc::new(Logger::new());

    commands::install::run(&args, &log)
}
