//! Harbor CLI Binary
//!
//! Command-line interface for the cache synchronization agent.

use anyhow::Context;
use clap::Parser;
use harbor::logging::init_logging;
use harbor::tooling::cli::{Cli, CliContext};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let context =
        CliContext::new(cli.config.clone()).context("failed to initialize agent context")?;

    let mut logging = context.config().logging.clone();
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        logging.format = format.clone();
    }
    init_logging(Some(&logging)).context("failed to initialize logging")?;

    let output = context.execute(&cli.command)?;
    println!("{output}");
    Ok(())
}
