use anyhow::Result;
use clap::Parser;
use cuestore::cli::{Cli, commands};
use cuestore::logging::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    commands::execute(&cli.command, &cli.overrides(), cli.json)?;
    Ok(())
}
