mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{compact, fetch};
use tracing::Level;

/// Install the stderr log subscriber; each `-v` raises the level one step from INFO.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Fetch(args) => fetch::run(&cli, args),
        Commands::Compact(args) => compact::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
