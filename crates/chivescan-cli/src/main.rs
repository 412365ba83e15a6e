use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("chivescan_cli=info".parse()?)
                .add_directive("chivescan_core=info".parse()?),
        )
        .init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Scan(scan_args) => commands::scan::run(scan_args),
        cli::Command::Catalog { action } => commands::catalog::run(action),
    }
}
