//! Atelier CLI entry point.

use anyhow::Result;
use clap::Parser;

use atelier::cli::{commands, handle_error, Cli, Commands};
use atelier::infrastructure::config::ConfigLoader;
use atelier::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging)?;

    match cli.command {
        Commands::Catalog(args) => commands::catalog::execute(args, &config, cli.json).await,
        Commands::Classify(args) => commands::classify::execute(args, &config, cli.json).await,
        Commands::Replay(args) => commands::replay::execute(args, &config, cli.json).await,
    }
}
