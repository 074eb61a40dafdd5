//! docview CLI - read, search and navigate markdown documentation
//!
//! This is the main entry point for the docview command-line interface.
//! Command implementations live in separate modules under `commands`.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};
use utils::logging::initialize_logging;
use utils::settings::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    execute_command(&cli).await
}

async fn execute_command(cli: &Cli) -> Result<()> {
    let format = cli.format;
    match &cli.command {
        Commands::Toc { file, tree } => commands::show_toc(file, *tree, format),
        Commands::Highlight { file, term, tree } => {
            commands::highlight_file(file, term, *tree, format)
        },
        Commands::Render(args) => commands::render_file(args, format),
        Commands::Spy(args) => commands::spy_file(args, &load_config(cli)?, format),
        Commands::Search(args) => commands::search(args, &load_config(cli)?, format).await,
        Commands::Get(args) => commands::get_document(args, &load_config(cli)?, format).await,
        Commands::Stats => commands::show_stats(&load_config(cli)?, format).await,
        Commands::Health => commands::check_health(&load_config(cli)?, format).await,
    }
}
