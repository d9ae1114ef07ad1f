//! nview CLI - search and render Notion pages from the terminal
//!
//! This is the library behind the `nview` binary. Command implementations
//! live in [`commands`]; [`run`] wires argument parsing, logging and client
//! construction together.
use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
pub mod error;
mod utils;

use crate::utils::{build_client, initialize_logging};
use cli::{Cli, Commands};

/// Execute the nview CLI with the currently configured environment.
///
/// Loads `.env` from the working directory first, so `NOTION_TOKEN` may live there.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, or if the command fails.
pub async fn run() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    initialize_logging(&cli)?;
    if let Ok(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }

    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let client = build_client(&cli)?;
    match cli.command {
        Commands::Search { query, format } => commands::search(&client, &query, format).await,
        Commands::View { block_id } => commands::view(client, &block_id, cli.debug).await,
    }
}
