//! # CLI Structure and Argument Parsing
//!
//! `nview` has two subcommands:
//!
//! ```bash
//! # Find pages shared with the integration
//! nview search "meeting notes"
//! nview search --format json
//!
//! # Render a page (id with or without dashes, or a full page URL)
//! nview view 59833787-2cf9-4fdf-8782-e53db20768a5
//! nview view https://www.notion.so/acme/Roadmap-598337872cf94fdf8782e53db20768a5
//! ```
//!
//! Global options apply to both: `--verbose`, `--quiet`, `--debug`,
//! `--no-color`, `--token`, `--concurrency` and `--config`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI structure for the `nview` command.
#[derive(Parser, Clone, Debug)]
#[command(name = "nview")]
#[command(version)]
#[command(about = "nview - Search and render Notion pages from the terminal", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress warnings (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show fetch statistics and timing after rendering
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Notion integration token. Also via `NOTION_TOKEN` or a `.env` file.
    #[arg(long, global = true, env = "NOTION_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Maximum concurrent API operations (default 10)
    #[arg(long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Path to configuration file (overrides autodiscovery). Also via `NVIEW_CONFIG`.
    #[arg(long, global = true, value_name = "FILE", env = "NVIEW_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Search pages by title, most recently edited first
    Search {
        /// Search query; empty lists every accessible page
        #[arg(default_value = "")]
        query: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Fetch a page or block with all nested content and render it
    View {
        /// Page or block id, or a notion.so URL
        block_id: String,
    },
}

/// Output format for `search`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned `Page ID | Title` table
    #[default]
    Text,
    /// JSON array of pages
    Json,
}
