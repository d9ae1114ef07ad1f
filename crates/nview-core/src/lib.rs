//! # nview-core
//!
//! Core functionality for nview - a concurrent fetcher and renderer for
//! hierarchical Notion documents.
//!
//! A page is a tree of blocks, and the API only lists one level of children per
//! call. This crate expands the whole tree with concurrent sibling fetches
//! under a bounded gate, then renders it deterministically to Markdown-like
//! text.
//!
//! ## Architecture
//!
//! - **Client**: [`NotionClient`] issues paginated, retried requests behind a
//!   semaphore; failures degrade to partial [`Fetched`] results
//! - **Tree**: [`TreeFetcher`] recursively expands every block that reports
//!   children, preserving server order
//! - **Rendering**: [`render`] maps each [`BlockKind`] to text and walks the
//!   assembled tree depth-first
//! - **Configuration**: [`ClientConfig`] layered from defaults, TOML and environment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nview_core::{ApiToken, ClientConfig, NotionClient, TreeFetcher, render};
//!
//! # async fn run() -> nview_core::Result<()> {
//! let token = ApiToken::from_env()?;
//! let client = NotionClient::new(&token, ClientConfig::default().with_env_overrides())?;
//!
//! let tree = TreeFetcher::new(client).fetch_tree("59833787-2cf9-4fdf-8782-e53db20768a5").await;
//! render::render_tree(&mut std::io::stdout(), &tree.items, 0)?;
//! # Ok(())
//! # }
//! ```

/// HTTP client with concurrency gate and retry policy
pub mod client;
/// Client configuration and credentials
pub mod config;
/// Error types and result aliases
pub mod error;
pub mod render;
/// Inline rich text formatting
pub mod rich_text;
/// Concurrent tree expansion
pub mod tree;
/// Core data types: blocks, pages and fetch outcomes
pub mod types;

// Re-export commonly used types
pub use client::{BlockSource, NotionClient};
pub use config::{ApiToken, ClientConfig, Config};
pub use error::{Error, Result};
pub use rich_text::{Annotations, RichTextRun};
pub use tree::{TreeFetcher, TreeStats};
pub use types::*;
