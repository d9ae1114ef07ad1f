//! Shared helpers for the CLI commands.
//!
//! - [`block_id`]: page id and URL normalization
//! - [`client`]: configuration layering and client construction
//! - [`logging`]: tracing subscriber and color setup

pub mod block_id;
pub mod client;
pub mod logging;

pub use block_id::normalize_block_id;
pub use client::build_client;
pub use logging::initialize_logging;
