//! Deterministic text rendering of an assembled block tree.
//!
//! Rendering is synchronous and starts only once the whole tree is fetched.
//! [`dispatch`] turns one block into text by matching on its
//! [`BlockKind`](crate::BlockKind); [`render_tree`] walks the tree depth-first
//! and writes each non-empty rendering on its own line.
//!
//! ```rust
//! use nview_core::{Block, BlockKind, render::render_to_string};
//! use serde_json::json;
//!
//! let blocks = vec![Block::new(
//!     "a1",
//!     BlockKind::BulletedListItem,
//!     json!({"rich_text": [{"plain_text": "item"}]}),
//! )];
//! assert_eq!(render_to_string(&blocks), "- item\n");
//! ```

pub mod blocks;
mod dispatch;
mod tree;

pub use dispatch::{INDENT_WIDTH, dispatch};
pub use tree::{RenderStats, render_to_string, render_tree};
