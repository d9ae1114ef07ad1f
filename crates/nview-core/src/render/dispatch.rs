use super::blocks;
use crate::Result;
use crate::types::{Block, BlockKind};

/// Spaces per indentation level.
pub const INDENT_WIDTH: usize = 2;

/// Render one block at `indent` levels, ignoring its children.
///
/// Unsupported kinds render as an empty string. A payload that does not match
/// its kind yields [`Error::Render`](crate::Error::Render).
pub fn dispatch(block: &Block, indent: usize) -> Result<String> {
    let pad = " ".repeat(indent * INDENT_WIDTH);
    let pad = pad.as_str();

    match &block.kind {
        BlockKind::Heading(level) => blocks::heading(block, pad, *level),
        BlockKind::Paragraph => blocks::prefixed(block, pad, ""),
        BlockKind::BulletedListItem => blocks::prefixed(block, pad, "- "),
        BlockKind::NumberedListItem => blocks::prefixed(block, pad, "1. "),
        BlockKind::Quote => blocks::prefixed(block, pad, "> "),
        BlockKind::Toggle => blocks::prefixed(block, pad, "▶ "),
        BlockKind::ToDo => blocks::to_do(block, pad),
        BlockKind::Code => blocks::code(block, pad),
        BlockKind::Equation => blocks::equation(block, pad),
        BlockKind::Divider => Ok(blocks::divider(pad)),
        BlockKind::Callout => blocks::callout(block, pad),
        BlockKind::TableRow => blocks::table_row(block, pad),
        BlockKind::ChildPage => blocks::child_page(block, pad),
        BlockKind::Unsupported(_) => Ok(String::new()),
    }
}
