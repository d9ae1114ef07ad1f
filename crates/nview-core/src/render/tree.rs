use super::dispatch::dispatch;
use crate::types::Block;
use std::io::{self, Write};
use tracing::error;

/// Counters from one rendering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Blocks that produced output.
    pub rendered: usize,
    /// Blocks that rendered as empty, including unsupported kinds.
    pub empty: usize,
    /// Blocks whose payload could not be rendered.
    pub failed: usize,
}

/// Write `blocks` and their descendants depth-first to `out`.
///
/// Each non-empty rendering is followed by a newline. Children are walked at
/// `indent + 1` whether or not their parent produced output. A block that
/// fails to render is logged and skipped; only write errors are returned.
pub fn render_tree<W: Write>(
    out: &mut W,
    blocks: &[Block],
    indent: usize,
) -> io::Result<RenderStats> {
    let mut stats = RenderStats::default();
    walk(out, blocks, indent, &mut stats)?;
    Ok(stats)
}

fn walk<W: Write>(
    out: &mut W,
    blocks: &[Block],
    indent: usize,
    stats: &mut RenderStats,
) -> io::Result<()> {
    for block in blocks {
        match dispatch(block, indent) {
            Ok(text) if text.is_empty() => stats.empty += 1,
            Ok(text) => {
                writeln!(out, "{text}")?;
                stats.rendered += 1;
            },
            Err(err) => {
                error!("Error rendering block {}: {err}", block.id);
                stats.failed += 1;
            },
        }

        if !block.children().is_empty() {
            walk(out, block.children(), indent + 1, stats)?;
        }
    }
    Ok(())
}

/// Render a tree into a string.
pub fn render_to_string(blocks: &[Block]) -> String {
    let mut buf = Vec::new();
    // Writes into a Vec never fail.
    let _ = render_tree(&mut buf, blocks, 0);
    String::from_utf8_lossy(&buf).into_owned()
}
