//! View command implementation

use anyhow::{Result, anyhow};
use nview_core::render::{RenderStats, render_tree};
use nview_core::{NotionClient, TreeFetcher, TreeStats};
use std::io::{self, BufWriter, Write};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::error::CliError;
use crate::utils::normalize_block_id;

/// Fetch the full tree below `input` and render it to stdout.
pub async fn execute(client: NotionClient, input: &str, debug: bool) -> Result<()> {
    let block_id = normalize_block_id(input).map_err(CliError::usage)?;

    let started = Instant::now();
    let fetcher = TreeFetcher::new(client);
    let tree = fetcher.fetch_tree(&block_id).await;
    let fetch_elapsed = started.elapsed();

    if tree.is_empty() {
        return Err(CliError::not_found(anyhow!(
            "No content found for ID {input}. Check if ID is correct and integration has access."
        ))
        .into());
    }
    if let Some(failure) = tree.failure() {
        warn!("Top-level content of {block_id} is incomplete: {failure}");
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let rendered = render_tree(&mut out, &tree.items, 0).and_then(|stats| {
        out.flush()?;
        Ok(stats)
    });
    let render_stats = match rendered {
        Ok(stats) => stats,
        // The reader went away (e.g. piped into `head`); nothing left to do.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    if debug {
        eprintln!(
            "{}",
            debug_summary(
                &fetcher.stats(),
                fetcher.source().requests_sent(),
                &render_stats,
                fetch_elapsed,
                started.elapsed()
            )
        );
    }
    Ok(())
}

fn debug_summary(
    tree: &TreeStats,
    requests: u64,
    render: &RenderStats,
    fetch_elapsed: Duration,
    total_elapsed: Duration,
) -> String {
    format!(
        "Fetched {} blocks in {} listings ({} requests, {} truncated) in {:.2?}\n\
         Rendered {} blocks ({} empty, {} failed); total {:.2?}",
        tree.blocks,
        tree.listings,
        requests,
        tree.truncated,
        fetch_elapsed,
        render.rendered,
        render.empty,
        render.failed,
        total_elapsed
    )
}
