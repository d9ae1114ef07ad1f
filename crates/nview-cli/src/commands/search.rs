//! Search command implementation

use anyhow::Result;
use chrono::{DateTime, Utc};
use nview_core::{BlockSource, Page};
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

use crate::cli::OutputFormat;

const ID_COLUMN_WIDTH: usize = 36;

#[derive(Debug, Serialize)]
struct PageRow {
    id: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_edited_time: Option<DateTime<Utc>>,
}

impl From<&Page> for PageRow {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title(),
            url: page.url.clone(),
            last_edited_time: page.last_edited_time,
        }
    }
}

/// Search pages and print them in the requested format.
pub async fn execute<S: BlockSource>(source: &S, query: &str, format: OutputFormat) -> Result<()> {
    let results = source.search(query).await;
    if let Some(failure) = results.failure() {
        warn!("Search results may be incomplete: {failure}");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_results(&mut out, query, &results.items, format)?;
    out.flush()?;
    Ok(())
}

fn write_results<W: Write>(
    out: &mut W,
    query: &str,
    pages: &[Page],
    format: OutputFormat,
) -> Result<()> {
    let rows: Vec<PageRow> = pages.iter().map(PageRow::from).collect();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        },
        OutputFormat::Text if rows.is_empty() => {
            writeln!(out, "No pages found for query: '{query}'")?;
        },
        OutputFormat::Text => {
            writeln!(out, "{:<ID_COLUMN_WIDTH$} | Title", "Page ID")?;
            writeln!(out, "{}", "-".repeat(50))?;
            for row in &rows {
                writeln!(out, "{:<ID_COLUMN_WIDTH$} | {}", row.id, row.title)?;
            }
        },
    }
    Ok(())
}
