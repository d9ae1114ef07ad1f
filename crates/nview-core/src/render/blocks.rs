//! One renderer per block kind.
//!
//! Each renderer decodes the block's payload into the shape it needs and
//! returns a single (possibly multi-line) string without a trailing newline.

use crate::rich_text::{self, RichTextRun};
use crate::types::Block;
use crate::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Link prefix for child page references.
pub const PAGE_LINK_BASE: &str = "https://www.notion.so/";

#[derive(Deserialize)]
struct TextPayload {
    rich_text: Vec<RichTextRun>,
}

#[derive(Deserialize)]
struct ToDoPayload {
    rich_text: Vec<RichTextRun>,
    checked: bool,
}

#[derive(Deserialize)]
struct CodePayload {
    rich_text: Vec<RichTextRun>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Deserialize)]
struct EquationPayload {
    #[serde(default)]
    expression: String,
}

#[derive(Deserialize)]
struct CalloutPayload {
    rich_text: Vec<RichTextRun>,
    #[serde(default)]
    icon: Option<Icon>,
}

#[derive(Deserialize)]
struct Icon {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    emoji: Option<String>,
}

#[derive(Deserialize)]
struct TableRowPayload {
    cells: Vec<Vec<RichTextRun>>,
}

#[derive(Deserialize)]
struct ChildPagePayload {
    #[serde(default)]
    title: Option<String>,
}

fn decode<T: DeserializeOwned>(block: &Block) -> Result<T> {
    T::deserialize(&block.payload).map_err(|e| Error::Render {
        block_id: block.id.clone(),
        reason: format!("invalid {} payload: {e}", block.kind),
    })
}

fn text(block: &Block) -> Result<String> {
    decode::<TextPayload>(block).map(|payload| rich_text::to_markdown(&payload.rich_text))
}

/// Text block with a fixed prefix: paragraph, quote, list items, toggle.
pub fn prefixed(block: &Block, pad: &str, prefix: &str) -> Result<String> {
    Ok(format!("{pad}{prefix}{}", text(block)?))
}

/// Headings start with a blank line to separate sections.
pub fn heading(block: &Block, pad: &str, level: u8) -> Result<String> {
    let hashes = "#".repeat(usize::from(level));
    Ok(format!("\n{pad}{hashes} {}", text(block)?))
}

/// Checkbox item, `[x]` when checked.
pub fn to_do(block: &Block, pad: &str) -> Result<String> {
    let payload: ToDoPayload = decode(block)?;
    let mark = if payload.checked { "[x]" } else { "[ ]" };
    Ok(format!("{pad}{mark} {}", rich_text::to_markdown(&payload.rich_text)))
}

/// Fenced code with every source line carrying the block's indentation.
pub fn code(block: &Block, pad: &str) -> Result<String> {
    let payload: CodePayload = decode(block)?;
    let language = payload.language.as_deref().unwrap_or("text");
    let source = rich_text::to_markdown(&payload.rich_text);
    let body = source
        .lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(format!("\n{pad}```{language}\n{body}\n{pad}```"))
}

/// Display math between `$$` delimiters.
pub fn equation(block: &Block, pad: &str) -> Result<String> {
    let payload: EquationPayload = decode(block)?;
    Ok(format!("{pad}$${}$$", payload.expression))
}

/// Horizontal rule.
pub fn divider(pad: &str) -> String {
    format!("{pad}---")
}

/// Callouts render as quotes; only emoji icons are shown.
pub fn callout(block: &Block, pad: &str) -> Result<String> {
    let payload: CalloutPayload = decode(block)?;
    let icon = payload
        .icon
        .filter(|icon| icon.kind == "emoji")
        .and_then(|icon| icon.emoji)
        .map(|emoji| format!("{emoji} "))
        .unwrap_or_default();
    Ok(format!("{pad}> {icon}{}", rich_text::to_markdown(&payload.rich_text)))
}

/// Cells joined with ` | ` between outer pipes.
pub fn table_row(block: &Block, pad: &str) -> Result<String> {
    let payload: TableRowPayload = decode(block)?;
    let cells = payload
        .cells
        .iter()
        .map(|cell| rich_text::to_markdown(cell))
        .collect::<Vec<_>>()
        .join(" | ");
    Ok(format!("{pad}| {cells} |"))
}

/// A link to the referenced page; its content is never inlined.
pub fn child_page(block: &Block, pad: &str) -> Result<String> {
    let payload: ChildPagePayload = decode(block)?;
    let title = payload.title.as_deref().unwrap_or("Untitled");
    let compact_id = block.id.replace('-', "");
    Ok(format!("{pad}[Page: {title}]({PAGE_LINK_BASE}{compact_id})"))
}
