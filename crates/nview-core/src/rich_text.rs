//! Inline formatting of styled text runs.
//!
//! Each run is wrapped innermost-first in a fixed order: code span, bold,
//! italic, strikethrough. A link, when present, wraps the fully annotated
//! text last. Runs are concatenated with no separator.

use serde::Deserialize;

/// Style flags carried by a single run.
///
/// Other flags the API reports (underline, color) are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Annotations {
    /// Render as `**text**`.
    pub bold: bool,
    /// Render as `*text*`.
    pub italic: bool,
    /// Render as `~~text~~`.
    pub strikethrough: bool,
    /// Render as `` `text` ``.
    pub code: bool,
}

/// A span of text with independent style annotations and an optional link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RichTextRun {
    /// Plain text content of the run.
    #[serde(rename = "plain_text", default)]
    pub content: String,
    /// Style flags.
    #[serde(default)]
    pub annotations: Annotations,
    /// Link target, if the run is a hyperlink.
    #[serde(default)]
    pub href: Option<String>,
}

impl RichTextRun {
    /// Create an unstyled run.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Replace the annotations on this run.
    #[must_use]
    pub const fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Attach a link target.
    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Render this run as inline markup.
    pub fn to_markdown(&self) -> String {
        let mut text = self.content.clone();
        if self.annotations.code {
            text = format!("`{text}`");
        }
        if self.annotations.bold {
            text = format!("**{text}**");
        }
        if self.annotations.italic {
            text = format!("*{text}*");
        }
        if self.annotations.strikethrough {
            text = format!("~~{text}~~");
        }
        match &self.href {
            Some(href) => format!("[{text}]({href})"),
            None => text,
        }
    }
}

/// Render a sequence of runs as inline markup.
pub fn to_markdown(runs: &[RichTextRun]) -> String {
    runs.iter().map(RichTextRun::to_markdown).collect()
}

/// Concatenate the unstyled content of a sequence of runs.
pub fn plain_text(runs: &[RichTextRun]) -> String {
    runs.iter().map(|run| run.content.as_str()).collect()
}
