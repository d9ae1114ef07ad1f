use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::rich_text::{self, RichTextRun};

/// Discriminator selecting how a block renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Plain paragraph.
    Paragraph,
    /// Heading of the given level (1-6).
    Heading(u8),
    /// Bulleted list item.
    BulletedListItem,
    /// Numbered list item.
    NumberedListItem,
    /// Block quote.
    Quote,
    /// Checkbox item.
    ToDo,
    /// Fenced source code.
    Code,
    /// Display-math expression.
    Equation,
    /// Horizontal rule.
    Divider,
    /// Highlighted note with optional icon.
    Callout,
    /// One row of a table; the table block itself renders nothing.
    TableRow,
    /// Collapsible section.
    Toggle,
    /// Reference to another page. Never expanded inline.
    ChildPage,
    /// Any type tag without a renderer.
    Unsupported(String),
}

impl BlockKind {
    /// Parse a wire type tag such as `heading_2` or `to_do`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "paragraph" => Self::Paragraph,
            "bulleted_list_item" => Self::BulletedListItem,
            "numbered_list_item" => Self::NumberedListItem,
            "quote" => Self::Quote,
            "to_do" => Self::ToDo,
            "code" => Self::Code,
            "equation" => Self::Equation,
            "divider" => Self::Divider,
            "callout" => Self::Callout,
            "table_row" => Self::TableRow,
            "toggle" => Self::Toggle,
            "child_page" => Self::ChildPage,
            other => other
                .strip_prefix("heading_")
                .and_then(|level| level.parse::<u8>().ok())
                .filter(|level| (1..=6).contains(level))
                .map_or_else(|| Self::Unsupported(other.to_string()), Self::Heading),
        }
    }

    /// The wire type tag for this kind.
    pub fn tag(&self) -> String {
        match self {
            Self::Paragraph => "paragraph".to_string(),
            Self::Heading(level) => format!("heading_{level}"),
            Self::BulletedListItem => "bulleted_list_item".to_string(),
            Self::NumberedListItem => "numbered_list_item".to_string(),
            Self::Quote => "quote".to_string(),
            Self::ToDo => "to_do".to_string(),
            Self::Code => "code".to_string(),
            Self::Equation => "equation".to_string(),
            Self::Divider => "divider".to_string(),
            Self::Callout => "callout".to_string(),
            Self::TableRow => "table_row".to_string(),
            Self::Toggle => "toggle".to_string(),
            Self::ChildPage => "child_page".to_string(),
            Self::Unsupported(tag) => tag.clone(),
        }
    }

    /// Whether this kind references a separate page rather than inline content.
    pub const fn is_page_boundary(&self) -> bool {
        matches!(self, Self::ChildPage)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Fetch state of a block's `children` sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildrenState {
    /// No child listing has been attached.
    #[default]
    NotFetched,
    /// Every page of the child listing was retrieved.
    Complete,
    /// The listing stopped early (rate limit, access denied, transient failure).
    Truncated,
}

/// A node of the remote document tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawBlock")]
pub struct Block {
    /// Opaque stable identifier.
    pub id: String,
    /// Type discriminator.
    pub kind: BlockKind,
    /// Whether the server reports descendants for this block.
    pub has_children: bool,
    /// Type-specific payload, decoded lazily by the renderer.
    pub payload: Value,
    children: Vec<Block>,
    children_state: ChildrenState,
}

#[derive(Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    type_tag: String,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

impl From<RawBlock> for Block {
    fn from(mut raw: RawBlock) -> Self {
        let payload = raw.rest.remove(&raw.type_tag).unwrap_or(Value::Null);
        Self::new(raw.id, BlockKind::from_tag(&raw.type_tag), payload)
            .with_has_children(raw.has_children)
    }
}

impl Block {
    /// Create a leaf block.
    pub fn new(id: impl Into<String>, kind: BlockKind, payload: Value) -> Self {
        Self {
            id: id.into(),
            kind,
            has_children: false,
            payload,
            children: Vec::new(),
            children_state: ChildrenState::NotFetched,
        }
    }

    /// Set the server-reported `has_children` flag.
    #[must_use]
    pub const fn with_has_children(mut self, has_children: bool) -> Self {
        self.has_children = has_children;
        self
    }

    /// Whether the tree fetcher should descend into this block.
    pub const fn should_expand(&self) -> bool {
        self.has_children && !self.kind.is_page_boundary()
    }

    /// Attached children, in server order. Empty until fetched.
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Fetch state of [`Self::children`].
    pub const fn children_state(&self) -> ChildrenState {
        self.children_state
    }

    /// Attach the fetched child listing.
    ///
    /// Children are attached at most once and only to blocks that report
    /// `has_children`. Returns `false` when the attachment is refused.
    pub fn attach_children(&mut self, children: Vec<Self>, truncated: bool) -> bool {
        if !self.has_children || self.children_state != ChildrenState::NotFetched {
            debug!(
                block_id = %self.id,
                state = ?self.children_state,
                "refusing to attach children"
            );
            return false;
        }
        self.children = children;
        self.children_state = if truncated {
            ChildrenState::Truncated
        } else {
            ChildrenState::Complete
        };
        true
    }
}

/// A page returned by search.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Page identifier.
    pub id: String,
    /// Canonical URL, when reported.
    #[serde(default)]
    pub url: Option<String>,
    /// Last edit timestamp, when reported.
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    /// Raw property map; one entry has `"type": "title"`.
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

impl Page {
    /// The page title, or `Untitled` when the title property is missing or empty.
    pub fn title(&self) -> String {
        let title = self
            .properties
            .values()
            .find(|prop| prop.get("type").and_then(Value::as_str) == Some("title"))
            .and_then(|prop| prop.get("title"))
            .and_then(|runs| Vec::<RichTextRun>::deserialize(runs).ok())
            .map(|runs| rich_text::plain_text(&runs))
            .unwrap_or_default();
        if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        }
    }
}

/// Why a listing stopped before the server signalled its last page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    /// The server kept answering 429 until the attempt cap.
    #[error("rate limit exceeded after {attempts} attempts")]
    RateLimited {
        /// Attempts made for the failing request.
        attempts: u32,
    },
    /// The server answered 403 for this id.
    #[error("permission denied for block {block_id}; ensure the page is shared with your integration")]
    AccessDenied {
        /// The blocked id.
        block_id: String,
    },
    /// The server answered 403 to a search.
    #[error("permission denied for search; ensure the integration can read content")]
    SearchDenied,
    /// Transport errors, timeouts, unexpected statuses or malformed bodies.
    #[error("request failed after {attempts} attempts: {message}")]
    Transient {
        /// Attempts made for the failing request.
        attempts: u32,
        /// Description of the last failure.
        message: String,
    },
}

/// Completion status of a [`Fetched`] listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// Every page was retrieved.
    #[default]
    Complete,
    /// Results are partial; carries the failure that stopped the listing.
    Truncated(FetchFailure),
}

/// Outcome of a listing call: the items gathered plus whether they are complete.
///
/// Failures never surface as errors; callers treat a truncated or empty result
/// as "no further data".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fetched<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Whether the listing finished.
    pub status: FetchStatus,
}

impl<T> Fetched<T> {
    /// A listing that retrieved every page.
    pub const fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            status: FetchStatus::Complete,
        }
    }

    /// A listing cut short by `failure`.
    pub const fn truncated(items: Vec<T>, failure: FetchFailure) -> Self {
        Self {
            items,
            status: FetchStatus::Truncated(failure),
        }
    }

    /// Whether every page was retrieved.
    pub const fn is_complete(&self) -> bool {
        matches!(self.status, FetchStatus::Complete)
    }

    /// Whether no items were gathered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The failure that truncated this listing, if any.
    pub const fn failure(&self) -> Option<&FetchFailure> {
        match &self.status {
            FetchStatus::Complete => None,
            FetchStatus::Truncated(failure) => Some(failure),
        }
    }
}
