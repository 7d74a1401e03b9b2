//! Text element records (blocks, paragraphs, lines, tokens).

use serde::{Deserialize, Serialize};

/// Granularity of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Block-level region
    Block,
    /// Paragraph
    Paragraph,
    /// Single line
    Line,
    /// Single token (word)
    Token,
}

impl ElementKind {
    /// All kinds, in flattening order.
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Block,
        ElementKind::Paragraph,
        ElementKind::Line,
        ElementKind::Token,
    ];

    /// Lowercase name as written to datasets.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Block => "block",
            ElementKind::Paragraph => "paragraph",
            ElementKind::Line => "line",
            ElementKind::Token => "token",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A polygon vertex, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point(pub i32, pub i32);

/// A flattened block, paragraph, line or token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElementRecord {
    /// 1-based page number
    pub page_number: u32,

    /// Element granularity
    pub element_type: ElementKind,

    /// 0-based ordinal of the element within its page and kind
    pub element_number: usize,

    /// Trimmed text
    pub text: String,

    /// Length of `text` in characters
    pub text_length: usize,

    /// Bounding polygon; empty when no geometry was reported
    #[serde(default)]
    pub bounding_box: Vec<Point>,

    /// Detection confidence; `None` when the service omitted it
    pub confidence: Option<f32>,
}

/// An element without layout, serialized as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyRecord {}

/// Slot for one text element in a document record.
///
/// Elements the service returned without a layout object are kept as
/// [`ElementEntry::Empty`] so that element ordinals and page counts line up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementEntry {
    /// Element with resolved text and geometry
    Extracted(TextElementRecord),
    /// Element without layout
    Empty(EmptyRecord),
}

impl ElementEntry {
    /// Get the record if this entry was extracted.
    pub fn record(&self) -> Option<&TextElementRecord> {
        match self {
            ElementEntry::Extracted(record) => Some(record),
            ElementEntry::Empty(_) => None,
        }
    }

    /// Check if this is an empty entry.
    pub fn is_empty(&self) -> bool {
        matches!(self, ElementEntry::Empty(_))
    }

    /// Text of the entry, empty for empty entries.
    pub fn text(&self) -> &str {
        self.record().map(|r| r.text.as_str()).unwrap_or("")
    }
}

impl From<TextElementRecord> for ElementEntry {
    fn from(record: TextElementRecord) -> Self {
        ElementEntry::Extracted(record)
    }
}
