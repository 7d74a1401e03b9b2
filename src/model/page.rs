//! Page summary records.

use serde::{Deserialize, Serialize};

/// Per-page entity counts, captured when the page is flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-based page number
    pub page_number: u32,

    /// Page width as reported by the service (0 if absent)
    pub width: f32,

    /// Page height as reported by the service (0 if absent)
    pub height: f32,

    /// Number of blocks on the page
    pub blocks_count: usize,

    /// Number of paragraphs on the page
    pub paragraphs_count: usize,

    /// Number of lines on the page
    pub lines_count: usize,

    /// Number of tokens on the page
    pub tokens_count: usize,

    /// Number of tables on the page
    pub tables_count: usize,

    /// Number of form fields on the page
    pub form_fields_count: usize,
}

impl PageSummary {
    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Check if the page has no extracted entities at all.
    pub fn is_empty(&self) -> bool {
        self.blocks_count == 0
            && self.paragraphs_count == 0
            && self.lines_count == 0
            && self.tokens_count == 0
            && self.tables_count == 0
            && self.form_fields_count == 0
    }
}
