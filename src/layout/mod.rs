//! Typed model of the layout service response.
//!
//! These types mirror the JSON returned by the Document AI `:process`
//! endpoint (proto3 JSON mapping, camelCase). Every field is optional or
//! defaults to empty, so a sparse or partially populated response decodes
//! into checked `Option`s instead of failing.

mod geometry;
mod page;
mod table;

pub use geometry::{BoundingPoly, Layout, NormalizedVertex, TextAnchor, TextSegment, Vertex};
pub use page::{Dimension, FormField, LayoutPage, TextElement};
pub use table::{LayoutTable, TableCell, TableRow};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Top-level body of a `:process` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// The processed document
    #[serde(default)]
    pub document: LayoutDocument,
}

/// A processed document: full text plus per-page layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    /// Full extracted text; text anchors index into it
    #[serde(default)]
    pub text: String,

    /// Pages in document order
    #[serde(default)]
    pub pages: Vec<LayoutPage>,

    /// MIME type echoed by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl LayoutDocument {
    /// Create a document from text and pages.
    pub fn new(text: impl Into<String>, pages: Vec<LayoutPage>) -> Self {
        Self {
            text: text.into(),
            pages,
            mime_type: None,
        }
    }

    /// Decode a `:process` response body.
    pub fn from_response_json(body: &str) -> Result<Self> {
        let response: ProcessResponse =
            serde_json::from_str(body).map_err(|e| Error::Decode(e.to_string()))?;
        Ok(response.document)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Length of the full text in characters.
    pub fn text_length(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the service returned no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
