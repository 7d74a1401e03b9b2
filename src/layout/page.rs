//! Page-level response types.

use super::{Layout, LayoutTable};
use serde::{Deserialize, Serialize};

/// A single page of a processed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPage {
    /// 1-based page number reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,

    /// Physical page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,

    /// Block-level text regions
    #[serde(default)]
    pub blocks: Vec<TextElement>,

    /// Paragraphs
    #[serde(default)]
    pub paragraphs: Vec<TextElement>,

    /// Text lines
    #[serde(default)]
    pub lines: Vec<TextElement>,

    /// Tokens (words)
    #[serde(default)]
    pub tokens: Vec<TextElement>,

    /// Detected tables
    #[serde(default)]
    pub tables: Vec<LayoutTable>,

    /// Key/value form fields
    #[serde(default)]
    pub form_fields: Vec<FormField>,
}

impl LayoutPage {
    /// Create an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page dimension and return self.
    pub fn with_dimension(mut self, width: f32, height: f32) -> Self {
        self.dimension = Some(Dimension {
            width,
            height,
            unit: None,
        });
        self
    }

    /// Page width, or 0 when no dimension was reported.
    pub fn width(&self) -> f32 {
        self.dimension.as_ref().map(|d| d.width).unwrap_or(0.0)
    }

    /// Page height, or 0 when no dimension was reported.
    pub fn height(&self) -> f32 {
        self.dimension.as_ref().map(|d| d.height).unwrap_or(0.0)
    }
}

/// Page dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Width in `unit`
    #[serde(default)]
    pub width: f32,
    /// Height in `unit`
    #[serde(default)]
    pub height: f32,
    /// Unit name (e.g. "pixels", "points")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A block, paragraph, line or token.
///
/// All four share this shape; only their granularity differs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// Element layout; absent for degenerate elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl TextElement {
    /// Create an element with the given layout.
    pub fn new(layout: Layout) -> Self {
        Self {
            layout: Some(layout),
        }
    }

    /// Create an element without layout.
    pub fn empty() -> Self {
        Self { layout: None }
    }
}

/// A detected key/value pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Layout of the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<Layout>,

    /// Layout of the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_value: Option<Layout>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dimension_is_zero() {
        let page = LayoutPage::new();
        assert_eq!(page.width(), 0.0);
        assert_eq!(page.height(), 0.0);

        let page = LayoutPage::new().with_dimension(1700.0, 2200.0);
        assert_eq!(page.width(), 1700.0);
        assert_eq!(page.height(), 2200.0);
    }

    #[test]
    fn test_form_field_decode() {
        let field: FormField = serde_json::from_str(
            r#"{"fieldName": {"textAnchor": {"textSegments": [{"endIndex": "4"}]}}}"#,
        )
        .unwrap();
        assert!(field.field_name.is_some());
        assert!(field.field_value.is_none());
    }
}
