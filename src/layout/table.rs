//! Table response types.

use super::Layout;
use serde::{Deserialize, Serialize};

/// A detected table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTable {
    /// Layout of the whole table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,

    /// Header rows, top to bottom
    #[serde(default)]
    pub header_rows: Vec<TableRow>,

    /// Body rows, top to bottom
    #[serde(default)]
    pub body_rows: Vec<TableRow>,
}

impl LayoutTable {
    /// Create a table from header and body rows.
    pub fn new(header_rows: Vec<TableRow>, body_rows: Vec<TableRow>) -> Self {
        Self {
            layout: None,
            header_rows,
            body_rows,
        }
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in column order
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a row from cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    /// Cell layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,

    /// Rows spanned; omitted means 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_span: Option<i32>,

    /// Columns spanned; omitted means 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<i32>,
}

impl TableCell {
    /// Create a cell with the given layout.
    pub fn new(layout: Layout) -> Self {
        Self {
            layout: Some(layout),
            row_span: None,
            col_span: None,
        }
    }

    /// Set the spans and return self.
    pub fn span(mut self, rows: i32, cols: i32) -> Self {
        self.row_span = Some(rows);
        self.col_span = Some(cols);
        self
    }
}
