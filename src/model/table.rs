//! Table and cell records.

use super::Point;
use serde::{Deserialize, Serialize};

/// A flattened table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    /// 1-based page number
    pub page_number: u32,

    /// 0-based ordinal of the table within its page
    pub table_number: usize,

    /// Number of body rows
    pub rows_count: usize,

    /// Number of header rows
    pub header_rows_count: usize,

    /// Cells: header rows first, then body rows, each row in column order
    pub cells: Vec<CellRecord>,
}

impl TableRecord {
    /// Header cells.
    pub fn header_cells(&self) -> impl Iterator<Item = &CellRecord> {
        self.cells.iter().filter(|c| c.cell_type == CellRole::Header)
    }

    /// Body cells.
    pub fn body_cells(&self) -> impl Iterator<Item = &CellRecord> {
        self.cells.iter().filter(|c| c.cell_type == CellRole::Body)
    }

    /// Check if any cell spans more than one row or column.
    pub fn has_merged_cells(&self) -> bool {
        self.cells.iter().any(|c| c.row_span > 1 || c.col_span > 1)
    }
}

/// Whether a cell belongs to a header or a body row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellRole {
    /// Header row cell
    Header,
    /// Body row cell
    Body,
}

/// A flattened table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    /// 1-based page number
    pub page_number: u32,

    /// Table ordinal within the page
    pub table_number: usize,

    /// Row index within the header or body section (restarts at 0 for body)
    pub row_index: usize,

    /// Column index within the row
    pub cell_index: usize,

    /// Header or body
    pub cell_type: CellRole,

    /// Trimmed text
    pub text: String,

    /// Length of `text` in characters
    pub text_length: usize,

    /// Bounding polygon
    pub bounding_box: Vec<Point>,

    /// Rows spanned (at least 1)
    pub row_span: u32,

    /// Columns spanned (at least 1)
    pub col_span: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(role: CellRole, row_span: u32) -> CellRecord {
        CellRecord {
            page_number: 1,
            table_number: 0,
            row_index: 0,
            cell_index: 0,
            cell_type: role,
            text: String::new(),
            text_length: 0,
            bounding_box: Vec::new(),
            row_span,
            col_span: 1,
        }
    }

    #[test]
    fn test_header_body_split() {
        let table = TableRecord {
            page_number: 1,
            table_number: 0,
            rows_count: 1,
            header_rows_count: 1,
            cells: vec![cell(CellRole::Header, 1), cell(CellRole::Body, 2)],
        };
        assert_eq!(table.header_cells().count(), 1);
        assert_eq!(table.body_cells().count(), 1);
        assert!(table.has_merged_cells());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&CellRole::Header).unwrap();
        assert_eq!(json, "\"header\"");
    }
}
