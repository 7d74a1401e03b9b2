//! Per-entity CSV tables.

use super::{Corpus, BLOCKS_CSV, DOCUMENTS_CSV, TABLES_CSV};
use crate::error::Result;
use crate::model::{ElementEntry, ProcessedDocument, TableRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One row of `documents_summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentCsvRow<'a> {
    pub file_name: &'a str,
    pub file_path: &'a str,
    pub total_pages: usize,
    pub text_length: usize,
    pub blocks_count: usize,
    pub paragraphs_count: usize,
    pub lines_count: usize,
    pub tokens_count: usize,
    pub tables_count: usize,
    pub form_fields_count: usize,
}

impl<'a> From<&'a ProcessedDocument> for DocumentCsvRow<'a> {
    fn from(doc: &'a ProcessedDocument) -> Self {
        Self {
            file_name: &doc.file_name,
            file_path: &doc.file_path,
            total_pages: doc.document_info.total_pages,
            text_length: doc.document_info.text_length,
            blocks_count: doc.blocks.len(),
            paragraphs_count: doc.paragraphs.len(),
            lines_count: doc.lines.len(),
            tokens_count: doc.tokens.len(),
            tables_count: doc.tables.len(),
            form_fields_count: doc.form_fields.len(),
        }
    }
}

/// One row of `blocks.csv`.
///
/// Blocks without layout keep their row with every field but `file_name` blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockCsvRow<'a> {
    pub page_number: Option<u32>,
    pub element_type: Option<&'static str>,
    pub element_number: Option<usize>,
    pub text: Option<&'a str>,
    pub text_length: Option<usize>,
    /// JSON array of `[x, y]` points
    pub bounding_box: Option<String>,
    pub confidence: Option<f32>,
    pub file_name: &'a str,
}

impl<'a> BlockCsvRow<'a> {
    /// Build the row for one block entry.
    pub fn new(entry: &'a ElementEntry, file_name: &'a str) -> Result<Self> {
        let Some(record) = entry.record() else {
            return Ok(Self {
                page_number: None,
                element_type: None,
                element_number: None,
                text: None,
                text_length: None,
                bounding_box: None,
                confidence: None,
                file_name,
            });
        };
        Ok(Self {
            page_number: Some(record.page_number),
            element_type: Some(record.element_type.as_str()),
            element_number: Some(record.element_number),
            text: Some(&record.text),
            text_length: Some(record.text_length),
            bounding_box: Some(serde_json::to_string(&record.bounding_box)?),
            confidence: record.confidence,
            file_name,
        })
    }
}

/// One row of `tables.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCsvRow<'a> {
    pub page_number: u32,
    pub table_number: usize,
    pub rows_count: usize,
    pub header_rows_count: usize,
    pub cells_count: usize,
    /// JSON array of cell records
    pub cells: String,
    pub file_name: &'a str,
}

impl<'a> TableCsvRow<'a> {
    /// Build the row for one table.
    pub fn new(table: &TableRecord, file_name: &'a str) -> Result<Self> {
        Ok(Self {
            page_number: table.page_number,
            table_number: table.table_number,
            rows_count: table.rows_count,
            header_rows_count: table.header_rows_count,
            cells_count: table.cells.len(),
            cells: serde_json::to_string(&table.cells)?,
            file_name,
        })
    }
}

/// Write the three CSV tables; returns the files actually written.
pub(super) fn write_tables(output_dir: &Path, corpus: &Corpus) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let documents: Vec<DocumentCsvRow<'_>> = corpus.successful().map(DocumentCsvRow::from).collect();

    let mut blocks = Vec::new();
    let mut tables = Vec::new();
    for doc in corpus.successful() {
        for block in &doc.blocks {
            blocks.push(BlockCsvRow::new(block, &doc.file_name)?);
        }
        for table in &doc.tables {
            tables.push(TableCsvRow::new(table, &doc.file_name)?);
        }
    }

    for (name, wrote) in [
        (DOCUMENTS_CSV, write_rows(&output_dir.join(DOCUMENTS_CSV), &documents)?),
        (BLOCKS_CSV, write_rows(&output_dir.join(BLOCKS_CSV), &blocks)?),
        (TABLES_CSV, write_rows(&output_dir.join(TABLES_CSV), &tables)?),
    ] {
        if wrote {
            let path = output_dir.join(name);
            log::info!("Saved {} to {}", name, path.display());
            written.push(path);
        }
    }

    Ok(written)
}

/// Write rows with a header; nothing is created for an empty slice.
fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<bool> {
    if rows.is_empty() {
        return Ok(false);
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmptyRecord, ElementKind, Point, TextElementRecord};

    fn block() -> ElementEntry {
        TextElementRecord {
            page_number: 2,
            element_type: ElementKind::Block,
            element_number: 4,
            text: "Total, net".to_string(),
            text_length: 10,
            bounding_box: vec![Point(1, 2), Point(3, 4)],
            confidence: Some(0.5),
        }
        .into()
    }

    #[test]
    fn test_block_row_fields() {
        let entry = block();
        let row = BlockCsvRow::new(&entry, "a.pdf").unwrap();
        assert_eq!(row.bounding_box.as_deref(), Some("[[1,2],[3,4]]"));
        assert_eq!(row.element_type, Some("block"));
    }

    #[test]
    fn test_empty_block_row_is_blank() {
        let entry = ElementEntry::Empty(EmptyRecord {});
        let row = BlockCsvRow::new(&entry, "a.pdf").unwrap();
        assert!(row.text.is_none());
        assert_eq!(row.file_name, "a.pdf");
    }

    #[test]
    fn test_write_rows_quotes_and_skips_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blocks.csv");

        assert!(!write_rows::<BlockCsvRow<'_>>(&path, &[]).unwrap());
        assert!(!path.exists());

        let entry = block();
        let empty = ElementEntry::Empty(EmptyRecord {});
        let rows = vec![
            BlockCsvRow::new(&entry, "a.pdf").unwrap(),
            BlockCsvRow::new(&empty, "a.pdf").unwrap(),
        ];
        assert!(write_rows(&path, &rows).unwrap());

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "page_number,element_type,element_number,text,text_length,bounding_box,confidence,file_name"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2,block,4,\"Total, net\",10,\"[[1,2],[3,4]]\",0.5,a.pdf"
        );
        assert_eq!(lines.next().unwrap(), ",,,,,,,a.pdf");
    }
}
