//! Flattening of layout responses into dataset records.
//!
//! The walk is fixed-shape and deterministic: pages in order, and within a
//! page blocks, paragraphs, lines, tokens, tables and form fields, each in
//! the order the service returned them. Nothing is dropped: an element
//! without layout becomes an empty entry, a cell or field without layout
//! becomes a record with empty text.

mod text;

pub use text::FullText;

use crate::layout::{FormField, Layout, LayoutDocument, LayoutPage, LayoutTable, TableRow, TextElement};
use crate::model::{
    CellRecord, CellRole, DocumentInfo, ElementEntry, ElementKind, EmptyRecord, FormFieldRecord,
    PageSummary, Point, ProcessedDocument, TableRecord, TextElementRecord,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a text segment without an end offset is materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentPolicy {
    /// The segment runs to the end of the document text
    #[default]
    DocumentEnd,
    /// The segment contributes no text
    Skip,
}

/// Options for flattening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    /// Treatment of segments with a missing end offset
    pub missing_end_offset: SegmentPolicy,
}

impl FlattenOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the missing-end-offset policy.
    pub fn with_missing_end_offset(mut self, policy: SegmentPolicy) -> Self {
        self.missing_end_offset = policy;
        self
    }
}

/// Flattens [`LayoutDocument`]s into [`ProcessedDocument`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flattener {
    options: FlattenOptions,
}

impl Flattener {
    /// Create a flattener with the given options.
    pub fn new(options: FlattenOptions) -> Self {
        Self { options }
    }

    /// Flatten one service response for the given source file.
    pub fn flatten(
        &self,
        document: &LayoutDocument,
        source: &Path,
        processed_at: DateTime<Utc>,
    ) -> ProcessedDocument {
        let text = FullText::new(&document.text);
        let mut out = ProcessedDocument::new(source, processed_at);
        out.document_info = DocumentInfo {
            total_pages: document.pages.len(),
            text_length: text.char_len(),
        };

        for (index, page) in document.pages.iter().enumerate() {
            self.flatten_page(&text, page, index as u32 + 1, &mut out);
        }

        out
    }

    fn flatten_page(
        &self,
        text: &FullText<'_>,
        page: &LayoutPage,
        page_number: u32,
        out: &mut ProcessedDocument,
    ) {
        out.pages.push(PageSummary {
            page_number,
            width: page.width(),
            height: page.height(),
            blocks_count: page.blocks.len(),
            paragraphs_count: page.paragraphs.len(),
            lines_count: page.lines.len(),
            tokens_count: page.tokens.len(),
            tables_count: page.tables.len(),
            form_fields_count: page.form_fields.len(),
        });

        for kind in ElementKind::ALL {
            let entries = page_elements(page, kind)
                .iter()
                .enumerate()
                .map(|(n, element)| self.text_element(text, element, page_number, kind, n));
            out.elements_mut(kind).extend(entries);
        }

        for (n, table) in page.tables.iter().enumerate() {
            out.tables.push(self.table(text, table, page_number, n));
        }

        for (n, field) in page.form_fields.iter().enumerate() {
            out.form_fields.push(self.form_field(text, field, page_number, n));
        }
    }

    fn text_element(
        &self,
        text: &FullText<'_>,
        element: &TextElement,
        page_number: u32,
        kind: ElementKind,
        element_number: usize,
    ) -> ElementEntry {
        let Some(layout) = element.layout.as_ref() else {
            return ElementEntry::Empty(EmptyRecord {});
        };

        let resolved = self.resolve(text, Some(layout));
        TextElementRecord {
            page_number,
            element_type: kind,
            element_number,
            text_length: resolved.chars().count(),
            text: resolved,
            bounding_box: polygon(Some(layout)),
            confidence: layout.confidence,
        }
        .into()
    }

    fn table(
        &self,
        text: &FullText<'_>,
        table: &LayoutTable,
        page_number: u32,
        table_number: usize,
    ) -> TableRecord {
        let mut cells = Vec::new();
        for (role, rows) in [
            (CellRole::Header, &table.header_rows),
            (CellRole::Body, &table.body_rows),
        ] {
            self.table_section(text, rows, role, page_number, table_number, &mut cells);
        }

        TableRecord {
            page_number,
            table_number,
            rows_count: table.body_rows.len(),
            header_rows_count: table.header_rows.len(),
            cells,
        }
    }

    fn table_section(
        &self,
        text: &FullText<'_>,
        rows: &[TableRow],
        role: CellRole,
        page_number: u32,
        table_number: usize,
        cells: &mut Vec<CellRecord>,
    ) {
        for (row_index, row) in rows.iter().enumerate() {
            for (cell_index, cell) in row.cells.iter().enumerate() {
                let layout = cell.layout.as_ref();
                let resolved = self.resolve(text, layout);
                cells.push(CellRecord {
                    page_number,
                    table_number,
                    row_index,
                    cell_index,
                    cell_type: role,
                    text_length: resolved.chars().count(),
                    text: resolved,
                    bounding_box: polygon(layout),
                    row_span: span(cell.row_span),
                    col_span: span(cell.col_span),
                });
            }
        }
    }

    fn form_field(
        &self,
        text: &FullText<'_>,
        field: &FormField,
        page_number: u32,
        field_number: usize,
    ) -> FormFieldRecord {
        FormFieldRecord {
            page_number,
            field_number,
            field_name: self.resolve(text, field.field_name.as_ref()),
            field_value: self.resolve(text, field.field_value.as_ref()),
        }
    }

    fn resolve(&self, text: &FullText<'_>, layout: Option<&Layout>) -> String {
        match layout {
            Some(layout) => text.resolve(layout.segments(), self.options.missing_end_offset),
            None => String::new(),
        }
    }
}

/// Flatten with default options.
pub fn flatten_document(
    document: &LayoutDocument,
    source: &Path,
    processed_at: DateTime<Utc>,
) -> ProcessedDocument {
    Flattener::default().flatten(document, source, processed_at)
}

fn page_elements(page: &LayoutPage, kind: ElementKind) -> &[TextElement] {
    match kind {
        ElementKind::Block => &page.blocks,
        ElementKind::Paragraph => &page.paragraphs,
        ElementKind::Line => &page.lines,
        ElementKind::Token => &page.tokens,
    }
}

fn polygon(layout: Option<&Layout>) -> Vec<Point> {
    layout
        .and_then(|l| l.bounding_poly.as_ref())
        .map(|poly| {
            poly.vertices
                .iter()
                .map(|v| Point(v.x.unwrap_or(0), v.y.unwrap_or(0)))
                .collect()
        })
        .unwrap_or_default()
}

/// Omitted (or non-positive) spans count as 1.
fn span(value: Option<i32>) -> u32 {
    value.filter(|&s| s > 0).map(|s| s as u32).unwrap_or(1)
}
