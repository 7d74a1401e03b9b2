//! Corpus-level statistics.

use crate::model::DocumentRecord;
use serde::{Deserialize, Serialize};

/// Aggregate statistics written to `dataset_summary.json`.
///
/// Totals cover successful documents only; `total_documents` counts every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_documents: usize,
    pub successful_documents: usize,
    pub failed_documents: usize,
    pub total_pages: usize,
    /// 0 when no document succeeded
    pub average_pages_per_document: f64,
    pub total_blocks: usize,
    pub total_paragraphs: usize,
    pub total_lines: usize,
    pub total_tokens: usize,
    pub total_tables: usize,
    pub total_form_fields: usize,
}

impl DatasetSummary {
    /// Compute statistics over the given records.
    pub fn from_records(records: &[DocumentRecord]) -> Self {
        let mut summary = DatasetSummary {
            total_documents: records.len(),
            ..Default::default()
        };

        for record in records {
            let Some(doc) = record.as_success() else {
                summary.failed_documents += 1;
                continue;
            };
            summary.successful_documents += 1;
            summary.total_pages += doc.document_info.total_pages;
            summary.total_blocks += doc.blocks.len();
            summary.total_paragraphs += doc.paragraphs.len();
            summary.total_lines += doc.lines.len();
            summary.total_tokens += doc.tokens.len();
            summary.total_tables += doc.tables.len();
            summary.total_form_fields += doc.form_fields.len();
        }

        if summary.successful_documents > 0 {
            summary.average_pages_per_document =
                summary.total_pages as f64 / summary.successful_documents as f64;
        }
        summary
    }

    /// Fraction of documents that succeeded, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_documents == 0 {
            0.0
        } else {
            self.successful_documents as f64 * 100.0 / self.total_documents as f64
        }
    }
}
