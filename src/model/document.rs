//! Document-level records.

use super::{ElementEntry, ElementKind, FormFieldRecord, PageSummary, TableRecord};
use crate::error::{Error, FailureKind};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Outcome for one input file, tagged by `status` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DocumentRecord {
    /// The service processed the file
    Success(ProcessedDocument),
    /// Processing failed; only the path and error are kept
    Failed(FailedDocument),
}

impl DocumentRecord {
    /// Check if the file was processed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, DocumentRecord::Success(_))
    }

    /// Get the processed document, if successful.
    pub fn as_success(&self) -> Option<&ProcessedDocument> {
        match self {
            DocumentRecord::Success(doc) => Some(doc),
            DocumentRecord::Failed(_) => None,
        }
    }

    /// Get the failure, if processing failed.
    pub fn as_failure(&self) -> Option<&FailedDocument> {
        match self {
            DocumentRecord::Success(_) => None,
            DocumentRecord::Failed(failure) => Some(failure),
        }
    }

    /// Path of the source file.
    pub fn file_path(&self) -> &str {
        match self {
            DocumentRecord::Success(doc) => &doc.file_path,
            DocumentRecord::Failed(failure) => &failure.file_path,
        }
    }
}

/// Document-wide figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Number of pages returned by the service
    pub total_pages: usize,

    /// Length of the full text in characters
    pub text_length: usize,
}

/// Flattened result for a successfully processed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Path of the source PDF
    pub file_path: String,

    /// File name of the source PDF
    pub file_name: String,

    /// When the service response was flattened
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub processing_timestamp: DateTime<Utc>,

    /// Document-wide figures
    pub document_info: DocumentInfo,

    /// Per-page summaries
    pub pages: Vec<PageSummary>,

    /// Blocks, page by page
    pub blocks: Vec<ElementEntry>,

    /// Paragraphs, page by page
    pub paragraphs: Vec<ElementEntry>,

    /// Lines, page by page
    pub lines: Vec<ElementEntry>,

    /// Tokens, page by page
    pub tokens: Vec<ElementEntry>,

    /// Tables, page by page
    pub tables: Vec<TableRecord>,

    /// Form fields, page by page
    pub form_fields: Vec<FormFieldRecord>,
}

impl ProcessedDocument {
    /// Create an empty document record for a source file.
    pub fn new(source: &Path, processed_at: DateTime<Utc>) -> Self {
        Self {
            file_path: source.display().to_string(),
            file_name: file_name_of(source),
            processing_timestamp: processed_at,
            document_info: DocumentInfo::default(),
            pages: Vec::new(),
            blocks: Vec::new(),
            paragraphs: Vec::new(),
            lines: Vec::new(),
            tokens: Vec::new(),
            tables: Vec::new(),
            form_fields: Vec::new(),
        }
    }

    /// Entries of one element kind.
    pub fn elements(&self, kind: ElementKind) -> &[ElementEntry] {
        match kind {
            ElementKind::Block => &self.blocks,
            ElementKind::Paragraph => &self.paragraphs,
            ElementKind::Line => &self.lines,
            ElementKind::Token => &self.tokens,
        }
    }

    /// Mutable entries of one element kind.
    pub(crate) fn elements_mut(&mut self, kind: ElementKind) -> &mut Vec<ElementEntry> {
        match kind {
            ElementKind::Block => &mut self.blocks,
            ElementKind::Paragraph => &mut self.paragraphs,
            ElementKind::Line => &mut self.lines,
            ElementKind::Token => &mut self.tokens,
        }
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.document_info.total_pages
    }
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDocument {
    /// Path of the source PDF
    pub file_path: String,

    /// Error message
    pub error: String,

    /// Failure category
    #[serde(default)]
    pub error_kind: FailureKind,

    /// Submissions made before giving up (0 if the file was never sent)
    #[serde(default)]
    pub attempts: u32,
}

impl FailedDocument {
    /// Create a failure record from an error.
    pub fn from_error(source: &Path, error: &Error, attempts: u32) -> Self {
        Self {
            file_path: source.display().to_string(),
            error: error.to_string(),
            error_kind: error.kind(),
            attempts,
        }
    }
}

/// RFC 3339, or an offset-less ISO 8601 value taken as local time.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid processing_timestamp '{}'", text))
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    let naive: NaiveDateTime = text.parse().ok()?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|at| at.with_timezone(&Utc));
    // Nonexistent local times (DST gaps) fall back to UTC
    Some(local.unwrap_or_else(|| naive.and_utc()))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_tag() {
        let doc = ProcessedDocument::new(Path::new("PDFs/report.pdf"), Utc::now());
        assert_eq!(doc.file_name, "report.pdf");

        let json = serde_json::to_value(DocumentRecord::Success(doc)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["file_path"], "PDFs/report.pdf");
        assert!(json["blocks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_failed_record() {
        let err = Error::InputNotFound(PathBuf::from("PDFs/missing.pdf"));
        let record = DocumentRecord::Failed(FailedDocument::from_error(
            Path::new("PDFs/missing.pdf"),
            &err,
            0,
        ));
        assert!(!record.is_success());
        assert_eq!(record.file_path(), "PDFs/missing.pdf");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error_kind"], "input_not_found");

        let back: DocumentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_failed_record_without_kind() {
        let record: DocumentRecord = serde_json::from_str(
            r#"{"file_path": "PDFs/bad.pdf", "error": "403 Permission denied", "status": "failed"}"#,
        )
        .unwrap();
        let failure = record.as_failure().unwrap();
        assert_eq!(failure.error_kind, FailureKind::Unknown);
        assert_eq!(failure.attempts, 0);
    }

    #[test]
    fn test_parse_timestamp() {
        let utc = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());

        let naive: NaiveDateTime = "2024-03-01T12:00:00.123456".parse().unwrap();
        let expected = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_timestamp("2024-03-01T12:00:00.123456"), Some(expected));

        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
