//! Integration tests for dataset output.

use chrono::{TimeZone, Utc};
use doclayout::dataset::{
    single_document_file_name, write_document, BLOCKS_CSV, DATASET_FILE, DOCUMENTS_CSV,
    SUMMARY_FILE, TABLES_CSV,
};
use doclayout::{
    flatten_response, Corpus, DatasetSummary, DatasetWriter, DocumentRecord, Error,
    FailedDocument, FailureKind,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/layout_response.json");

fn processed(path: &str) -> DocumentRecord {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    DocumentRecord::Success(flatten_response(FIXTURE, Path::new(path), at).unwrap())
}

fn failed(path: &str) -> DocumentRecord {
    let err = Error::Service {
        status: 403,
        code: "PERMISSION_DENIED".to_string(),
        message: "Permission denied on processor".to_string(),
    };
    DocumentRecord::Failed(FailedDocument::from_error(Path::new(path), &err, 1))
}

fn mixed_corpus() -> Corpus {
    Corpus::new(vec![
        processed("PDFs/a.pdf"),
        failed("PDFs/b.pdf"),
        processed("PDFs/c.pdf"),
    ])
}

fn csv_lines(path: &Path) -> usize {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.records().count()
}

#[test]
fn test_failed_document_is_counted_but_not_aggregated() {
    let summary = mixed_corpus().summary();

    assert_eq!(summary.total_documents, 3);
    assert_eq!(summary.successful_documents, 2);
    assert_eq!(summary.failed_documents, 1);
    assert_eq!(summary.total_pages, 4);
    assert_eq!(summary.average_pages_per_document, 2.0);
    assert_eq!(summary.total_blocks, 6);
    assert_eq!(summary.total_tables, 2);
    assert_eq!(summary.total_form_fields, 4);
}

#[test]
fn test_summary_of_only_failures() {
    let summary = DatasetSummary::from_records(&[failed("PDFs/b.pdf")]);

    assert_eq!(summary.total_documents, 1);
    assert_eq!(summary.successful_documents, 0);
    assert_eq!(summary.average_pages_per_document, 0.0);
    assert_eq!(summary.success_rate(), 0.0);
}

#[test]
fn test_write_dataset_files() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("output");

    let written = DatasetWriter::new(&out).write(&mixed_corpus()).unwrap();
    let expected: Vec<PathBuf> = [DATASET_FILE, SUMMARY_FILE, DOCUMENTS_CSV, BLOCKS_CSV, TABLES_CSV]
        .iter()
        .map(|name| out.join(name))
        .collect();
    assert_eq!(written, expected);

    // Failed documents contribute no CSV rows
    assert_eq!(csv_lines(&out.join(DOCUMENTS_CSV)), 2);
    assert_eq!(csv_lines(&out.join(BLOCKS_CSV)), 6);
    assert_eq!(csv_lines(&out.join(TABLES_CSV)), 2);

    let summary: DatasetSummary =
        serde_json::from_str(&std::fs::read_to_string(out.join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(summary, mixed_corpus().summary());
}

#[test]
fn test_dataset_round_trip() {
    let dir = TempDir::new().unwrap();
    let corpus = mixed_corpus();
    DatasetWriter::new(dir.path()).with_csv(false).write(&corpus).unwrap();

    assert!(!dir.path().join(BLOCKS_CSV).exists());

    let loaded = doclayout::load_dataset(dir.path().join(DATASET_FILE)).unwrap();
    assert_eq!(loaded, corpus);

    let failure = loaded.records()[1].as_failure().unwrap();
    assert_eq!(failure.file_path, "PDFs/b.pdf");
    assert_eq!(failure.error_kind, FailureKind::PermissionDenied);
    assert_eq!(failure.attempts, 1);
}

#[test]
fn test_dataset_json_shape() {
    let dir = TempDir::new().unwrap();
    DatasetWriter::new(dir.path()).write(&mixed_corpus()).unwrap();

    let raw = std::fs::read_to_string(dir.path().join(DATASET_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = json.as_array().unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["status"], "success");
    assert_eq!(records[0]["document_info"]["total_pages"], 2);
    assert_eq!(records[0]["blocks"][1], serde_json::json!({}));
    assert_eq!(records[1]["status"], "failed");
    assert_eq!(records[1]["file_path"], "PDFs/b.pdf");
    assert!(records[1].get("blocks").is_none());
    // Pretty-printed
    assert!(raw.contains("\n  "));
}

#[test]
fn test_blocks_csv_keeps_empty_blocks() {
    let dir = TempDir::new().unwrap();
    let corpus = Corpus::new(vec![processed("PDFs/a.pdf")]);
    DatasetWriter::new(dir.path()).write(&corpus).unwrap();

    let mut reader = csv::Reader::from_path(dir.path().join(BLOCKS_CSV)).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "page_number");
    assert_eq!(&headers[headers.len() - 1], "file_name");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][3], "Invoice 2024");
    assert_eq!(&rows[1][0], "");
    assert_eq!(&rows[1][3], "");
    assert_eq!(&rows[1][7], "a.pdf");
    assert_eq!(&rows[2][3], "Über Café");
}

#[test]
fn test_no_csv_without_successes() {
    let dir = TempDir::new().unwrap();
    let corpus = Corpus::new(vec![failed("PDFs/b.pdf")]);

    let written = DatasetWriter::new(dir.path()).write(&corpus).unwrap();
    assert_eq!(written.len(), 2);
    assert!(!dir.path().join(DOCUMENTS_CSV).exists());
    assert!(!dir.path().join(TABLES_CSV).exists());
}

#[test]
fn test_single_document_export() {
    let dir = TempDir::new().unwrap();
    let name = single_document_file_name(Path::new("PDFs/invoice.pdf"));
    assert_eq!(name, "single_doc_result_invoice.pdf.json");

    let path = dir.path().join("nested").join(&name);
    let record = processed("PDFs/invoice.pdf");
    write_document(&record, &path).unwrap();

    let loaded: DocumentRecord =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn test_load_missing_dataset() {
    let dir = TempDir::new().unwrap();
    let err = Corpus::load(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, Error::InputNotFound(_)));
}

#[test]
fn test_load_dataset_with_minimal_records() {
    // Failure without error_kind, naive timestamp, paragraph without bounding_box
    let paragraph = "q".repeat(60);
    let raw = format!(
        r#"[
  {{"file_path": "PDFs/bad.pdf", "error": "403 Permission denied", "status": "failed"}},
  {{
    "status": "success",
    "file_path": "PDFs/good.pdf",
    "file_name": "good.pdf",
    "processing_timestamp": "2024-03-01T12:00:00.123456",
    "document_info": {{"total_pages": 1, "text_length": 60}},
    "pages": [],
    "blocks": [{{}}],
    "paragraphs": [{{"page_number": 1, "element_type": "paragraph", "element_number": 0,
                    "text": "{}", "text_length": 60, "confidence": 0.5}}],
    "lines": [],
    "tokens": [],
    "tables": [],
    "form_fields": []
  }}
]"#,
        paragraph
    );
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DATASET_FILE);
    std::fs::write(&path, raw).unwrap();

    let corpus = Corpus::load(&path).unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(
        corpus.records()[0].as_failure().unwrap().error_kind,
        FailureKind::Unknown
    );
    let doc = corpus.records()[1].as_success().unwrap();
    assert!(doc.blocks[0].is_empty());
    assert_eq!(doc.paragraphs[0].text(), paragraph);

    let selection = doclayout::ParagraphExtractor::new().select(&corpus);
    assert_eq!(selection.successful_documents, 1);
    assert_eq!(selection.records.len(), 1);
    assert_eq!(selection.records[0].text, paragraph);
}
