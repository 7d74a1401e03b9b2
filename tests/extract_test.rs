//! Integration tests for paragraph extraction.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use doclayout::extract::TextRecord;
use doclayout::model::EmptyRecord;
use doclayout::{
    Corpus, DocumentRecord, ElementEntry, ElementKind, Error, FailedDocument, ParagraphExtractor,
    ProcessedDocument, TextElementRecord,
};
use std::path::Path;
use tempfile::TempDir;

fn paragraph(text: &str, element_number: usize) -> ElementEntry {
    TextElementRecord {
        page_number: 1,
        element_type: ElementKind::Paragraph,
        element_number,
        text: text.to_string(),
        text_length: text.chars().count(),
        bounding_box: Vec::new(),
        confidence: Some(0.9),
    }
    .into()
}

fn document(name: &str, paragraphs: Vec<ElementEntry>) -> DocumentRecord {
    let mut doc = ProcessedDocument::new(Path::new(name), Utc::now());
    doc.document_info.total_pages = 1;
    doc.paragraphs = paragraphs;
    DocumentRecord::Success(doc)
}

fn run_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 30, 5)
        .unwrap()
}

fn read_lines(path: &Path) -> Vec<TextRecord> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_length_threshold() {
    let short = "a".repeat(40);
    let long = "b".repeat(60);
    let corpus = Corpus::new(vec![document("a.pdf", vec![paragraph(&short, 0), paragraph(&long, 1)])]);

    let dir = TempDir::new().unwrap();
    let report = ParagraphExtractor::new()
        .with_min_length(50)
        .with_output_dir(dir.path())
        .extract_at(&corpus, run_time())
        .unwrap();

    assert_eq!(report.total_paragraphs, 2);
    assert_eq!(report.extracted, 1);

    let path = report.output_path.unwrap();
    assert_eq!(path, dir.path().join("llm_dataset_20240301_093005.jsonl"));
    assert_eq!(read_lines(&path), vec![TextRecord { text: long }]);
}

#[test]
fn test_threshold_counts_trimmed_characters() {
    // 50 characters once trimmed, multibyte
    let text = format!("  {}  ", "é".repeat(50));
    let corpus = Corpus::new(vec![document("a.pdf", vec![paragraph(&text, 0)])]);

    let selection = ParagraphExtractor::new().with_min_length(50).select(&corpus);
    assert_eq!(selection.records.len(), 1);
    assert_eq!(selection.records[0].text, "é".repeat(50));

    let selection = ParagraphExtractor::new().with_min_length(51).select(&corpus);
    assert!(selection.records.is_empty());
}

#[test]
fn test_skips_failures_and_empty_entries() {
    let text = "c".repeat(80);
    let failure = DocumentRecord::Failed(FailedDocument::from_error(
        Path::new("b.pdf"),
        &Error::Timeout("deadline exceeded".to_string()),
        3,
    ));
    let corpus = Corpus::new(vec![
        document("a.pdf", vec![ElementEntry::Empty(EmptyRecord {}), paragraph(&text, 1)]),
        failure,
    ]);

    let selection = ParagraphExtractor::new().select(&corpus);
    assert_eq!(selection.documents, 2);
    assert_eq!(selection.successful_documents, 1);
    assert_eq!(selection.total_paragraphs, 2);
    assert_eq!(selection.records, vec![TextRecord { text }]);
}

#[test]
fn test_corpus_order_is_kept() {
    let first = "first paragraph ".repeat(5);
    let second = "second paragraph ".repeat(5);
    let third = "third paragraph ".repeat(5);
    let corpus = Corpus::new(vec![
        document("a.pdf", vec![paragraph(&first, 0), paragraph(&second, 1)]),
        document("b.pdf", vec![paragraph(&third, 0)]),
    ]);

    let texts: Vec<String> = ParagraphExtractor::new()
        .select(&corpus)
        .records
        .into_iter()
        .map(|r| r.text)
        .collect();
    assert_eq!(
        texts,
        vec![
            first.trim().to_string(),
            second.trim().to_string(),
            third.trim().to_string()
        ]
    );
}

#[test]
fn test_output_is_idempotent() {
    let text = "A paragraph with \"quotes\" and a\nline break that is long enough.".to_string();
    let corpus = Corpus::new(vec![document("a.pdf", vec![paragraph(&text, 0)])]);
    let extractor = ParagraphExtractor::new().with_min_length(10);

    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    let first = extractor
        .clone()
        .with_output_dir(first_dir.path())
        .extract_at(&corpus, run_time())
        .unwrap();
    let second = extractor
        .with_output_dir(second_dir.path())
        .extract_at(&corpus, run_time())
        .unwrap();

    let a = std::fs::read(first.output_path.unwrap()).unwrap();
    let b = std::fs::read(second.output_path.unwrap()).unwrap();
    assert_eq!(a, b);

    // One compact line per record
    let raw = String::from_utf8(a).unwrap();
    assert_eq!(raw.lines().count(), 1);
    assert!(raw.ends_with('\n'));
    assert_eq!(first.file_size, raw.len() as u64);
}

#[test]
fn test_nothing_selected_writes_nothing() {
    let corpus = Corpus::new(vec![document("a.pdf", vec![paragraph("short", 0)])]);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("llm");

    let report = ParagraphExtractor::new()
        .with_output_dir(&out)
        .extract_at(&corpus, run_time())
        .unwrap();

    assert_eq!(report.extracted, 0);
    assert!(report.output_path.is_none());
    assert!(report.samples.is_empty());
    assert!(!out.exists());
}

#[test]
fn test_samples_are_previews() {
    let long = "x".repeat(200);
    let corpus = Corpus::new(vec![document("a.pdf", vec![paragraph(&long, 0)])]);
    let dir = TempDir::new().unwrap();

    let report = ParagraphExtractor::new()
        .with_output_dir(dir.path())
        .extract_at(&corpus, run_time())
        .unwrap();

    assert_eq!(report.samples.len(), 1);
    assert!(report.samples[0].ends_with("..."));
    assert_eq!(report.samples[0].chars().count(), 63);
}
