//! Paragraph extraction into a JSONL text dataset.
//!
//! Every paragraph of every successful document whose trimmed text is at
//! least `min_length` characters becomes one `{"text": "..."}` line, in
//! corpus order.

use crate::dataset::Corpus;
use crate::error::Result;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default minimum paragraph length in characters.
pub const DEFAULT_MIN_LENGTH: usize = 50;

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "llm_dataset";

/// Number of sample previews kept in a report.
const SAMPLE_COUNT: usize = 3;

/// Length of a sample preview in characters.
const PREVIEW_CHARS: usize = 60;

/// One JSONL line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub text: String,
}

/// Paragraphs selected from a corpus, before anything is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Records in the corpus
    pub documents: usize,
    /// Successful documents scanned
    pub successful_documents: usize,
    /// Paragraph entries scanned
    pub total_paragraphs: usize,
    /// Paragraphs that passed the length filter
    pub records: Vec<TextRecord>,
}

/// Outcome of an extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub documents: usize,
    pub successful_documents: usize,
    pub total_paragraphs: usize,
    pub extracted: usize,
    /// `None` when nothing passed the filter and no file was written
    pub output_path: Option<PathBuf>,
    /// Size of the written file in bytes
    pub file_size: u64,
    /// Previews of the first few records
    pub samples: Vec<String>,
}

impl ExtractionReport {
    /// File size in MiB.
    pub fn file_size_mb(&self) -> f64 {
        self.file_size as f64 / (1024.0 * 1024.0)
    }
}

/// Filters paragraphs by length and writes them as JSONL.
#[derive(Debug, Clone)]
pub struct ParagraphExtractor {
    min_length: usize,
    output_dir: PathBuf,
}

impl Default for ParagraphExtractor {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ParagraphExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum paragraph length in characters.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Minimum paragraph length in characters.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Select the paragraphs that pass the filter.
    pub fn select(&self, corpus: &Corpus) -> Selection {
        let mut selection = Selection {
            documents: corpus.len(),
            ..Default::default()
        };

        for doc in corpus.successful() {
            selection.successful_documents += 1;
            selection.total_paragraphs += doc.paragraphs.len();
            for paragraph in doc.paragraphs.iter().filter_map(|p| p.record()) {
                let text = paragraph.text.trim();
                if text.chars().count() >= self.min_length {
                    selection.records.push(TextRecord {
                        text: text.to_string(),
                    });
                }
            }
        }

        selection
    }

    /// Output path for a run started at `at`.
    pub fn output_path(&self, at: NaiveDateTime) -> PathBuf {
        self.output_dir
            .join(format!("llm_dataset_{}.jsonl", at.format("%Y%m%d_%H%M%S")))
    }

    /// Extract paragraphs and write them, timestamping the file with the local time.
    pub fn extract(&self, corpus: &Corpus) -> Result<ExtractionReport> {
        self.extract_at(corpus, Local::now().naive_local())
    }

    /// Extract paragraphs and write them, timestamping the file with `at`.
    ///
    /// An empty selection writes nothing and is not an error.
    pub fn extract_at(&self, corpus: &Corpus, at: NaiveDateTime) -> Result<ExtractionReport> {
        let selection = self.select(corpus);
        log::info!(
            "Selected {} of {} paragraphs (min length {})",
            selection.records.len(),
            selection.total_paragraphs,
            self.min_length
        );

        let mut report = ExtractionReport {
            documents: selection.documents,
            successful_documents: selection.successful_documents,
            total_paragraphs: selection.total_paragraphs,
            extracted: selection.records.len(),
            output_path: None,
            file_size: 0,
            samples: selection
                .records
                .iter()
                .take(SAMPLE_COUNT)
                .map(|r| preview(&r.text, PREVIEW_CHARS))
                .collect(),
        };

        if selection.records.is_empty() {
            log::warn!("No paragraphs matched; nothing written");
            return Ok(report);
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(at);
        write_jsonl(&path, &selection.records)?;
        report.file_size = std::fs::metadata(&path)?.len();
        log::info!("Saved {} records to {}", report.extracted, path.display());
        report.output_path = Some(path);
        Ok(report)
    }
}

/// Write records as compact JSON, one per line.
pub fn write_jsonl<P: AsRef<Path>>(path: P, records: &[TextRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// First `max_chars` characters of `text`, with `...` appended if cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 60), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("äöüß", 4), "äöüß");
        assert_eq!(preview("äöüß", 2), "äö...");
    }

    #[test]
    fn test_output_path_format() {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        let path = ParagraphExtractor::new().with_output_dir("out").output_path(at);
        assert_eq!(path, PathBuf::from("out/llm_dataset_20240309_070501.jsonl"));
    }

    #[test]
    fn test_write_jsonl_compact() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("x.jsonl");
        let records = vec![
            TextRecord {
                text: "first \"quoted\"".into(),
            },
            TextRecord {
                text: "zweite Zeile ü".into(),
            },
        ];
        write_jsonl(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "{\"text\":\"first \\\"quoted\\\"\"}\n{\"text\":\"zweite Zeile ü\"}\n"
        );
    }

    #[test]
    fn test_empty_corpus_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("llm");
        let report = ParagraphExtractor::new()
            .with_output_dir(&out)
            .extract(&Corpus::default())
            .unwrap();
        assert_eq!(report.extracted, 0);
        assert!(report.output_path.is_none());
        assert!(!out.exists());
    }
}
