//! Dataset persistence: the JSON corpus, summary statistics and CSV tables.
//!
//! # Example
//!
//! ```no_run
//! use doclayout::dataset::{Corpus, DatasetWriter};
//!
//! fn main() -> doclayout::Result<()> {
//!     let corpus = Corpus::load("output/layout_dataset.json")?;
//!     let written = DatasetWriter::new("export").write(&corpus)?;
//!     println!("wrote {} files", written.len());
//!     Ok(())
//! }
//! ```

mod export;
mod summary;

pub use export::{BlockCsvRow, DocumentCsvRow, TableCsvRow};
pub use summary::DatasetSummary;

use crate::error::{Error, Result};
use crate::model::{DocumentRecord, ProcessedDocument};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Full corpus file name.
pub const DATASET_FILE: &str = "layout_dataset.json";
/// Summary statistics file name.
pub const SUMMARY_FILE: &str = "dataset_summary.json";
/// Per-document CSV file name.
pub const DOCUMENTS_CSV: &str = "documents_summary.csv";
/// Per-block CSV file name.
pub const BLOCKS_CSV: &str = "blocks.csv";
/// Per-table CSV file name.
pub const TABLES_CSV: &str = "tables.csv";

/// Ordered document records of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    records: Vec<DocumentRecord>,
}

impl Corpus {
    /// Create a corpus from records, keeping their order.
    pub fn new(records: Vec<DocumentRecord>) -> Self {
        Self { records }
    }

    /// Read a corpus from a dataset file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// All records in order.
    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    /// Successfully processed documents, in order.
    pub fn successful(&self) -> impl Iterator<Item = &ProcessedDocument> {
        self.records.iter().filter_map(DocumentRecord::as_success)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the corpus has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Summary statistics.
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_records(&self.records)
    }

    /// Consume the corpus, returning its records.
    pub fn into_records(self) -> Vec<DocumentRecord> {
        self.records
    }
}

impl From<Vec<DocumentRecord>> for Corpus {
    fn from(records: Vec<DocumentRecord>) -> Self {
        Self::new(records)
    }
}

/// Writes a corpus and its derived files into an output directory.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    output_dir: PathBuf,
    csv: bool,
}

impl DatasetWriter {
    /// Create a writer for the given directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            csv: true,
        }
    }

    /// Enable or disable the CSV exports.
    pub fn with_csv(mut self, enabled: bool) -> Self {
        self.csv = enabled;
        self
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the dataset, summary and CSV tables; returns the files written.
    ///
    /// The directory is created if missing. A CSV file is only written when
    /// it has at least one row.
    pub fn write(&self, corpus: &Corpus) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut written = Vec::new();

        let dataset_path = self.output_dir.join(DATASET_FILE);
        write_json(&dataset_path, corpus)?;
        log::info!("Saved dataset to {}", dataset_path.display());
        written.push(dataset_path);

        let summary_path = self.output_dir.join(SUMMARY_FILE);
        write_json(&summary_path, &corpus.summary())?;
        log::info!("Saved summary statistics to {}", summary_path.display());
        written.push(summary_path);

        if self.csv {
            written.extend(export::write_tables(&self.output_dir, corpus)?);
        }

        Ok(written)
    }
}

/// File name used for a single-document export of `source`.
pub fn single_document_file_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("single_doc_result_{}.json", name)
}

/// Write one document record as pretty JSON.
pub fn write_document<P: AsRef<Path>>(record: &DocumentRecord, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_json(path, record)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FailedDocument;
    use chrono::Utc;
    use tempfile::TempDir;

    fn success(name: &str) -> DocumentRecord {
        DocumentRecord::Success(ProcessedDocument::new(
            Path::new(&format!("PDFs/{}", name)),
            Utc::now(),
        ))
    }

    #[test]
    fn test_corpus_is_json_array() {
        let corpus = Corpus::new(vec![success("a.pdf")]);
        let json = serde_json::to_value(&corpus).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["file_name"], "a.pdf");
    }

    #[test]
    fn test_load_missing_dataset() {
        let err = Corpus::load("/nonexistent/layout_dataset.json").unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }

    #[test]
    fn test_write_and_load() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("output");
        let failed = DocumentRecord::Failed(FailedDocument {
            file_path: "PDFs/bad.pdf".into(),
            error: "boom".into(),
            error_kind: crate::error::FailureKind::Transport,
            attempts: 3,
        });
        let corpus = Corpus::new(vec![success("a.pdf"), failed]);

        let written = DatasetWriter::new(&out).write(&corpus).unwrap();
        assert!(written.contains(&out.join(DATASET_FILE)));
        assert!(written.contains(&out.join(SUMMARY_FILE)));
        assert!(written.contains(&out.join(DOCUMENTS_CSV)));
        // no blocks or tables: no row files
        assert!(!out.join(BLOCKS_CSV).exists());
        assert!(!out.join(TABLES_CSV).exists());

        let loaded = Corpus::load(out.join(DATASET_FILE)).unwrap();
        assert_eq!(loaded, corpus);
    }

    #[test]
    fn test_non_ascii_preserved() {
        let dir = TempDir::new().unwrap();
        let corpus = Corpus::new(vec![success("résumé.pdf")]);
        DatasetWriter::new(dir.path()).with_csv(false).write(&corpus).unwrap();

        let text = std::fs::read_to_string(dir.path().join(DATASET_FILE)).unwrap();
        assert!(text.contains("résumé.pdf"));
        assert!(!dir.path().join(DOCUMENTS_CSV).exists());
    }

    #[test]
    fn test_single_document_file_name() {
        assert_eq!(
            single_document_file_name(Path::new("PDFs/report.pdf")),
            "single_doc_result_report.pdf.json"
        );
    }

    #[test]
    fn test_write_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("one.json");
        write_document(&success("one.pdf"), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["status"], "success");
    }
}
