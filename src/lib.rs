//! # doclayout
//!
//! Batch PDF layout extraction through Google Cloud Document AI.
//!
//! PDFs are submitted to a layout processor, and the nested response
//! (pages, blocks, paragraphs, lines, tokens, tables, form fields) is
//! flattened into consistently shaped records that can be stored as JSON,
//! exported as CSV tables, filtered into a JSONL text dataset and browsed
//! in a local viewer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use doclayout::{Config, DatasetWriter};
//!
//! fn main() -> doclayout::Result<()> {
//!     // Load doclayout.local.toml or doclayout.toml
//!     let config = Config::discover(".")?;
//!
//!     // Process every PDF in the configured directory
//!     let corpus = doclayout::run_batch(&config)?;
//!
//!     // Write layout_dataset.json, dataset_summary.json and CSV tables
//!     DatasetWriter::new(&config.output_directory).write(&corpus)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed responses**: sparse service JSON decodes into checked `Option`s
//! - **Deterministic flattening**: fixed walk order, nothing dropped
//! - **Bounded parallelism**: rayon pool with ordered results and retries
//! - **Exports**: pretty JSON, summary statistics, CSV, JSONL paragraphs

pub mod batch;
pub mod config;
pub mod dataset;
pub mod detect;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod layout;
pub mod model;
pub mod service;

// Re-export commonly used types
pub use batch::{collect_pdfs, BatchEvent, BatchProcessor};
pub use config::Config;
pub use dataset::{Corpus, DatasetSummary, DatasetWriter};
pub use detect::{is_pdf_bytes, PdfCheck};
pub use error::{Error, FailureKind, Result};
pub use extract::{ExtractionReport, ParagraphExtractor};
pub use flatten::{flatten_document, FlattenOptions, Flattener, SegmentPolicy};
pub use layout::LayoutDocument;
pub use model::{
    CellRecord, CellRole, DocumentRecord, ElementEntry, ElementKind, FailedDocument,
    FormFieldRecord, PageSummary, ProcessedDocument, TableRecord, TextElementRecord,
};
pub use service::{DocumentAiClient, LayoutService, RetryPolicy};

use chrono::{DateTime, Utc};
use std::path::Path;

/// Process every PDF in the configured directory through Document AI.
///
/// Credentials are resolved from the configuration and environment. Per-file
/// failures become failure records; only setup errors are returned.
///
/// # Example
///
/// ```no_run
/// let config = doclayout::Config::discover(".")?;
/// let corpus = doclayout::run_batch(&config)?;
/// println!("{} documents", corpus.len());
/// # Ok::<(), doclayout::Error>(())
/// ```
pub fn run_batch(config: &Config) -> Result<Corpus> {
    let client = DocumentAiClient::from_config(config)?;
    let records = BatchProcessor::from_config(client, config).process_directory(&config.pdf_directory)?;
    Ok(Corpus::new(records))
}

/// Flatten a raw `:process` response body for the given source file.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use std::path::Path;
///
/// let body = r#"{"document": {"text": "Hi", "pages": [{}]}}"#;
/// let doc = doclayout::flatten_response(body, Path::new("a.pdf"), Utc::now()).unwrap();
/// assert_eq!(doc.page_count(), 1);
/// ```
pub fn flatten_response(
    body: &str,
    source: &Path,
    processed_at: DateTime<Utc>,
) -> Result<ProcessedDocument> {
    let document = LayoutDocument::from_response_json(body)?;
    Ok(flatten_document(&document, source, processed_at))
}

/// Load a dataset file written by [`DatasetWriter`].
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    Corpus::load(path)
}
