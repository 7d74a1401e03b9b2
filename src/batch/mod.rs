//! Bounded parallel dispatch of files to a [`LayoutService`].
//!
//! Files are processed on a dedicated rayon pool sized by the concurrency
//! limit. Every input occupies exactly one result slot, in input order, and
//! a failure only ever affects its own slot.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::flatten::{FlattenOptions, Flattener};
use crate::model::{DocumentRecord, FailedDocument};
use crate::service::{LayoutService, RetryPolicy, PDF_MIME_TYPE, SYNC_SIZE_LIMIT};
use chrono::Utc;
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Characters of document text included in the zero-page warning.
const EMPTY_PREVIEW_CHARS: usize = 200;

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// A file was picked up by a worker
    Started {
        /// Slot index of the file
        index: usize,
        /// Path of the file
        path: PathBuf,
    },
    /// An attempt failed with a retryable error and will be repeated
    Retrying {
        /// Slot index of the file
        index: usize,
        /// Path of the file
        path: PathBuf,
        /// The attempt that failed (1-based)
        attempt: u32,
        /// Error message of the failed attempt
        error: String,
        /// Delay before the next attempt
        delay: Duration,
    },
    /// A file reached its final outcome
    Finished {
        /// Slot index of the file
        index: usize,
        /// Path of the file
        path: PathBuf,
        /// Whether the outcome is a success record
        success: bool,
    },
}

/// Processes files through a layout service and flattens the results.
pub struct BatchProcessor<S> {
    service: S,
    flattener: Flattener,
    retry: RetryPolicy,
    concurrency: usize,
    events: Option<Sender<BatchEvent>>,
}

impl<S: LayoutService> BatchProcessor<S> {
    /// Create a processor with default settings.
    pub fn new(service: S) -> Self {
        Self {
            service,
            flattener: Flattener::default(),
            retry: RetryPolicy::default(),
            concurrency: 5,
            events: None,
        }
    }

    /// Create a processor using the limits and options of a configuration.
    pub fn from_config(service: S, config: &Config) -> Self {
        Self::new(service)
            .with_retry_policy(config.retry_policy())
            .with_concurrency(config.max_concurrent_requests)
            .with_flatten_options(config.flatten)
    }

    /// Set the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Set the maximum number of files in flight (minimum 1).
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Set flattening options.
    pub fn with_flatten_options(mut self, options: FlattenOptions) -> Self {
        self.flattener = Flattener::new(options);
        self
    }

    /// Send progress events to the given channel.
    pub fn with_events(mut self, sender: Sender<BatchEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// The underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Process a single file. Never fails: errors become a failure record.
    pub fn process_file(&self, path: &Path) -> DocumentRecord {
        self.process_slot(0, path)
    }

    /// Process files in parallel; the result has one record per path, in order.
    pub fn process_paths(&self, paths: &[PathBuf]) -> Result<Vec<DocumentRecord>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .thread_name(|i| format!("doclayout-worker-{}", i))
            .build()
            .map_err(|e| Error::Other(format!("could not start worker pool: {}", e)))?;

        log::info!(
            "Processing {} files with up to {} concurrent requests",
            paths.len(),
            self.concurrency
        );

        let records = pool.install(|| {
            paths
                .par_iter()
                .enumerate()
                .map(|(index, path)| self.process_slot(index, path))
                .collect::<Vec<_>>()
        });

        let failed = records.iter().filter(|r| !r.is_success()).count();
        log::info!(
            "Batch complete: {} succeeded, {} failed",
            records.len() - failed,
            failed
        );
        Ok(records)
    }

    /// Process every PDF in a directory, in sorted path order.
    pub fn process_directory<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<DocumentRecord>> {
        let paths = collect_pdfs(dir)?;
        self.process_paths(&paths)
    }

    fn process_slot(&self, index: usize, path: &Path) -> DocumentRecord {
        self.emit(|| BatchEvent::Started {
            index,
            path: path.to_path_buf(),
        });

        let record = match self.submit(index, path) {
            Ok(record) => record,
            Err((err, attempts)) => {
                log::warn!("{}: {}", path.display(), err);
                DocumentRecord::Failed(FailedDocument::from_error(path, &err, attempts))
            }
        };

        self.emit(|| BatchEvent::Finished {
            index,
            path: path.to_path_buf(),
            success: record.is_success(),
        });
        record
    }

    fn submit(&self, index: usize, path: &Path) -> std::result::Result<DocumentRecord, (Error, u32)> {
        let bytes = read_input(path).map_err(|e| (e, 0))?;
        if bytes.len() as u64 > SYNC_SIZE_LIMIT {
            log::warn!(
                "{} is {:.1} MiB, above the {} MiB synchronous limit; the service may reject it",
                path.display(),
                bytes.len() as f64 / (1024.0 * 1024.0),
                SYNC_SIZE_LIMIT / (1024 * 1024)
            );
        }

        log::debug!("Submitting {} ({} bytes)", path.display(), bytes.len());
        let (outcome, attempts) = self.retry.run(
            |_| self.service.process(&bytes, PDF_MIME_TYPE),
            |attempt, err, delay| {
                log::warn!(
                    "{}: attempt {} failed ({}), retrying in {:?}",
                    path.display(),
                    attempt,
                    err,
                    delay
                );
                self.emit(|| BatchEvent::Retrying {
                    index,
                    path: path.to_path_buf(),
                    attempt,
                    error: err.to_string(),
                    delay,
                });
            },
        );
        let document = outcome.map_err(|e| (e, attempts))?;

        if document.is_empty() {
            let preview: String = document.text.chars().take(EMPTY_PREVIEW_CHARS).collect();
            log::warn!(
                "{}: service returned 0 pages (text length {}): {:?}",
                path.display(),
                document.text_length(),
                preview
            );
        }

        let processed = self.flattener.flatten(&document, path, Utc::now());
        log::info!(
            "{}: {} pages, {} blocks",
            path.display(),
            processed.page_count(),
            processed.blocks.len()
        );
        Ok(DocumentRecord::Success(processed))
    }

    fn emit<F: FnOnce() -> BatchEvent>(&self, event: F) {
        if let Some(sender) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = sender.send(event());
        }
    }
}

/// Read an input file, mapping a missing or empty file to its own error.
fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(Error::EmptyInput(path.to_path_buf()));
    }
    Ok(bytes)
}

/// List the PDF files of a directory (extension match is case-insensitive),
/// sorted by path.
pub fn collect_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::InputNotFound(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_pdf_path(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutDocument;
    use tempfile::TempDir;

    struct EchoService;

    impl LayoutService for EchoService {
        fn process(&self, content: &[u8], _mime_type: &str) -> Result<LayoutDocument> {
            Ok(LayoutDocument::new(
                String::from_utf8_lossy(content).into_owned(),
                Vec::new(),
            ))
        }
    }

    #[test]
    fn test_collect_pdfs_sorted_case_insensitive() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.Pdf"] {
            std::fs::write(dir.path().join(name), b"%PDF-1.4").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let names: Vec<String> = collect_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf", "c.Pdf"]);
    }

    #[test]
    fn test_collect_pdfs_missing_dir() {
        let err = collect_pdfs("/nonexistent/pdfs").unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }

    #[test]
    fn test_missing_file_is_failure_record() {
        let processor = BatchProcessor::new(EchoService);
        let record = processor.process_file(Path::new("/nonexistent/x.pdf"));
        let failure = record.as_failure().unwrap();
        assert_eq!(failure.attempts, 0);
        assert_eq!(failure.error_kind, crate::error::FailureKind::InputNotFound);
    }

    #[test]
    fn test_empty_file_is_failure_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, b"").unwrap();

        let record = BatchProcessor::new(EchoService).process_file(&path);
        assert_eq!(
            record.as_failure().unwrap().error_kind,
            crate::error::FailureKind::InvalidInput
        );
    }

    #[test]
    fn test_zero_pages_is_success() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.pdf");
        std::fs::write(&path, b"%PDF-1.4 nothing here").unwrap();

        let record = BatchProcessor::new(EchoService).process_file(&path);
        let doc = record.as_success().unwrap();
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.document_info.text_length, 21);
    }

    #[test]
    fn test_concurrency_minimum() {
        let processor = BatchProcessor::new(EchoService).with_concurrency(0);
        assert_eq!(processor.concurrency, 1);
    }
}
