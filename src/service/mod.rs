//! Layout extraction service boundary.
//!
//! [`LayoutService`] is the seam between the batch dispatcher and the remote
//! processor. [`DocumentAiClient`] implements it over the Document AI REST
//! API; tests substitute an in-memory implementation.
//!
//! # Example
//!
//! ```no_run
//! use doclayout::service::{DocumentAiClient, LayoutService, PDF_MIME_TYPE};
//! use doclayout::Config;
//!
//! fn main() -> doclayout::Result<()> {
//!     let config = Config::discover(".")?;
//!     let client = DocumentAiClient::from_config(&config)?;
//!     let bytes = std::fs::read("PDFs/report.pdf")?;
//!     let document = client.process(&bytes, PDF_MIME_TYPE)?;
//!     println!("{} pages", document.page_count());
//!     Ok(())
//! }
//! ```

pub mod auth;
mod documentai;
mod retry;

pub use auth::{ServiceAccountKey, ServiceAccountToken, StaticToken, TokenProvider};
pub use documentai::{DocumentAiClient, ProcessorInfo};
pub use retry::RetryPolicy;

use crate::error::Result;
use crate::layout::LayoutDocument;

/// MIME type submitted for PDF input.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Largest payload accepted by synchronous processing (20 MiB).
///
/// Larger files are still submitted, with a warning.
pub const SYNC_SIZE_LIMIT: u64 = 20 * 1024 * 1024;

/// A remote processor that turns document bytes into a layout result.
pub trait LayoutService: Send + Sync {
    /// Process one document.
    ///
    /// `content` must be non-empty.
    fn process(&self, content: &[u8], mime_type: &str) -> Result<LayoutDocument>;
}

impl<S: LayoutService + ?Sized> LayoutService for std::sync::Arc<S> {
    fn process(&self, content: &[u8], mime_type: &str) -> Result<LayoutDocument> {
        (**self).process(content, mime_type)
    }
}
