//! Flat dataset records.
//!
//! This module defines the output side of the pipeline: flat,
//! consistently-shaped records produced from one layout response and
//! written unchanged to JSON, CSV and JSONL. Records are immutable once
//! created.

mod document;
mod element;
mod form;
mod page;
mod table;

pub use document::{DocumentInfo, DocumentRecord, FailedDocument, ProcessedDocument};
pub use element::{ElementEntry, ElementKind, EmptyRecord, Point, TextElementRecord};
pub use form::FormFieldRecord;
pub use page::PageSummary;
pub use table::{CellRecord, CellRole, TableRecord};
