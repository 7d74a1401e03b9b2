//! Form field records.

use serde::{Deserialize, Serialize};

/// A flattened key/value form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFieldRecord {
    /// 1-based page number
    pub page_number: u32,

    /// 0-based ordinal of the field within its page
    pub field_number: usize,

    /// Trimmed key text
    pub field_name: String,

    /// Trimmed value text
    pub field_value: String,
}

impl FormFieldRecord {
    /// Check if both name and value are empty.
    pub fn is_blank(&self) -> bool {
        self.field_name.is_empty() && self.field_value.is_empty()
    }
}
