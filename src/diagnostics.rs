//! Setup diagnostics: service-account key inspection and root-cause hints.

use crate::error::{Error, FailureKind, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Likely causes when the service returns zero pages for a non-empty file.
pub const ZERO_PAGE_HINTS: &[&str] = &[
    "the PDF is corrupted or unreadable",
    "the processor type does not support this document format",
    "the document is entirely images without extractable text",
];

/// Fields every service-account key is expected to carry.
const REQUIRED_KEY_FIELDS: &[&str] = &["type", "project_id", "private_key", "client_email", "client_id"];

/// Summary of a service-account key file, tolerant of missing fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInspection {
    pub path: PathBuf,
    pub key_type: Option<String>,
    pub project_id: Option<String>,
    pub client_email: Option<String>,
    pub client_id: Option<String>,
    /// Expected fields that are absent or not strings
    pub missing: Vec<&'static str>,
}

impl KeyInspection {
    /// Inspect a key file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::CredentialsNotFound(path.to_path_buf()));
        }
        Self::from_json(path, &std::fs::read_to_string(path)?)
    }

    /// Inspect key contents.
    pub fn from_json(path: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::InvalidCredentials(format!("not valid JSON: {}", e)))?;
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            path: path.into(),
            key_type: field("type"),
            project_id: field("project_id"),
            client_email: field("client_email"),
            client_id: field("client_id"),
            missing: REQUIRED_KEY_FIELDS
                .iter()
                .copied()
                .filter(|name| field(*name).is_none())
                .collect(),
        })
    }

    /// The key declares `"type": "service_account"`.
    pub fn is_service_account(&self) -> bool {
        self.key_type.as_deref() == Some("service_account")
    }

    /// The key belongs to a different project than the configured one.
    pub fn project_mismatch(&self, configured: &str) -> bool {
        self.project_id.as_deref() != Some(configured)
    }
}

/// Likely root cause of an error, if one is known.
pub fn hint_for(err: &Error) -> Option<&'static str> {
    let hint = match err.kind() {
        FailureKind::NotFound => {
            "The processor ID is probably incorrect or the processor does not exist in this location"
        }
        FailureKind::PermissionDenied => {
            "The service account probably lacks the Document AI API User role, \
             or the key belongs to a different project than project_id"
        }
        FailureKind::Authentication => "Authentication is probably not set up correctly",
        FailureKind::Configuration => {
            "Check the configuration file and credential paths (run `doclayout diagnose`)"
        }
        FailureKind::RateLimited => "Quota exceeded; lower max_concurrent_requests",
        FailureKind::Timeout => "Increase timeout_seconds or split large documents",
        FailureKind::InvalidInput => {
            "The service rejected the document; run `doclayout check-pdf` on it"
        }
        _ => return hint_from_message(&err.to_string()),
    };
    Some(hint)
}

fn hint_from_message(message: &str) -> Option<&'static str> {
    let message = message.to_lowercase();
    if message.contains("not found") {
        Some("The processor ID is probably incorrect or does not exist")
    } else if message.contains("permission") || message.contains("access") {
        Some("The service account probably lacks the Document AI API User role")
    } else if message.contains("authentication") {
        Some("Authentication is probably not set up correctly")
    } else {
        None
    }
}
