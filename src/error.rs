//! Error types for doclayout.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for doclayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while configuring, calling the layout service,
/// or reading and writing datasets.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No configuration file was found in any searched location.
    #[error("No configuration found (searched: {})", format_paths(.0))]
    ConfigNotFound(Vec<PathBuf>),

    /// The configuration file could not be parsed.
    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration value is missing or out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The configured service-account key file does not exist.
    #[error("Service account file not found: {}", .0.display())]
    CredentialsNotFound(PathBuf),

    /// The service-account key is unreadable or not a service-account key.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// An input file (PDF or dataset) does not exist.
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// An input file exists but is empty.
    #[error("File is empty: {}", .0.display())]
    EmptyInput(PathBuf),

    /// Network-level failure reaching the service.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The service answered with a non-success HTTP status.
    #[error("Service error {status} ({code}): {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Canonical error code reported by the service (e.g. "PERMISSION_DENIED")
        code: String,
        /// Error message reported by the service
        message: String,
    },

    /// The service response could not be decoded.
    #[error("Could not decode service response: {0}")]
    Decode(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Failure category of this error, as recorded in failed document records.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Io(_) | Error::Csv(_) => FailureKind::Io,
            Error::Json(_) | Error::Decode(_) => FailureKind::Decode,
            Error::ConfigNotFound(_)
            | Error::ConfigParse(_)
            | Error::Config(_)
            | Error::CredentialsNotFound(_) => FailureKind::Configuration,
            Error::InvalidCredentials(_) => FailureKind::Authentication,
            Error::InputNotFound(_) => FailureKind::InputNotFound,
            Error::EmptyInput(_) => FailureKind::InvalidInput,
            Error::Transport(_) => FailureKind::Transport,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::Service { status, .. } => match *status {
                400 => FailureKind::InvalidInput,
                401 => FailureKind::Authentication,
                403 => FailureKind::PermissionDenied,
                404 => FailureKind::NotFound,
                429 => FailureKind::RateLimited,
                _ => FailureKind::Service,
            },
            Error::Other(_) => FailureKind::Service,
        }
    }

    /// Whether a retry of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout(_) | Error::Transport(_) => true,
            Error::Service { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Category of a per-file failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing or invalid settings
    Configuration,
    /// Input file does not exist
    InputNotFound,
    /// Input rejected before or by the service
    InvalidInput,
    /// Connection-level failure
    Transport,
    /// Request exceeded the timeout
    Timeout,
    /// Credentials rejected
    Authentication,
    /// Caller lacks permission on the processor
    PermissionDenied,
    /// Processor or resource does not exist
    NotFound,
    /// Quota exceeded
    RateLimited,
    /// Any other service-side failure
    Service,
    /// Response could not be decoded
    Decode,
    /// Local filesystem failure
    Io,
    /// Not recorded (datasets written without a failure category)
    #[default]
    Unknown,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::Configuration => "configuration",
            FailureKind::InputNotFound => "input not found",
            FailureKind::InvalidInput => "invalid input",
            FailureKind::Transport => "transport",
            FailureKind::Timeout => "timeout",
            FailureKind::Authentication => "authentication",
            FailureKind::PermissionDenied => "permission denied",
            FailureKind::NotFound => "not found",
            FailureKind::RateLimited => "rate limited",
            FailureKind::Service => "service",
            FailureKind::Decode => "decode",
            FailureKind::Io => "io",
            FailureKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
