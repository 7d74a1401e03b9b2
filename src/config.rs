//! Run configuration.
//!
//! A [`Config`] is loaded once at process start (from a TOML file) and then
//! passed by reference into the service client, the batch dispatcher and the
//! dataset writer. Nothing re-reads configuration after that point.

use crate::error::{Error, Result};
use crate::flatten::FlattenOptions;
use crate::service::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file names searched by [`Config::discover`], in priority order.
pub const CONFIG_CANDIDATES: &[&str] = &["doclayout.local.toml", "doclayout.toml"];

/// Settings for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google Cloud project ID
    pub project_id: String,

    /// Processor location (e.g. "us" or "eu")
    #[serde(default = "default_location")]
    pub location: String,

    /// Document AI processor ID
    pub processor_id: String,

    /// Path to a service-account JSON key
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Pre-minted OAuth access token, used when no key file is available
    #[serde(default)]
    pub access_token: Option<String>,

    /// Directory containing the PDFs to process
    #[serde(default = "default_pdf_directory")]
    pub pdf_directory: PathBuf,

    /// Directory where dataset files are written
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// Upper bound on in-flight service requests
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Submission attempts per file, including the first one
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Flattening behavior
    #[serde(default)]
    pub flatten: FlattenOptions,

    /// File this configuration was loaded from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

fn default_location() -> String {
    "us".to_string()
}

fn default_pdf_directory() -> PathBuf {
    PathBuf::from("PDFs")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("output")
}

fn default_max_concurrent_requests() -> usize {
    5
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Config {
    /// Create a configuration for the given processor with default settings.
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        processor_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
            processor_id: processor_id.into(),
            credentials_path: None,
            access_token: None,
            pdf_directory: default_pdf_directory(),
            output_directory: default_output_directory(),
            max_concurrent_requests: default_max_concurrent_requests(),
            retry_attempts: default_retry_attempts(),
            timeout_seconds: default_timeout_seconds(),
            flatten: FlattenOptions::default(),
            source: None,
        }
    }

    /// Set the service-account key path.
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Set a pre-minted access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the input PDF directory.
    pub fn with_pdf_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pdf_directory = dir.into();
        self
    }

    /// Set the output directory.
    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    /// Set the concurrency limit.
    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = limit;
        self
    }

    /// Set the number of submission attempts per file.
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set flattening options.
    pub fn with_flatten_options(mut self, options: FlattenOptions) -> Self {
        self.flatten = options;
        self
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigNotFound(vec![path.to_path_buf()]));
        }
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load the first configuration file from [`CONFIG_CANDIDATES`] found in `dir`.
    ///
    /// `doclayout.local.toml` takes precedence over `doclayout.toml`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let candidates: Vec<PathBuf> = CONFIG_CANDIDATES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .collect();

        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => {
                log::info!("Using configuration from {}", path.display());
                Self::load(path)
            }
            None => Err(Error::ConfigNotFound(candidates)),
        }
    }

    /// Check that required values are present and in range.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("project_id", &self.project_id),
            ("location", &self.location),
            ("processor_id", &self.processor_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", name)));
            }
        }

        if self.max_concurrent_requests == 0 {
            return Err(Error::Config(
                "max_concurrent_requests must be at least 1".into(),
            ));
        }
        if self.retry_attempts == 0 {
            return Err(Error::Config("retry_attempts must be at least 1".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::Config("timeout_seconds must be at least 1".into()));
        }

        if let Some(ref path) = self.credentials_path {
            if !path.exists() {
                return Err(Error::CredentialsNotFound(path.clone()));
            }
        }

        Ok(())
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Retry policy derived from `retry_attempts`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts)
    }

    /// Regional API endpoint, e.g. `https://us-documentai.googleapis.com`.
    pub fn endpoint(&self) -> String {
        format!("https://{}-documentai.googleapis.com", self.location)
    }

    /// Parent resource name of the project location.
    pub fn location_path(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.location)
    }

    /// Full processor resource name.
    pub fn processor_name(&self) -> String {
        format!("{}/processors/{}", self.location_path(), self.processor_id)
    }
}
