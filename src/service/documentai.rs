//! Document AI REST client.

use super::auth::{self, TokenProvider};
use super::LayoutService;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::layout::LayoutDocument;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Processor metadata returned by the management endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorInfo {
    /// Full resource name
    #[serde(default)]
    pub name: String,

    /// Human-readable name
    #[serde(default)]
    pub display_name: String,

    /// Processor type, e.g. `LAYOUT_PARSER_PROCESSOR` or `OCR_PROCESSOR`
    #[serde(default, rename = "type")]
    pub processor_type: String,

    /// Lifecycle state, e.g. `ENABLED`
    #[serde(default)]
    pub state: String,
}

impl ProcessorInfo {
    /// Last segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Check if the processor accepts requests.
    pub fn is_enabled(&self) -> bool {
        self.state == "ENABLED"
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest<'a> {
    raw_document: RawDocument<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument<'a> {
    content: String,
    mime_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessorList {
    #[serde(default)]
    processors: Vec<ProcessorInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Client bound to one Document AI processor.
pub struct DocumentAiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    location_path: String,
    processor_name: String,
    tokens: Arc<dyn TokenProvider>,
}

impl DocumentAiClient {
    /// Create a client with an explicit token provider.
    pub fn new(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint(),
            location_path: config.location_path(),
            processor_name: config.processor_name(),
            tokens,
        })
    }

    /// Create a client, resolving credentials from the configuration and environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tokens = auth::token_provider(config)?;
        log::info!("Authenticating with {}", tokens.describe());
        Self::new(config, tokens)
    }

    /// Override the API base URL (for emulators and tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Full processor resource name.
    pub fn processor_name(&self) -> &str {
        &self.processor_name
    }

    /// Look up the configured processor.
    pub fn get_processor(&self) -> Result<ProcessorInfo> {
        let url = format!("{}/v1/{}", self.endpoint, self.processor_name);
        let body = self.send(self.http.get(&url))?;
        serde_json::from_str(&body).map_err(|e| Error::Decode(format!("processor: {}", e)))
    }

    /// List all processors in the configured project location.
    pub fn list_processors(&self) -> Result<Vec<ProcessorInfo>> {
        let url = format!("{}/v1/{}/processors", self.endpoint, self.location_path);
        let mut processors = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(&url);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let body = self.send(request)?;
            let page: ProcessorList = serde_json::from_str(&body)
                .map_err(|e| Error::Decode(format!("processor list: {}", e)))?;
            processors.extend(page.processors);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(processors)
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<String> {
        let token = self.tokens.token()?;
        let response = request.bearer_auth(token).send()?;
        let status = response.status();
        let body = response.text()?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(service_error(status.as_u16(), &body))
        }
    }
}

impl LayoutService for DocumentAiClient {
    fn process(&self, content: &[u8], mime_type: &str) -> Result<LayoutDocument> {
        if content.is_empty() {
            return Err(Error::Other("refusing to submit empty content".into()));
        }

        let url = format!("{}/v1/{}:process", self.endpoint, self.processor_name);
        let request = ProcessRequest {
            raw_document: RawDocument {
                content: BASE64.encode(content),
                mime_type,
            },
        };

        log::debug!("POST {} ({} bytes)", url, content.len());
        let body = self.send(self.http.post(&url).json(&request))?;
        LayoutDocument::from_response_json(&body)
    }
}

/// Build a service error from a non-success response.
///
/// Google APIs wrap errors as `{"error": {"code", "message", "status"}}`;
/// anything else is kept verbatim (truncated).
fn service_error(status: u16, body: &str) -> Error {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => Error::Service {
            status,
            code: if envelope.error.status.is_empty() {
                "UNKNOWN".to_string()
            } else {
                envelope.error.status
            },
            message: envelope.error.message,
        },
        Err(_) => Error::Service {
            status,
            code: "UNKNOWN".to_string(),
            message: body.trim().chars().take(500).collect(),
        },
    }
}
