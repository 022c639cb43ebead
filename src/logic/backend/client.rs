//! Analysis API Client
//!
//! HTTP client for communicating with the botnet analysis backend.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::AnalysisBackend;
use crate::error::{ApiError, FetchError};
use crate::logic::analysis::UploadedFile;
use crate::logic::history::HistoryEntry;

/// Backend connection configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub server_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        use crate::constants;

        Self {
            server_url: constants::get_api_url(),
            timeout_seconds: constants::get_api_timeout(),
        }
    }
}

/// Analysis API client
pub struct ApiClient {
    config: ApiConfig,
    http_client: reqwest::Client,
}

/// Error body of the Flask routes: `{"error": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl ApiClient {
    /// Create new API client
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http_client })
    }

    pub fn server_url(&self) -> &str {
        &self.config.server_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.config.server_url.trim_end_matches('/'), path)
    }

    fn send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Network(format!("request timed out after {}s", self.config.timeout_seconds))
        } else {
            ApiError::Network(e.to_string())
        }
    }

    /// Read a 2xx body as JSON, or turn the response into an error
    async fn read_json(&self, response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            log::error!("Backend request failed ({}): {}", status.as_u16(), message);
            return Err(ApiError::Server { status: status.as_u16(), message });
        }

        let body = response.bytes().await.map_err(|e| self.send_error(e))?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

impl AnalysisBackend for ApiClient {
    /// Upload a capture file for analysis
    async fn analyze(&self, file: &UploadedFile) -> Result<Value, ApiError> {
        let url = self.endpoint("/analyze");

        let part = Part::bytes(file.content().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.media_type().mime())
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let form = Form::new().part("file", part);

        log::info!("Uploading {} ({} bytes) to {}", file.name(), file.size(), url);

        let response = self.http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.read_json(response).await
    }

    /// Fetch scan history
    async fn history(&self) -> Result<Vec<HistoryEntry>, FetchError> {
        let url = self.endpoint("/history");

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        match self.read_json(response).await? {
            Value::Array(items) => {
                let total = items.len();
                let entries: Vec<HistoryEntry> = items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect();
                if entries.len() < total {
                    log::warn!("Skipped {} unreadable history records", total - entries.len());
                }
                Ok(entries)
            }
            other => Err(ApiError::Parse(format!(
                "expected a JSON array of scans, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// The backend has no health route; a readable history answers for it
    async fn health_check(&self) -> Result<(), ApiError> {
        let url = self.endpoint("/history");

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::Server {
                status: response.status().as_u16(),
                message: format!("HTTP {}", response.status().as_u16()),
            })
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
