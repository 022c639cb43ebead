//! Analysis Backend
//!
//! The controller and the history view only talk to the outside world
//! through `AnalysisBackend`:
//! - `client` - HTTP client for the Flask analysis service
//! - `mock` - canned demo data, no network

pub mod client;
pub mod mock;


pub use client::{ApiClient, ApiConfig};
pub use mock::MockBackend;

use serde_json::Value;
use std::future::Future;

use crate::error::{ApiError, FetchError};
use crate::logic::analysis::UploadedFile;
use crate::logic::history::HistoryEntry;

pub trait AnalysisBackend: Send + Sync {
    /// Upload `file` and return the raw JSON verdict document
    fn analyze(&self, file: &UploadedFile) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Past scans, newest first as ordered by the backend
    fn history(&self) -> impl Future<Output = Result<Vec<HistoryEntry>, FetchError>> + Send;

    /// Backend reachable and answering
    fn health_check(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Backend chosen at startup
pub enum Backend {
    Http(ApiClient),
    Mock(MockBackend),
}

impl AnalysisBackend for Backend {
    async fn analyze(&self, file: &UploadedFile) -> Result<Value, ApiError> {
        match self {
            Backend::Http(client) => client.analyze(file).await,
            Backend::Mock(mock) => mock.analyze(file).await,
        }
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, FetchError> {
        match self {
            Backend::Http(client) => client.history().await,
            Backend::Mock(mock) => mock.history().await,
        }
    }

    async fn health_check(&self) -> Result<(), ApiError> {
        match self {
            Backend::Http(client) => client.health_check().await,
            Backend::Mock(mock) => mock.health_check().await,
        }
    }
}
