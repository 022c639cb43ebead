//! Error handling

use thiserror::Error;

/// Transport-level errors from the analysis backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Endpoint unreachable, connection reset or request timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Body was not the JSON shape we expect
    #[error("Parse error: {0}")]
    Parse(String),
}

/// History loads fail with the same transport errors as uploads
pub type FetchError = ApiError;

/// Analysis session errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Operation not legal in the current session state
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Session was reset before the backend answered
    #[error("Analysis cancelled by reset")]
    Cancelled,
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => SessionError::Network(msg),
            ApiError::Server { .. } => SessionError::Network(err.to_string()),
            ApiError::Parse(msg) => SessionError::MalformedResponse(msg),
        }
    }
}

/// Rejected file selection
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No file name given")]
    EmptyName,

    #[error("Unsupported file type '{0}' (expected .csv or .json)")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes (max {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("Cannot read file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_maps_to_network() {
        let err = ApiError::Server { status: 500, message: "HTTP 500".to_string() };
        let mapped = SessionError::from(err);

        assert_eq!(mapped, SessionError::Network("HTTP 500".to_string()));
        assert_eq!(mapped.to_string(), "Network error: HTTP 500");
    }

    #[test]
    fn test_parse_error_maps_to_malformed() {
        let mapped = SessionError::from(ApiError::Parse("expected value".to_string()));
        assert!(matches!(mapped, SessionError::MalformedResponse(_)));
    }
}
