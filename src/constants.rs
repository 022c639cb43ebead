//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default analysis backend, only edit this file.

/// Default analysis backend URL
///
/// This is the fallback URL when no environment variable is set.
/// The Flask backend listens on port 5000 in development.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default upload/history request timeout (seconds)
pub const DEFAULT_API_TIMEOUT: u64 = 30;

/// Largest file the backend accepts (50 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Staggered reveal delays (ms) for signature, host-based, behavioral
pub const STAGGERED_PHASE_DELAYS_MS: [u64; 3] = [1000, 1000, 1500];

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Botnet Scan Client";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get analysis backend URL from environment or use default
pub fn get_api_url() -> String {
    std::env::var("BOTNET_API_URL")
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Get request timeout from environment or use default
pub fn get_api_timeout() -> u64 {
    std::env::var("BOTNET_API_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_API_TIMEOUT)
}

/// Check if phases should be revealed with the staggered delays
pub fn is_staggered_reveal() -> bool {
    std::env::var("BOTNET_PHASE_REVEAL")
        .map(|s| s.eq_ignore_ascii_case("staggered"))
        .unwrap_or(false)
}

/// Check if the canned mock backend should be used
pub fn is_mock_backend() -> bool {
    std::env::var("BOTNET_USE_MOCK")
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(false)
}
