//! Mock Backend
//!
//! Demo data for running the dashboard without the Flask service.
//! Responses use the same wire shape as the real backend so they flow
//! through the normal decoding path.

use serde_json::{json, Value};
use std::time::Duration;

use super::AnalysisBackend;
use crate::error::{ApiError, FetchError};
use crate::logic::analysis::UploadedFile;
use crate::logic::history::HistoryEntry;

pub struct MockBackend {
    latency: Duration,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl MockBackend {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Canned analysis of a benign capture
    pub fn analysis_fixture(file: &UploadedFile) -> Value {
        json!({
            "verdict": "CLEAN",
            "risk_score": 12,
            "signature_based": {
                "threats": [],
                "threat_count": 0,
                "status": "CLEAN",
                "message": "No known malicious signatures detected"
            },
            "host_based": {
                "suspicious_processes": [
                    {"name": "explorer.exe", "cpu": 2.1, "memory": 156, "connections": 2},
                    {"name": "svchost.exe", "cpu": 0.8, "memory": 45, "connections": 1}
                ],
                "suspicious_count": 2,
                "status": "NORMAL"
            },
            "behavior_based": {
                "prediction": "CLEAN",
                "confidence": 18,
                "method": "rule_based"
            },
            "gemini_analysis": {
                "verdict": "CLEAN",
                "risk_level": "LOW",
                "explanation": "Network traffic patterns are consistent with normal user activity. No indicators of compromise detected.",
                "recommendations": [
                    "Continue regular monitoring and scheduled scans",
                    "Keep signature databases updated"
                ],
                "source": "rule_based"
            },
            "file_info": {
                "filename": file.name(),
                "size": file.size(),
                "type": file.media_type()
            }
        })
    }

    /// Canned scan history, newest first
    pub fn history_fixture() -> Value {
        let scan = |date: &str, filename: &str, verdict: &str, risk: &str, score: u8| {
            json!({
                "timestamp": format!("{}T10:00:00", date),
                "file_info": {"filename": filename, "size": 0},
                "verdict": verdict,
                "risk_score": score,
                "gemini_analysis": {"risk_level": risk}
            })
        };

        json!([
            scan("2025-01-08", "system_log_20250108.csv", "CLEAN", "LOW", 8),
            scan("2025-01-07", "network_capture_20250107.csv", "SUSPICIOUS", "MEDIUM", 45),
            scan("2025-01-06", "malware_sample_20250106.json", "INFECTED", "CRITICAL", 96),
            scan("2025-01-05", "traffic_dump_20250105.csv", "CLEAN", "LOW", 5),
            scan("2025-01-04", "process_trace_20250104.json", "SUSPICIOUS", "HIGH", 62),
        ])
    }
}

impl AnalysisBackend for MockBackend {
    async fn analyze(&self, file: &UploadedFile) -> Result<Value, ApiError> {
        tokio::time::sleep(self.latency).await;
        log::debug!("Mock backend analyzed {}", file.name());
        Ok(Self::analysis_fixture(file))
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, FetchError> {
        serde_json::from_value(Self::history_fixture()).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn health_check(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
