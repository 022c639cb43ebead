//! History Types

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::logic::analysis::normalize::normalize_at;
use crate::logic::analysis::{AnalysisResult, RiskLevel, Verdict};
use crate::logic::lenient::{self, Numeric};
use crate::logic::timestamp::Timestamp;

/// `file_info` block of a stored scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub filename: String,
    pub size: u64,
}

/// One past scan as returned by `/api/history`. Read-only.
///
/// The backend stores the full analysis response, so every sub-report is
/// kept in `details` for the detail view.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct HistoryEntry {
    pub timestamp: Option<Timestamp>,
    pub file_info: Option<FileDescriptor>,
    pub verdict: Option<Verdict>,
    pub risk_level: RiskLevel,
    pub risk_score: Option<u8>,
    pub details: AnalysisResult,
}

impl HistoryEntry {
    pub fn filename(&self) -> &str {
        self.file_info.as_ref().map(|f| f.filename.as_str()).unwrap_or("Unknown")
    }
}

// ============================================================================
// RAW SHAPE
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHistoryEntry {
    #[serde(deserialize_with = "lenient::field")]
    timestamp: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    file_info: Option<RawFileInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFileInfo {
    #[serde(deserialize_with = "lenient::field")]
    filename: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    size: Option<Numeric>,
}

impl TryFrom<Value> for HistoryEntry {
    type Error = String;

    /// Only JSON objects are scan records
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err("history record is not a JSON object".to_string());
        }

        let raw: RawHistoryEntry = serde_json::from_value(value.clone()).unwrap_or_default();
        let timestamp = raw.timestamp.as_deref().and_then(Timestamp::parse);
        let details = normalize_at(&value, timestamp.map(|ts| ts.to_utc()).unwrap_or_else(Utc::now));

        Ok(Self {
            timestamp,
            file_info: raw.file_info.map(|f| FileDescriptor {
                filename: f.filename.unwrap_or_else(|| "Unknown".to_string()),
                size: f.size.and_then(|s| s.value()).map(|s| s.max(0.0) as u64).unwrap_or(0),
            }),
            verdict: details.verdict,
            risk_level: details.risk_level,
            risk_score: details.risk_score,
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_backend_record() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "timestamp": "2025-01-07T08:15:00.123456",
            "file_info": {"filename": "network_capture.csv", "size": 20480, "type": "csv"},
            "verdict": "SUSPICIOUS",
            "risk_score": 55,
            "gemini_analysis": {"risk_level": "MEDIUM", "explanation": "..."}
        }))
        .unwrap();

        assert_eq!(entry.filename(), "network_capture.csv");
        assert_eq!(entry.file_info.as_ref().unwrap().size, 20480);
        assert_eq!(entry.verdict, Some(Verdict::Suspicious));
        assert_eq!(entry.risk_level, RiskLevel::Medium);
        assert_eq!(entry.risk_score, Some(55));
        assert!(entry.timestamp.is_some());
    }

    #[test]
    fn test_decode_sparse_record() {
        let entry: HistoryEntry = serde_json::from_value(json!({"verdict": 7})).unwrap();

        assert_eq!(entry.filename(), "Unknown");
        assert_eq!(entry.verdict, None);
        assert_eq!(entry.risk_level, RiskLevel::Unknown);
        assert_eq!(entry.timestamp, None);
    }

    #[test]
    fn test_sub_reports_are_kept() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "timestamp": "2025-01-06T09:00:00Z",
            "verdict": "INFECTED",
            "signature_based": {
                "threats": [{"type": "malicious_domain", "value": "evil.example", "field": "dns_query", "severity": "HIGH"}],
                "status": "DETECTED"
            },
            "behavior_based": {"prediction": "BOTNET", "confidence": 91, "method": "ml_model"},
            "gemini_analysis": {"risk_level": "CRITICAL", "recommendations": ["Isolate the host"]}
        }))
        .unwrap();

        assert_eq!(entry.details.signature_matches[0].field.as_deref(), Some("dns_query"));
        assert_eq!(entry.details.anomaly_score, 91);
        assert_eq!(entry.details.behavior_summary.as_ref().unwrap().method.as_deref(), Some("ml_model"));
        assert_eq!(entry.details.recommendations, vec!["Isolate the host".to_string()]);
        assert_eq!(entry.details.timestamp, entry.timestamp.unwrap().to_utc());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(serde_json::from_value::<HistoryEntry>(json!("garbage")).is_err());
        assert!(serde_json::from_value::<HistoryEntry>(json!([1, 2])).is_err());
    }
}
