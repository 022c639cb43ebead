//! Result Normalizer
//!
//! Maps whatever `/api/analyze` returned into an `AnalysisResult`.
//! Never fails: every field falls back to a default on its own.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::types::{
    AnalysisResult, BehaviorSummary, HostSummary, RiskLevel, SignatureMatch, SignatureSummary, SuspiciousProcess,
    Verdict,
};
use crate::logic::lenient::{self, clamp_score, Numeric};
use crate::logic::timestamp::Timestamp;

pub const DEFAULT_EXPLANATION: &str = "Analysis complete";

// ============================================================================
// RAW RESPONSE SHAPE
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    #[serde(deserialize_with = "lenient::field")]
    verdict: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    risk_score: Option<Numeric>,
    #[serde(deserialize_with = "lenient::field")]
    timestamp: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    signature_based: Option<RawSignature>,
    #[serde(deserialize_with = "lenient::field")]
    host_based: Option<RawHost>,
    #[serde(deserialize_with = "lenient::field")]
    behavior_based: Option<RawBehavior>,
    #[serde(deserialize_with = "lenient::field")]
    gemini_analysis: Option<RawGemini>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSignature {
    #[serde(deserialize_with = "lenient::seq")]
    threats: Vec<RawThreat>,
    #[serde(deserialize_with = "lenient::field")]
    threat_count: Option<Numeric>,
    #[serde(deserialize_with = "lenient::field")]
    status: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawThreat {
    #[serde(rename = "type", deserialize_with = "lenient::field")]
    kind: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    value: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    severity: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    field: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHost {
    #[serde(deserialize_with = "lenient::seq")]
    suspicious_processes: Vec<RawProcess>,
    #[serde(deserialize_with = "lenient::field")]
    suspicious_count: Option<Numeric>,
    #[serde(deserialize_with = "lenient::field")]
    status: Option<String>,
}

/// Backend detector emits `process_name/cpu/memory/connections`,
/// the demo data `name/cpu/memory/connections`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProcess {
    #[serde(deserialize_with = "lenient::field")]
    process_name: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    cpu: Option<Numeric>,
    #[serde(deserialize_with = "lenient::field")]
    cpu_percent: Option<Numeric>,
    #[serde(deserialize_with = "lenient::field")]
    memory: Option<Numeric>,
    #[serde(deserialize_with = "lenient::field")]
    memory_mb: Option<Numeric>,
    #[serde(deserialize_with = "lenient::field")]
    connections: Option<Numeric>,
    #[serde(deserialize_with = "lenient::field")]
    connection_count: Option<Numeric>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBehavior {
    #[serde(deserialize_with = "lenient::field")]
    confidence: Option<Numeric>,
    #[serde(deserialize_with = "lenient::field")]
    prediction: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGemini {
    #[serde(deserialize_with = "lenient::field")]
    risk_level: Option<String>,
    #[serde(deserialize_with = "lenient::field")]
    explanation: Option<String>,
    #[serde(deserialize_with = "lenient::seq")]
    recommendations: Vec<String>,
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize a raw backend response, stamping it with the current time
/// when the backend did not provide one
pub fn normalize(raw: &Value) -> AnalysisResult {
    normalize_at(raw, Utc::now())
}

pub fn normalize_at(raw: &Value, now: DateTime<Utc>) -> AnalysisResult {
    // Non-objects (arrays, strings, null) decode to all defaults
    let raw: RawAnalysis = serde_json::from_value(raw.clone()).unwrap_or_default();

    let gemini = raw.gemini_analysis.unwrap_or_default();

    let (signature_matches, signature_summary) = match raw.signature_based {
        Some(sig) => {
            let summary = SignatureSummary {
                status: sig.status,
                threat_count: count_or(sig.threat_count, sig.threats.len()),
                message: sig.message,
            };
            (sig.threats.into_iter().map(to_signature_match).collect(), Some(summary))
        }
        None => (Vec::new(), None),
    };

    let (suspicious_processes, host_summary) = match raw.host_based {
        Some(host) => {
            let summary = HostSummary {
                status: host.status,
                suspicious_count: count_or(host.suspicious_count, host.suspicious_processes.len()),
            };
            (host.suspicious_processes.into_iter().map(to_process).collect(), Some(summary))
        }
        None => (Vec::new(), None),
    };

    let (anomaly_score, behavior_summary) = match raw.behavior_based {
        Some(behavior) => {
            let score = behavior.confidence.and_then(|c| c.value()).map(clamp_score).unwrap_or(0);
            let summary = BehaviorSummary { prediction: behavior.prediction, method: behavior.method };
            (score, Some(summary))
        }
        None => (0, None),
    };

    AnalysisResult {
        verdict: raw.verdict.as_deref().and_then(Verdict::parse),
        risk_level: gemini
            .risk_level
            .as_deref()
            .map(RiskLevel::parse)
            .unwrap_or_default(),
        risk_score: raw.risk_score.and_then(|s| s.value()).map(clamp_score),
        timestamp: raw
            .timestamp
            .as_deref()
            .and_then(Timestamp::parse)
            .map(|ts| ts.to_utc())
            .unwrap_or(now),
        signature_matches,
        suspicious_processes,
        anomaly_score,
        ai_explanation: gemini
            .explanation
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
        recommendations: gemini.recommendations,
        signature_summary,
        host_summary,
        behavior_summary,
    }
}

/// Reported count, or the length of the list when the backend omitted it
fn count_or(reported: Option<Numeric>, listed: usize) -> u32 {
    reported
        .and_then(|n| n.value())
        .map(|n| n.max(0.0).round() as u32)
        .unwrap_or(listed as u32)
}

fn to_signature_match(threat: RawThreat) -> SignatureMatch {
    SignatureMatch {
        indicator: threat.value.unwrap_or_else(|| "unknown".to_string()),
        match_type: threat.kind.unwrap_or_else(|| "unknown".to_string()),
        severity: threat.severity,
        field: threat.field,
    }
}

fn to_process(p: RawProcess) -> SuspiciousProcess {
    let number = |primary: Option<Numeric>, alias: Option<Numeric>| {
        primary
            .and_then(|n| n.value())
            .or_else(|| alias.and_then(|n| n.value()))
            .map(|n| n.max(0.0))
            .unwrap_or(0.0)
    };

    SuspiciousProcess {
        name: p.process_name.or(p.name).unwrap_or_else(|| "unknown".to_string()),
        cpu_percent: number(p.cpu, p.cpu_percent),
        memory_mb: number(p.memory, p.memory_mb),
        connection_count: number(p.connections, p.connection_count).round() as u32,
    }
}
