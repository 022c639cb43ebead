//! Analysis Types
//!
//! Core types for an analysis session.
//! No logic here - data structures only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::constants::MAX_UPLOAD_BYTES;
use crate::error::SelectionError;

// ============================================================================
// UPLOADED FILE
// ============================================================================

/// Media types the backend knows how to parse for us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Csv,
    Json,
}

impl MediaType {
    /// Infer from the file extension (case-insensitive)
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(MediaType::Csv),
            "json" => Some(MediaType::Json),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Csv => "text/csv",
            MediaType::Json => "application/json",
        }
    }
}

/// User-selected capture file. Cloning shares the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    name: String,
    size: u64,
    media_type: MediaType,
    #[serde(skip)]
    content: Arc<[u8]>,
}

impl UploadedFile {
    /// Select in-memory content under `name`
    pub fn from_bytes(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Result<Self, SelectionError> {
        let name = name.into();
        let media_type = Self::check_name(&name)?;
        let content: Vec<u8> = content.into();
        let size = content.len() as u64;
        Self::check_size(size)?;

        Ok(Self {
            name,
            size,
            media_type,
            content: content.into(),
        })
    }

    /// Select a file from disk
    pub fn from_path(path: &Path) -> Result<Self, SelectionError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::check_name(&name)?;
        Self::check_size(std::fs::metadata(path)?.len())?;

        let content = std::fs::read(path)?;
        Self::from_bytes(name, content)
    }

    fn check_name(name: &str) -> Result<MediaType, SelectionError> {
        if name.trim().is_empty() {
            return Err(SelectionError::EmptyName);
        }
        MediaType::from_file_name(name).ok_or_else(|| {
            let ext = Path::new(name)
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            SelectionError::UnsupportedType(ext)
        })
    }

    fn check_size(size: u64) -> Result<(), SelectionError> {
        if size > MAX_UPLOAD_BYTES {
            return Err(SelectionError::TooLarge { size, limit: MAX_UPLOAD_BYTES });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

// ============================================================================
// VERDICT & RISK
// ============================================================================

/// Final verdict of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Clean,
    Suspicious,
    Infected,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Clean, Verdict::Suspicious, Verdict::Infected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Clean => "CLEAN",
            Verdict::Suspicious => "SUSPICIOUS",
            Verdict::Infected => "INFECTED",
        }
    }

    /// Case-insensitive; unknown words yield `None`
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL.into_iter().find(|v| v.as_str().eq_ignore_ascii_case(input))
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Risk level reported by the AI stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::Unknown => "UNKNOWN",
        }
    }

    /// Anything unrecognised is `Unknown`
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_uppercase().as_str() {
            "LOW" => RiskLevel::Low,
            "MEDIUM" => RiskLevel::Medium,
            "HIGH" => RiskLevel::High,
            "CRITICAL" => RiskLevel::Critical,
            _ => RiskLevel::Unknown,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// ANALYSIS RESULT
// ============================================================================

/// Known-bad indicator found by signature matching
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureMatch {
    pub indicator: String,
    pub match_type: String,
    pub severity: Option<String>,
    /// Capture column the indicator was found in (`dst_ip`, `dns_query`, ...)
    pub field: Option<String>,
}

/// Process flagged by host-based monitoring
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousProcess {
    pub name: String,
    pub cpu_percent: f64,
    #[serde(rename = "memoryMB")]
    pub memory_mb: f64,
    pub connection_count: u32,
}

/// Status line of the signature detector
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureSummary {
    pub status: Option<String>,
    pub threat_count: u32,
    pub message: Option<String>,
}

/// Status line of the host monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    pub status: Option<String>,
    pub suspicious_count: u32,
}

/// Prediction of the behavioral model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSummary {
    pub prediction: Option<String>,
    pub method: Option<String>,
}

/// Band of the anomaly score shown next to the gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BehaviorLabel {
    Clean,
    Suspicious,
    Botnet,
}

impl BehaviorLabel {
    /// 0-30 clean, 31-70 suspicious, above that botnet
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=30 => BehaviorLabel::Clean,
            31..=70 => BehaviorLabel::Suspicious,
            _ => BehaviorLabel::Botnet,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorLabel::Clean => "CLEAN",
            BehaviorLabel::Suspicious => "SUSPICIOUS",
            BehaviorLabel::Botnet => "BOTNET",
        }
    }
}

impl std::fmt::Display for BehaviorLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Display-ready result of one completed session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// `None` only when the backend omitted it; such a response never
    /// reaches the Complete state
    pub verdict: Option<Verdict>,
    pub risk_level: RiskLevel,
    pub risk_score: Option<u8>,
    pub timestamp: DateTime<Utc>,
    pub signature_matches: Vec<SignatureMatch>,
    pub suspicious_processes: Vec<SuspiciousProcess>,
    pub anomaly_score: u8,
    pub ai_explanation: String,
    pub recommendations: Vec<String>,
    /// Present only when the backend sent that sub-report
    pub signature_summary: Option<SignatureSummary>,
    pub host_summary: Option<HostSummary>,
    pub behavior_summary: Option<BehaviorSummary>,
}

impl AnalysisResult {
    pub fn behavior_label(&self) -> BehaviorLabel {
        BehaviorLabel::from_score(self.anomaly_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(MediaType::from_file_name("flows.CSV"), Some(MediaType::Csv));
        assert_eq!(MediaType::from_file_name("hosts.json"), Some(MediaType::Json));
        assert_eq!(MediaType::from_file_name("capture.pcap"), None);
        assert_eq!(MediaType::from_file_name("README"), None);
    }

    #[test]
    fn test_from_bytes_rejects_unsupported_type() {
        let err = UploadedFile::from_bytes("dump.pcap", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, SelectionError::UnsupportedType(ext) if ext == "pcap"));

        let err = UploadedFile::from_bytes("   ", Vec::new()).unwrap_err();
        assert!(matches!(err, SelectionError::EmptyName));
    }

    #[test]
    fn test_from_path_reads_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("traffic.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"src_ip,dst_ip\n10.0.0.1,1.2.3.4\n").unwrap();

        let file = UploadedFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "traffic.csv");
        assert_eq!(file.media_type(), MediaType::Csv);
        assert_eq!(file.size(), 31);
        assert!(file.content().starts_with(b"src_ip"));
    }

    #[test]
    fn test_verdict_and_risk_parsing() {
        assert_eq!(Verdict::parse("infected"), Some(Verdict::Infected));
        assert_eq!(Verdict::parse("BOTNET"), None);
        assert_eq!(RiskLevel::parse("critical"), RiskLevel::Critical);
        assert_eq!(RiskLevel::parse("severe"), RiskLevel::Unknown);
    }

    #[test]
    fn test_behavior_label_bands() {
        assert_eq!(BehaviorLabel::from_score(0), BehaviorLabel::Clean);
        assert_eq!(BehaviorLabel::from_score(30), BehaviorLabel::Clean);
        assert_eq!(BehaviorLabel::from_score(31), BehaviorLabel::Suspicious);
        assert_eq!(BehaviorLabel::from_score(70), BehaviorLabel::Suspicious);
        assert_eq!(BehaviorLabel::from_score(71), BehaviorLabel::Botnet);
        assert_eq!(BehaviorLabel::from_score(100).to_string(), "BOTNET");
    }
}
