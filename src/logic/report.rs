//! Text Rendering
//!
//! Turns session snapshots, results and history lists into terminal text.
//! Read-only: nothing here decides anything about a scan.

use chrono::Local;
use std::fmt::Write;

use crate::logic::analysis::{AnalysisResult, PhaseStatus, PhaseTracker, SignatureMatch, UploadedFile};
use crate::logic::history::HistoryEntry;

/// Items listed per section before "... and N more"
const PREVIEW_ITEMS: usize = 3;

/// Human-readable size, 1024-based, up to two decimals
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }

    let mut text = format!("{:.2}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{} {}", text, UNITS[exponent])
}

pub fn render_file(file: &UploadedFile) -> String {
    format!("{} ({})", file.name(), format_file_size(file.size()))
}

pub fn render_phases(phases: &PhaseTracker) -> String {
    let mut out = String::new();
    for (key, status) in phases.iter() {
        let mark = match status {
            PhaseStatus::Complete => "[x]",
            PhaseStatus::Pending => "[ ]",
        };
        let _ = writeln!(out, "  {} {}", mark, key.label());
    }
    out
}

pub fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::new();

    let verdict = result.verdict.map(|v| v.as_str()).unwrap_or("UNKNOWN");
    let _ = writeln!(out, "=== VERDICT: {} (risk level {}) ===", verdict, result.risk_level);
    if let Some(score) = result.risk_score {
        let _ = writeln!(out, "Risk score: {}/100", score);
    }
    let _ = writeln!(out, "Scanned at: {}", result.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"));

    let _ = writeln!(out, "\nSignature matches: {}", result.signature_matches.len());
    if let Some(summary) = &result.signature_summary {
        write_status(&mut out, summary.status.as_deref(), summary.threat_count, "threats");
        if let Some(message) = &summary.message {
            let _ = writeln!(out, "  {}", message);
        }
    }
    let lines: Vec<String> = result.signature_matches.iter().map(render_match).collect();
    write_preview(&mut out, &lines);

    let _ = writeln!(out, "\nSuspicious processes: {}", result.suspicious_processes.len());
    if let Some(summary) = &result.host_summary {
        write_status(&mut out, summary.status.as_deref(), summary.suspicious_count, "suspicious");
    }
    let lines: Vec<String> = result
        .suspicious_processes
        .iter()
        .map(|p| {
            format!(
                "{}: CPU {}%, Memory {}MB, {} connections",
                p.name, p.cpu_percent, p.memory_mb, p.connection_count
            )
        })
        .collect();
    write_preview(&mut out, &lines);

    let _ = writeln!(out, "\nAnomaly score: {}/100 ({})", result.anomaly_score, result.behavior_label());
    if let Some(summary) = &result.behavior_summary {
        match (&summary.prediction, &summary.method) {
            (Some(prediction), Some(method)) => {
                let _ = writeln!(out, "  Prediction: {} ({})", prediction, method);
            }
            (Some(prediction), None) => {
                let _ = writeln!(out, "  Prediction: {}", prediction);
            }
            (None, Some(method)) => {
                let _ = writeln!(out, "  Method: {}", method);
            }
            (None, None) => {}
        }
    }
    let _ = writeln!(out, "\nAI analysis: {}", result.ai_explanation);

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "\nRecommendations:");
        for rec in &result.recommendations {
            let _ = writeln!(out, "  - {}", rec);
        }
    }

    out
}

fn render_match(m: &SignatureMatch) -> String {
    let mut line = format!("{}: {}", m.match_type, m.indicator);
    match (&m.severity, &m.field) {
        (Some(severity), Some(field)) => {
            let _ = write!(line, " [{}, {}]", severity, field);
        }
        (Some(only), None) | (None, Some(only)) => {
            let _ = write!(line, " [{}]", only);
        }
        (None, None) => {}
    }
    line
}

fn write_status(out: &mut String, status: Option<&str>, count: u32, noun: &str) {
    let _ = writeln!(out, "  Status: {} ({} {})", status.unwrap_or("UNKNOWN"), count, noun);
}

fn write_preview(out: &mut String, lines: &[String]) {
    for line in lines.iter().take(PREVIEW_ITEMS) {
        let _ = writeln!(out, "  - {}", line);
    }
    if lines.len() > PREVIEW_ITEMS {
        let _ = writeln!(out, "  ... and {} more", lines.len() - PREVIEW_ITEMS);
    }
}

/// History table. `filtered` picks the empty-list wording.
pub fn render_history(entries: &[HistoryEntry], filtered: bool) -> String {
    if entries.is_empty() {
        return if filtered {
            "No scan history matches your filters\n".to_string()
        } else {
            "No scan history found\n".to_string()
        };
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<36} {:>10} {:<11} {:<9} {:>7}",
        "Date", "Filename", "Size", "Verdict", "Risk", "Score"
    );

    for entry in entries {
        let date = entry
            .timestamp
            .map(|ts| ts.date_in(&Local).to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let size = entry
            .file_info
            .as_ref()
            .map(|f| format_file_size(f.size))
            .unwrap_or_else(|| "N/A".to_string());
        let verdict = entry.verdict.map(|v| v.as_str()).unwrap_or("UNKNOWN");
        let score = format!("{}/100", entry.risk_score.unwrap_or(0));

        let _ = writeln!(
            out,
            "{:<12} {:<36} {:>10} {:<11} {:<9} {:>7}",
            date,
            entry.filename(),
            size,
            verdict,
            entry.risk_level,
            score
        );
    }
    out
}

/// Full record of one past scan, every sub-report included
pub fn render_history_details(entry: &HistoryEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Scan details - {}", entry.filename());
    let when = entry.timestamp.map(|ts| ts.to_string()).unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(out, "Timestamp: {}", when);
    if let Some(file) = &entry.file_info {
        let _ = writeln!(out, "File: {} ({})", file.filename, format_file_size(file.size));
    }
    let _ = writeln!(out);
    out.push_str(&render_result(&entry.details));
    out
}
