//! History Query View
//!
//! Holds the last fetched history snapshot plus the active filters and
//! derives the list the presentation layer shows.

use chrono::{Local, NaiveDate, TimeZone};
use std::str::FromStr;

use super::types::HistoryEntry;
use crate::error::FetchError;
use crate::logic::analysis::Verdict;
use crate::logic::backend::AnalysisBackend;

/// Verdict filter: `all` or one exact verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerdictFilter {
    #[default]
    All,
    Only(Verdict),
}

impl VerdictFilter {
    pub fn matches(&self, verdict: Option<Verdict>) -> bool {
        match self {
            VerdictFilter::All => true,
            VerdictFilter::Only(wanted) => verdict == Some(*wanted),
        }
    }
}

impl FromStr for VerdictFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(VerdictFilter::All);
        }
        Verdict::parse(s)
            .map(VerdictFilter::Only)
            .ok_or_else(|| format!("unknown verdict '{}' (expected all, CLEAN, SUSPICIOUS or INFECTED)", s))
    }
}

/// Fetch the history list
pub async fn load_history<B: AnalysisBackend>(backend: &B) -> Result<Vec<HistoryEntry>, FetchError> {
    backend.history().await
}

/// Entries matching both filters, in input order. Dates compare in the
/// local timezone.
pub fn filter(entries: &[HistoryEntry], verdict: VerdictFilter, date: Option<NaiveDate>) -> Vec<HistoryEntry> {
    filter_in(entries, verdict, date, &Local)
}

pub fn filter_in<Tz: TimeZone>(
    entries: &[HistoryEntry],
    verdict: VerdictFilter,
    date: Option<NaiveDate>,
    tz: &Tz,
) -> Vec<HistoryEntry> {
    entries
        .iter()
        .filter(|entry| verdict.matches(entry.verdict))
        .filter(|entry| match date {
            None => true,
            Some(day) => entry.timestamp.map(|ts| ts.date_in(tz) == day).unwrap_or(false),
        })
        .cloned()
        .collect()
}

#[derive(Debug, Default)]
pub struct HistoryView {
    entries: Vec<HistoryEntry>,
    error: Option<String>,
    verdict: VerdictFilter,
    date: Option<NaiveDate>,
}

impl HistoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh from the backend. On failure the previous list stays and
    /// the error message is kept for display.
    pub async fn refresh<B: AnalysisBackend>(&mut self, backend: &B) -> Result<usize, FetchError> {
        match load_history(backend).await {
            Ok(entries) => {
                log::info!("Loaded {} history entries", entries.len());
                self.entries = entries;
                self.error = None;
                Ok(self.entries.len())
            }
            Err(e) => {
                log::warn!("Failed to load history: {}", e);
                self.error = Some(format!("Failed to load history: {}", e));
                Err(e)
            }
        }
    }

    pub fn set_verdict_filter(&mut self, verdict: VerdictFilter) {
        self.verdict = verdict;
    }

    pub fn set_date_filter(&mut self, date: Option<NaiveDate>) {
        self.date = date;
    }

    pub fn has_filters(&self) -> bool {
        self.verdict != VerdictFilter::All || self.date.is_some()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Filtered list for display
    pub fn visible(&self) -> Vec<HistoryEntry> {
        filter(&self.entries, self.verdict, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use serde_json::{json, Value};

    use crate::error::ApiError;
    use crate::logic::analysis::UploadedFile;

    fn entry(timestamp: &str, filename: &str, verdict: &str) -> HistoryEntry {
        serde_json::from_value(json!({
            "timestamp": timestamp,
            "file_info": {"filename": filename, "size": 1024},
            "verdict": verdict,
            "risk_score": 10
        }))
        .unwrap()
    }

    fn five_scans() -> Vec<HistoryEntry> {
        vec![
            entry("2025-01-08T09:00:00", "a.csv", "CLEAN"),
            entry("2025-01-07T09:00:00", "b.csv", "SUSPICIOUS"),
            entry("2025-01-06T09:00:00", "c.json", "INFECTED"),
            entry("2025-01-06T18:30:00", "d.csv", "CLEAN"),
            entry("2025-01-04T09:00:00", "e.json", "SUSPICIOUS"),
        ]
    }

    fn names(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.filename()).collect()
    }

    #[test]
    fn test_filter_by_verdict_keeps_order() {
        let scans = five_scans();
        let filtered = filter(&scans, "SUSPICIOUS".parse().unwrap(), None);
        assert_eq!(names(&filtered), vec!["b.csv", "e.json"]);
    }

    #[test]
    fn test_filter_all_is_identity() {
        let scans = five_scans();
        assert_eq!(filter(&scans, VerdictFilter::All, None), scans);
    }

    #[test]
    fn test_filter_by_calendar_date() {
        let scans = five_scans();
        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();

        let filtered = filter(&scans, VerdictFilter::All, Some(day));
        assert_eq!(names(&filtered), vec!["c.json", "d.csv"]);

        let combined = filter(&scans, VerdictFilter::Only(Verdict::Clean), Some(day));
        assert_eq!(names(&combined), vec!["d.csv"]);
    }

    #[test]
    fn test_date_filter_uses_display_timezone() {
        let scans = vec![entry("2025-01-06T23:30:00Z", "late.csv", "CLEAN")];
        let jan6 = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let jan7 = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let cet = FixedOffset::east_opt(3600).unwrap();

        assert_eq!(filter_in(&scans, VerdictFilter::All, Some(jan6), &Utc).len(), 1);
        assert_eq!(filter_in(&scans, VerdictFilter::All, Some(jan6), &cet).len(), 0);
        assert_eq!(filter_in(&scans, VerdictFilter::All, Some(jan7), &cet).len(), 1);
    }

    #[test]
    fn test_entries_without_timestamp_never_match_date() {
        let scans: Vec<HistoryEntry> = vec![serde_json::from_value(json!({"verdict": "CLEAN"})).unwrap()];
        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert!(filter(&scans, VerdictFilter::All, Some(day)).is_empty());
    }

    #[test]
    fn test_verdict_filter_parsing() {
        assert_eq!("all".parse::<VerdictFilter>(), Ok(VerdictFilter::All));
        assert_eq!("infected".parse::<VerdictFilter>(), Ok(VerdictFilter::Only(Verdict::Infected)));
        assert!("BOTNET".parse::<VerdictFilter>().is_err());
    }

    struct FlakyBackend {
        fail: bool,
    }

    impl AnalysisBackend for FlakyBackend {
        async fn analyze(&self, _file: &UploadedFile) -> Result<Value, ApiError> {
            Err(ApiError::Network("not used".into()))
        }

        async fn history(&self) -> Result<Vec<HistoryEntry>, FetchError> {
            if self.fail {
                Err(ApiError::Server { status: 500, message: "Failed to load history".into() })
            } else {
                Ok(five_scans())
            }
        }

        async fn health_check(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_list() {
        let mut view = HistoryView::new();

        assert_eq!(view.refresh(&FlakyBackend { fail: false }).await, Ok(5));
        assert!(view.error().is_none());

        assert!(view.refresh(&FlakyBackend { fail: true }).await.is_err());
        assert_eq!(view.entries().len(), 5);
        assert!(view.error().unwrap().contains("Failed to load history"));
    }

    #[tokio::test]
    async fn test_visible_applies_filters() {
        let mut view = HistoryView::new();
        view.refresh(&FlakyBackend { fail: false }).await.unwrap();

        view.set_verdict_filter(VerdictFilter::Only(Verdict::Infected));
        assert!(view.has_filters());
        assert_eq!(names(&view.visible()), vec!["c.json"]);

        view.set_verdict_filter(VerdictFilter::All);
        view.set_date_filter(None);
        assert!(!view.has_filters());
        assert_eq!(view.visible().len(), 5);
    }
}
