//! Command Tests
//!
//! Interrupt handling and retries of `follow`, plus the mock-backed
//! commands end to end.

use serde_json::{json, Value};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;

use super::*;
use crate::error::{ApiError, FetchError, SessionError};
use crate::logic::analysis::{AnalysisSession, SessionEvent, SessionStatus, UploadedFile, Verdict};
use crate::logic::backend::{AnalysisBackend, ApiConfig};
use crate::logic::config::{DashboardConfig, PhaseReveal};
use crate::logic::history::{HistoryEntry, VerdictFilter};

/// Backend that never answers an upload
struct SilentBackend;

impl AnalysisBackend for SilentBackend {
    async fn analyze(&self, _file: &UploadedFile) -> Result<Value, ApiError> {
        std::future::pending().await
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, FetchError> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Fails the first `failures` uploads, then answers CLEAN
struct RecoveringBackend {
    failures: usize,
    calls: AtomicUsize,
}

impl AnalysisBackend for RecoveringBackend {
    async fn analyze(&self, _file: &UploadedFile) -> Result<Value, ApiError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            Err(ApiError::Network("connection refused".into()))
        } else {
            Ok(json!({"verdict": "CLEAN", "risk_score": 4}))
        }
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, FetchError> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

fn capture() -> UploadedFile {
    UploadedFile::from_bytes("capture.csv", b"src_ip,dst_ip\n10.0.0.5,1.2.3.4\n".to_vec()).unwrap()
}

fn mock_config() -> DashboardConfig {
    DashboardConfig {
        api: ApiConfig::default(),
        reveal: PhaseReveal::Immediate,
        use_mock: true,
    }
}

#[tokio::test]
async fn test_interrupt_drops_pending_upload() {
    let session = AnalysisSession::new(SilentBackend, PhaseReveal::Immediate);
    let mut seen = Vec::new();

    let outcome = tokio::time::timeout(
        Duration::from_secs(2),
        follow(
            &session,
            session.start_analysis(capture()),
            tokio::time::sleep(Duration::from_millis(20)),
            |event| seen.push(event),
        ),
    )
    .await
    .expect("interrupt must end the submission without waiting for the backend");

    assert_eq!(outcome.unwrap_err(), SessionError::Cancelled);
    assert_eq!(session.snapshot().state.status(), SessionStatus::Idle);
    assert_eq!(
        seen,
        vec![
            SessionEvent::StateChanged { from: SessionStatus::Idle, to: SessionStatus::Uploading },
            SessionEvent::StateChanged { from: SessionStatus::Uploading, to: SessionStatus::Idle },
        ]
    );
}

#[tokio::test]
async fn test_follow_resubmit_after_failure() {
    let session = AnalysisSession::new(
        RecoveringBackend { failures: 1, calls: AtomicUsize::new(0) },
        PhaseReveal::Immediate,
    );
    let never = std::future::pending::<()>;

    let first = follow(&session, session.start_analysis(capture()), never(), |_| {}).await;
    assert!(matches!(first, Err(SessionError::Network(_))));
    assert_eq!(session.snapshot().state.status(), SessionStatus::Failed);

    let mut seen = Vec::new();
    let second = follow(&session, session.resubmit(), never(), |event| seen.push(event)).await;

    assert_eq!(second.unwrap().verdict, Some(Verdict::Clean));
    assert_eq!(
        seen.first(),
        Some(&SessionEvent::StateChanged { from: SessionStatus::Failed, to: SessionStatus::Uploading })
    );
    assert_eq!(session.backend().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_analyze_command_with_mock_backend() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flows.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(b"src_ip,dst_ip\n10.0.0.1,8.8.8.8\n").unwrap();

    assert!(analyze(&mock_config(), &path, true, 0).await.is_ok());

    let unsupported = dir.path().join("dump.pcap");
    std::fs::File::create(&unsupported).unwrap();
    assert!(analyze(&mock_config(), &unsupported, true, 0).await.is_err());
}

#[tokio::test]
async fn test_history_details_row_bounds() {
    let config = mock_config();

    assert!(history(&config, VerdictFilter::All, None, None).await.is_ok());
    assert!(history(&config, VerdictFilter::All, None, Some(3)).await.is_ok());
    assert!(history(&config, VerdictFilter::All, None, Some(0)).await.is_err());
    assert!(history(&config, VerdictFilter::Only(Verdict::Infected), None, Some(2)).await.is_err());
}
