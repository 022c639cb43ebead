//! CLI Commands
//!
//! Thin wrappers over the session controller and the history view.
//! No decisions are made here beyond what to print.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use std::future::Future;
use std::path::Path;
use tokio::sync::broadcast::error::RecvError;

use crate::error::SessionError;
use crate::logic::analysis::{AnalysisResult, AnalysisSession, SessionEvent, SessionStatus, UploadedFile};
use crate::logic::backend::{AnalysisBackend, ApiClient, Backend, MockBackend};
use crate::logic::config::DashboardConfig;
use crate::logic::history::{HistoryView, VerdictFilter};
use crate::logic::report;

/// Backend selected by the configuration
pub fn build_backend(config: &DashboardConfig) -> anyhow::Result<Backend> {
    if config.use_mock {
        log::info!("Using mock backend (demo data)");
        return Ok(Backend::Mock(MockBackend::default()));
    }

    let client = ApiClient::new(config.api.clone()).context("Failed to build HTTP client")?;
    log::info!("Using analysis backend at {}", client.server_url());
    Ok(Backend::Http(client))
}

/// Drive one submission to its end, handing every session event to
/// `on_event`. When `interrupt` resolves first the session is reset and the
/// submission is dropped, which aborts the request in flight.
pub async fn follow<B, R, I>(
    session: &AnalysisSession<B>,
    run: R,
    interrupt: I,
    mut on_event: impl FnMut(SessionEvent),
) -> Result<AnalysisResult, SessionError>
where
    B: AnalysisBackend,
    R: Future<Output = Result<AnalysisResult, SessionError>>,
    I: Future<Output = ()>,
{
    let mut events = session.events();
    tokio::pin!(run);
    tokio::pin!(interrupt);

    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            event = events.recv() => match event {
                Ok(event) => on_event(event),
                Err(RecvError::Lagged(skipped)) => log::warn!("Missed {} session events", skipped),
                Err(RecvError::Closed) => {}
            },
            _ = &mut interrupt => {
                log::warn!("Interrupted, resetting session");
                session.reset();
                break Err(SessionError::Cancelled);
            }
        }
    };

    while let Ok(event) = events.try_recv() {
        on_event(event);
    }
    outcome
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Upload one capture file and follow the session until it settles.
/// A failed run is resubmitted up to `retries` times. Ctrl-C resets the
/// session.
pub async fn analyze(config: &DashboardConfig, path: &Path, json: bool, retries: u32) -> anyhow::Result<()> {
    let file = UploadedFile::from_path(path).with_context(|| format!("Cannot select {}", path.display()))?;
    let session = AnalysisSession::new(build_backend(config)?, config.reveal);
    let printer = |event: SessionEvent| {
        if !json {
            print_event(event)
        }
    };

    if !json {
        println!("Analyzing {}", report::render_file(&file));
    }

    let mut outcome = follow(&session, session.start_analysis(file), ctrl_c(), printer).await;
    let mut attempt = 0;
    while attempt < retries && matches!(outcome, Err(SessionError::Network(_) | SessionError::MalformedResponse(_))) {
        attempt += 1;
        if !json {
            println!("Retrying ({}/{})...", attempt, retries);
        }
        outcome = follow(&session, session.resubmit(), ctrl_c(), printer).await;
    }

    let snapshot = session.subscribe().borrow().clone();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    match outcome {
        Ok(result) => {
            if !json {
                println!();
                print!("{}", report::render_phases(&snapshot.phases));
                println!();
                print!("{}", report::render_result(&result));
            }
            Ok(())
        }
        Err(e) => bail!("Analysis failed: {}", e),
    }
}

fn print_event(event: SessionEvent) {
    match event {
        SessionEvent::StateChanged { to: SessionStatus::Uploading, .. } => println!("Uploading..."),
        SessionEvent::StateChanged { to: SessionStatus::AwaitingPhases, .. } => {
            println!("Running detection phases...")
        }
        SessionEvent::StateChanged { to, .. } => println!("Session {}", to),
        SessionEvent::PhaseCompleted(phase) => println!("  [x] {}", phase.label()),
    }
}

/// List past scans, optionally filtered by verdict and calendar date.
/// `details` picks one row (1-based) of the filtered list to show in full.
pub async fn history(
    config: &DashboardConfig,
    verdict: VerdictFilter,
    date: Option<NaiveDate>,
    details: Option<usize>,
) -> anyhow::Result<()> {
    let backend = build_backend(config)?;
    let mut view = HistoryView::new();
    view.set_verdict_filter(verdict);
    view.set_date_filter(date);

    if view.refresh(&backend).await.is_err() {
        bail!("{}", view.error().unwrap_or("Failed to load history"));
    }

    let visible = view.visible();

    if let Some(row) = details {
        let entry = row
            .checked_sub(1)
            .and_then(|index| visible.get(index))
            .with_context(|| format!("No scan #{} ({} shown)", row, visible.len()))?;
        print!("{}", report::render_history_details(entry));
        return Ok(());
    }

    print!("{}", report::render_history(&visible, view.has_filters()));
    if view.has_filters() && !visible.is_empty() {
        println!("\n{} of {} scans shown", visible.len(), view.entries().len());
    }
    Ok(())
}

/// Check that the backend answers
pub async fn health(config: &DashboardConfig) -> anyhow::Result<()> {
    let backend = build_backend(config)?;
    match backend.health_check().await {
        Ok(()) => {
            println!("Backend OK");
            Ok(())
        }
        Err(e) => bail!("Backend unreachable: {}", e),
    }
}
