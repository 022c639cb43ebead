//! Analysis Session Controller
//!
//! Owns the lifecycle of one dashboard analysis:
//!
//! ```text
//! Idle --start--> Uploading --ok--> AwaitingPhases --all phases--> Complete
//!                     |
//!                     +--error--> Failed
//! any state --reset--> Idle
//! ```
//!
//! The presentation layer reads state through `subscribe()` / `events()`
//! and never mutates it. Every transition carries the generation it was
//! started under; a reset bumps the generation, so a response that lands
//! after a reset is dropped instead of resurrecting the old session.

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use super::normalize::normalize;
use super::phases::{PhaseKey, PhaseTracker};
use super::types::{AnalysisResult, UploadedFile};
use crate::error::SessionError;
use crate::logic::backend::AnalysisBackend;
use crate::logic::config::PhaseReveal;

const EVENT_CAPACITY: usize = 64;

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Idle,
    Uploading,
    AwaitingPhases,
    Complete,
    Failed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionStatus::Idle => "Idle",
            SessionStatus::Uploading => "Uploading",
            SessionStatus::AwaitingPhases => "AwaitingPhases",
            SessionStatus::Complete => "Complete",
            SessionStatus::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum SessionState {
    #[default]
    Idle,
    Uploading { file: UploadedFile },
    AwaitingPhases { file: UploadedFile },
    Complete { file: UploadedFile, result: AnalysisResult },
    Failed { file: UploadedFile, error: String },
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Idle => SessionStatus::Idle,
            SessionState::Uploading { .. } => SessionStatus::Uploading,
            SessionState::AwaitingPhases { .. } => SessionStatus::AwaitingPhases,
            SessionState::Complete { .. } => SessionStatus::Complete,
            SessionState::Failed { .. } => SessionStatus::Failed,
        }
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        match self {
            SessionState::Idle => None,
            SessionState::Uploading { file }
            | SessionState::AwaitingPhases { file }
            | SessionState::Complete { file, .. }
            | SessionState::Failed { file, .. } => Some(file),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            SessionState::Complete { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// A submission is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Uploading { .. } | SessionState::AwaitingPhases { .. })
    }
}

/// What the presentation layer sees
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Option<Uuid>,
    pub state: SessionState,
    pub phases: PhaseTracker,
    #[serde(skip)]
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged { from: SessionStatus, to: SessionStatus },
    PhaseCompleted(PhaseKey),
}

// ============================================================================
// CONTROLLER
// ============================================================================

pub struct AnalysisSession<B> {
    backend: B,
    reveal: PhaseReveal,
    state: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl<B: AnalysisBackend> AnalysisSession<B> {
    pub fn new(backend: B, reveal: PhaseReveal) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self { backend, reveal, state, events }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Latest-state subscription
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Every transition and phase completion, in order
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Submit `file` and drive the session to Complete or Failed.
    ///
    /// Only legal from Idle, Complete or Failed. Errors other than
    /// `InvalidState` are also recorded in the Failed state; `Cancelled`
    /// means a reset overtook this submission.
    pub async fn start_analysis(&self, file: UploadedFile) -> Result<AnalysisResult, SessionError> {
        let (generation, session_id) = self.begin(file.clone())?;
        log::info!("[{}] Analyzing {} ({} bytes)", session_id, file.name(), file.size());

        let raw = match self.backend.analyze(&file).await {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(generation, &file, e.into())),
        };

        let result = normalize(&raw);
        if result.verdict.is_none() {
            let err = SessionError::MalformedResponse("response carries no recognizable verdict".to_string());
            return Err(self.fail(generation, &file, err));
        }

        self.advance(generation, |snap| {
            snap.state = SessionState::AwaitingPhases { file: file.clone() };
            Ok(())
        })?;

        for (index, phase) in PhaseKey::ALL.into_iter().enumerate() {
            let delay = self.reveal.delay(index);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.advance(generation, |snap| {
                let marked = snap.phases.mark_complete(phase);
                debug_assert!(marked.is_ok(), "phase tracker disarmed mid-session");
                marked.map(|_| ())
            })?;
            self.emit(SessionEvent::PhaseCompleted(phase));
        }

        self.advance(generation, |snap| {
            debug_assert!(snap.phases.all_complete());
            snap.phases.disarm();
            snap.state = SessionState::Complete { file: file.clone(), result: result.clone() };
            Ok(())
        })?;

        log::info!(
            "[{}] Analysis complete: {} (risk {})",
            session_id,
            result.verdict.map(|v| v.as_str()).unwrap_or("UNKNOWN"),
            result.risk_level
        );
        Ok(result)
    }

    /// Run the retained file again after Complete or Failed
    pub async fn resubmit(&self) -> Result<AnalysisResult, SessionError> {
        let file = {
            let snap = self.state.borrow();
            match &snap.state {
                SessionState::Complete { file, .. } | SessionState::Failed { file, .. } => file.clone(),
                other => {
                    return Err(SessionError::InvalidState(format!(
                        "nothing to resubmit while {}",
                        other.status()
                    )))
                }
            }
        };
        self.start_analysis(file).await
    }

    /// Back to Idle from any state. In-flight submissions are orphaned.
    pub fn reset(&self) {
        let mut from = SessionStatus::Idle;
        self.state.send_modify(|snap| {
            from = snap.state.status();
            snap.generation += 1;
            snap.session_id = None;
            snap.state = SessionState::Idle;
            snap.phases.clear();
        });

        if from != SessionStatus::Idle {
            log::info!("Session reset ({} -> Idle)", from);
            self.emit(SessionEvent::StateChanged { from, to: SessionStatus::Idle });
        }
    }

    // ------------------------------------------------------------------------

    fn begin(&self, file: UploadedFile) -> Result<(u64, Uuid), SessionError> {
        let mut outcome = Err(SessionError::InvalidState(String::new()));
        let mut from = SessionStatus::Idle;

        self.state.send_if_modified(|snap| {
            from = snap.state.status();
            if snap.state.is_busy() {
                outcome = Err(SessionError::InvalidState(format!("analysis already {}", from)));
                return false;
            }

            let session_id = Uuid::new_v4();
            snap.generation += 1;
            snap.session_id = Some(session_id);
            snap.state = SessionState::Uploading { file };
            snap.phases.arm();
            outcome = Ok((snap.generation, session_id));
            true
        });

        match &outcome {
            Ok(_) => self.emit(SessionEvent::StateChanged { from, to: SessionStatus::Uploading }),
            Err(e) => log::warn!("Rejected start_analysis: {}", e),
        }
        outcome
    }

    /// Apply `update` if the session is still the one started under
    /// `generation`; otherwise report `Cancelled`
    fn advance<F>(&self, generation: u64, update: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut SessionSnapshot) -> Result<(), SessionError>,
    {
        let mut outcome = Err(SessionError::Cancelled);
        let mut from = SessionStatus::Idle;
        let mut to = SessionStatus::Idle;

        self.state.send_if_modified(|snap| {
            if snap.generation != generation {
                return false;
            }
            from = snap.state.status();
            outcome = update(snap);
            to = snap.state.status();
            outcome.is_ok()
        });

        match &outcome {
            Ok(()) if from != to => {
                log::info!("Session {} -> {}", from, to);
                self.emit(SessionEvent::StateChanged { from, to });
            }
            Ok(()) => {}
            Err(SessionError::Cancelled) => {
                log::debug!("Discarding completion of a reset session (generation {})", generation);
            }
            Err(e) => log::error!("Session update rejected: {}", e),
        }
        outcome
    }

    /// Record `err` as the Failed state; returns the error to hand back
    fn fail(&self, generation: u64, file: &UploadedFile, err: SessionError) -> SessionError {
        let message = err.to_string();
        let recorded = self.advance(generation, |snap| {
            snap.phases.disarm();
            snap.state = SessionState::Failed { file: file.clone(), error: message.clone() };
            Ok(())
        });

        match recorded {
            Ok(()) => {
                log::warn!("Analysis of {} failed: {}", file.name(), message);
                err
            }
            Err(cancelled) => cancelled,
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
