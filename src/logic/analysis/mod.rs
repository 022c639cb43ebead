//! Analysis Module
//!
//! Upload -> phased status -> normalized result.
//!
//! ## Structure
//! - `types`: UploadedFile, Verdict, RiskLevel, AnalysisResult and its sub-report summaries
//! - `phases`: per-detection-method status cells
//! - `normalize`: backend response -> AnalysisResult
//! - `session`: the session controller / state machine

pub mod types;
pub mod phases;
pub mod normalize;
pub mod session;


pub use types::{
    AnalysisResult,
    RiskLevel,
    SignatureMatch,
    UploadedFile,
    Verdict,
};

pub use phases::{PhaseKey, PhaseStatus, PhaseTracker};
pub use session::{AnalysisSession, SessionEvent, SessionSnapshot, SessionState, SessionStatus};
