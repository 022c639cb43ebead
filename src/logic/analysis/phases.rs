//! Phase Tracker
//!
//! One status cell per detection method. Cells only move forward
//! (pending -> complete) until the tracker is cleared by a reset.

use serde::Serialize;

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseKey {
    Signature,
    HostBased,
    Behavioral,
}

impl PhaseKey {
    /// Reveal order
    pub const ALL: [PhaseKey; 3] = [PhaseKey::Signature, PhaseKey::HostBased, PhaseKey::Behavioral];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKey::Signature => "signature",
            PhaseKey::HostBased => "hostBased",
            PhaseKey::Behavioral => "behavioral",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PhaseKey::Signature => "Signature-Based Detection",
            PhaseKey::HostBased => "Host-Based Monitoring",
            PhaseKey::Behavioral => "Behavioral Analysis (ML)",
        }
    }
}

impl std::fmt::Display for PhaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    #[default]
    Pending,
    Complete,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTracker {
    signature: PhaseStatus,
    host_based: PhaseStatus,
    behavioral: PhaseStatus,
    /// Set while a session is Uploading/AwaitingPhases
    #[serde(skip)]
    armed: bool,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// All phases pending, ready for a new session
    pub fn arm(&mut self) {
        *self = Self { armed: true, ..Self::default() };
    }

    /// Session reached a terminal state; statuses stay as they are
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// All phases pending, no active session
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns `true` if the phase moved from pending to complete.
    /// Marking a completed phase again is a no-op.
    pub fn mark_complete(&mut self, key: PhaseKey) -> Result<bool, SessionError> {
        if !self.armed {
            return Err(SessionError::InvalidState(format!(
                "cannot complete phase '{}' outside an active session",
                key
            )));
        }

        let cell = self.cell_mut(key);
        let changed = *cell == PhaseStatus::Pending;
        *cell = PhaseStatus::Complete;
        Ok(changed)
    }

    pub fn status(&self, key: PhaseKey) -> PhaseStatus {
        match key {
            PhaseKey::Signature => self.signature,
            PhaseKey::HostBased => self.host_based,
            PhaseKey::Behavioral => self.behavioral,
        }
    }

    pub fn all_complete(&self) -> bool {
        PhaseKey::ALL.iter().all(|k| self.status(*k) == PhaseStatus::Complete)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhaseKey, PhaseStatus)> + '_ {
        PhaseKey::ALL.iter().map(move |k| (*k, self.status(*k)))
    }

    fn cell_mut(&mut self, key: PhaseKey) -> &mut PhaseStatus {
        match key {
            PhaseKey::Signature => &mut self.signature,
            PhaseKey::HostBased => &mut self.host_based,
            PhaseKey::Behavioral => &mut self.behavioral,
        }
    }
}
