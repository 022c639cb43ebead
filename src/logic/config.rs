//! Runtime Configuration
//!
//! Dashboard settings assembled from `constants` (environment with
//! defaults). CLI flags are applied on top in `main`.

use std::time::Duration;

use crate::constants;
use crate::logic::backend::ApiConfig;

/// How detection phases are revealed once the backend has answered.
/// The backend answers in one shot, so any delay is presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseReveal {
    /// Mark all phases complete as soon as the response arrives
    #[default]
    Immediate,
    /// Wait before each phase (signature, host-based, behavioral)
    Staggered([Duration; 3]),
}

impl PhaseReveal {
    /// Delays of the demo dashboard
    pub fn staggered() -> Self {
        PhaseReveal::Staggered(constants::STAGGERED_PHASE_DELAYS_MS.map(Duration::from_millis))
    }

    pub fn delay(&self, index: usize) -> Duration {
        match self {
            PhaseReveal::Immediate => Duration::ZERO,
            PhaseReveal::Staggered(delays) => delays.get(index).copied().unwrap_or_default(),
        }
    }
}

/// Runtime configuration of the dashboard client
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub reveal: PhaseReveal,
    pub use_mock: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            reveal: if constants::is_staggered_reveal() {
                PhaseReveal::staggered()
            } else {
                PhaseReveal::Immediate
            },
            use_mock: constants::is_mock_backend(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_delays() {
        assert_eq!(PhaseReveal::Immediate.delay(1), Duration::ZERO);

        let staggered = PhaseReveal::staggered();
        assert_eq!(staggered.delay(0), Duration::from_millis(1000));
        assert_eq!(staggered.delay(2), Duration::from_millis(1500));
        assert_eq!(staggered.delay(3), Duration::ZERO);
    }
}
