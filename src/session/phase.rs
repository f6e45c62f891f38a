//! Timer phases and transition results

use serde::{Deserialize, Serialize};

use super::SessionConfig;

/// Current position of a session: an active round, a break between
/// rounds, or the completed terminal state.
///
/// Indices are 1-based. In unbounded mode the index is pinned at 1 and
/// never increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerPhase {
    Round(u32),
    Break(u32),
    Completed,
}

impl TimerPhase {
    /// Configured length of this phase in seconds
    pub fn length_seconds(&self, config: &SessionConfig) -> u32 {
        match self {
            TimerPhase::Round(_) => config.round_length_seconds,
            TimerPhase::Break(_) => config.break_length_seconds,
            TimerPhase::Completed => 0,
        }
    }

    /// Round or break index, if the phase carries one
    pub fn index(&self) -> Option<u32> {
        match self {
            TimerPhase::Round(index) | TimerPhase::Break(index) => Some(*index),
            TimerPhase::Completed => None,
        }
    }

    pub fn is_round(&self) -> bool {
        matches!(self, TimerPhase::Round(_))
    }

    pub fn is_break(&self) -> bool {
        matches!(self, TimerPhase::Break(_))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TimerPhase::Completed)
    }

    /// Short name for logging and status output
    pub fn name(&self) -> &'static str {
        match self {
            TimerPhase::Round(_) => "round",
            TimerPhase::Break(_) => "break",
            TimerPhase::Completed => "completed",
        }
    }
}

/// Outcome of feeding one elapsed-time reading to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// The active phase is still running
    NoTransition,
    /// A new round or break phase has begun
    PhaseStarted(TimerPhase),
    /// An unbounded session wrapped around to a fresh round
    RoundRestarted,
    /// The final round of a bounded session finished
    SessionCompleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_lengths_follow_config() {
        let config = SessionConfig::new(3, 60, 10);
        assert_eq!(TimerPhase::Round(1).length_seconds(&config), 60);
        assert_eq!(TimerPhase::Break(2).length_seconds(&config), 10);
        assert_eq!(TimerPhase::Completed.length_seconds(&config), 0);
    }

    #[test]
    fn completed_has_no_index() {
        assert_eq!(TimerPhase::Round(2).index(), Some(2));
        assert_eq!(TimerPhase::Break(1).index(), Some(1));
        assert_eq!(TimerPhase::Completed.index(), None);
    }
}
