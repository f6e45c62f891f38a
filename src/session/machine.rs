//! Round/break/completion state machine
//!
//! The machine is deterministic and pure with respect to
//! `(current state, elapsed seconds in phase, config)`: it performs no
//! side effects and never reads the clock. The controller feeds it the
//! tracker's elapsed time once per tick and acts on the returned
//! [`TransitionResult`].

use super::{SessionConfig, TimerPhase, TransitionResult};

/// Observable session state, mutated only by the machine's own
/// transition logic.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: TimerPhase,
    pub seconds_remaining: u32,
    /// Fraction of total configured round time elapsed, in [0, 1].
    /// Frozen during breaks; per-round fraction in unbounded mode.
    pub progress: f64,
    pub is_running: bool,
}

/// Drives phase progression for one session
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    state: SessionState,
}

impl SessionStateMachine {
    /// Create a machine positioned at the start of round 1, not running
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            state: SessionState {
                phase: TimerPhase::Round(1),
                seconds_remaining: config.round_length_seconds,
                progress: 0.0,
                is_running: false,
            },
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn set_running(&mut self, running: bool) {
        self.state.is_running = running;
    }

    /// Reposition the machine at a persisted phase; remaining time is
    /// provisional until the next `advance` recomputes it from elapsed time.
    pub fn restore_phase(&mut self, phase: TimerPhase, config: &SessionConfig) {
        self.state.phase = phase;
        self.state.seconds_remaining = phase.length_seconds(config);
        self.state.progress = match phase {
            TimerPhase::Round(index) => round_progress(index, 0, config),
            // The value the ring froze at when the preceding round ended
            TimerPhase::Break(index) if !config.is_unbounded() => {
                f64::from(index) / f64::from(config.round_count)
            }
            TimerPhase::Break(_) => 1.0,
            TimerPhase::Completed => 1.0,
        };
    }

    /// Force the terminal state without the completion transition. Used
    /// by the external stop command, which is the only way an unbounded
    /// session ever completes.
    pub fn complete(&mut self) {
        self.state.phase = TimerPhase::Completed;
        self.state.seconds_remaining = 0;
        self.state.is_running = false;
    }

    /// Feed the current phase's elapsed time to the machine.
    ///
    /// While the phase is still running this only refreshes the
    /// remaining-time and progress readings. Once elapsed time reaches
    /// the phase length, the machine moves to the next phase and reports
    /// which transition happened.
    pub fn advance(
        &mut self,
        elapsed_in_phase: u64,
        config: &SessionConfig,
    ) -> TransitionResult {
        let phase = self.state.phase;
        if phase.is_completed() {
            return TransitionResult::NoTransition;
        }

        let length = u64::from(phase.length_seconds(config));
        if elapsed_in_phase < length {
            self.state.seconds_remaining = (length - elapsed_in_phase) as u32;
            if let TimerPhase::Round(index) = phase {
                self.state.progress = round_progress(index, elapsed_in_phase, config);
            }
            return TransitionResult::NoTransition;
        }

        self.transition(config)
    }

    fn transition(&mut self, config: &SessionConfig) -> TransitionResult {
        let unbounded = config.is_unbounded();
        match self.state.phase {
            TimerPhase::Break(index) => {
                // A break is only ever scheduled when a following round
                // exists, so the next round is always in range.
                let next = if unbounded { 1 } else { index + 1 };
                self.enter(TimerPhase::Round(next), config)
            }
            TimerPhase::Round(index) => {
                let break_follows = config.break_length_seconds > 0
                    && (unbounded || index < config.round_count);
                if break_follows {
                    self.enter(TimerPhase::Break(index), config)
                } else if unbounded {
                    // Wrap around: the index stays 1, time and progress reset
                    self.state.seconds_remaining = config.round_length_seconds;
                    self.state.progress = 0.0;
                    TransitionResult::RoundRestarted
                } else if index < config.round_count {
                    self.enter(TimerPhase::Round(index + 1), config)
                } else {
                    self.state.phase = TimerPhase::Completed;
                    self.state.seconds_remaining = 0;
                    self.state.progress = 1.0;
                    self.state.is_running = false;
                    TransitionResult::SessionCompleted
                }
            }
            TimerPhase::Completed => TransitionResult::NoTransition,
        }
    }

    fn enter(&mut self, phase: TimerPhase, config: &SessionConfig) -> TransitionResult {
        self.state.phase = phase;
        self.state.seconds_remaining = phase.length_seconds(config);
        if let TimerPhase::Round(index) = phase {
            self.state.progress = round_progress(index, 0, config);
        }
        // Entering a break leaves progress where the finished round put it
        TransitionResult::PhaseStarted(phase)
    }
}

/// Canonical progress formula.
///
/// The `+1` biases the ring to reach 100% one displayed second before
/// the remaining-time counter reaches zero; the counter and the ring are
/// deliberately offset.
fn round_progress(index: u32, elapsed_in_round: u64, config: &SessionConfig) -> f64 {
    let length = f64::from(config.round_length_seconds);
    let within = ((elapsed_in_round as f64 + 1.0) / length).min(1.0);
    if config.is_unbounded() {
        within
    } else {
        (f64::from(index - 1) + within) / f64::from(config.round_count)
    }
}
