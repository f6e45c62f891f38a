//! Session controller
//!
//! Glues the elapsed-time tracker to the state machine on a pulled
//! `tick(now)`, translates commands from the outside into resets and
//! phase changes, and owns the queue of delayed completion actions.
//! All timestamps come from the caller, so the whole controller can be
//! driven with synthetic clocks.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::effects::{EffectPrefs, EffectRequest, HapticStrength};
use super::{
    ElapsedTimeTracker, SessionConfig, SessionSnapshot, SessionStateMachine, SnapshotStore,
    TimerPhase, TransitionResult,
};

/// Read-only session view consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: TimerPhase,
    pub seconds_remaining: u32,
    pub progress: f64,
    pub is_running: bool,
    pub is_completed: bool,
    pub current_round: u32,
    pub round_count: u32,
    pub show_timer_text: bool,
    pub show_progress_ring: bool,
}

/// One entry in the delayed-action queue. Display actions mutate the
/// controller itself; effect actions are handed to the sink when due.
#[derive(Debug, Clone)]
enum DelayedAction {
    Effect(EffectRequest),
    HideTimerText,
    HideProgressRing,
    ClearDisplay,
}

#[derive(Debug, Clone)]
struct ScheduledAction {
    fire_at: DateTime<Utc>,
    action: DelayedAction,
}

/// Owns one tracker and one state machine for the lifetime of a session
pub struct SessionController {
    config: SessionConfig,
    prefs: EffectPrefs,
    tracker: ElapsedTimeTracker,
    machine: SessionStateMachine,
    is_resuming: bool,
    show_timer_text: bool,
    show_progress_ring: bool,
    scheduled: Vec<ScheduledAction>,
    store: Box<dyn SnapshotStore + Send>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        prefs: EffectPrefs,
        store: Box<dyn SnapshotStore + Send>,
    ) -> Self {
        let machine = SessionStateMachine::new(&config);
        Self {
            config,
            prefs,
            tracker: ElapsedTimeTracker::new(),
            machine,
            is_resuming: false,
            show_timer_text: true,
            show_progress_ring: true,
            scheduled: Vec::new(),
            store,
        }
    }

    /// Rebuild a controller from a persisted snapshot. A snapshot that
    /// was running catches up on the first `tick` after restore.
    pub fn from_snapshot(snapshot: SessionSnapshot, store: Box<dyn SnapshotStore + Send>) -> Self {
        let mut machine = SessionStateMachine::new(&snapshot.config);
        machine.restore_phase(snapshot.phase, &snapshot.config);
        machine.set_running(snapshot.is_running);
        Self {
            config: snapshot.config,
            prefs: snapshot.prefs,
            tracker: ElapsedTimeTracker::from_parts(
                snapshot.start_instant,
                snapshot.accumulated_pause_seconds,
                snapshot.is_paused,
            ),
            machine,
            // A snapshot that was paused resumes instead of restarting
            is_resuming: snapshot.is_paused,
            show_timer_text: true,
            show_progress_ring: true,
            scheduled: Vec::new(),
            store,
        }
    }

    /// Replace the configuration and fully re-initialize to round 1
    pub fn configure(&mut self, config: SessionConfig) {
        info!(
            "Configuring session: rounds={}, round={}s, break={}s",
            config.round_count, config.round_length_seconds, config.break_length_seconds
        );
        self.config = config;
        self.reinitialize();
    }

    /// Stop everything and return to round 1 under the current config
    pub fn reset(&mut self) {
        info!("Resetting session");
        self.reinitialize();
    }

    fn reinitialize(&mut self) {
        self.tracker = ElapsedTimeTracker::new();
        self.machine = SessionStateMachine::new(&self.config);
        self.is_resuming = false;
        self.show_timer_text = true;
        self.show_progress_ring = true;
        self.scheduled.clear();
        self.persist();
    }

    /// Start a fresh phase, or resume one paused earlier. Returns the
    /// effects to request; resuming suppresses the phase-start cue.
    pub fn start(&mut self, now: DateTime<Utc>) -> Vec<EffectRequest> {
        let state = self.machine.state();
        if state.is_running || state.phase.is_completed() {
            return Vec::new();
        }

        let effects = if self.is_resuming {
            debug!("Resuming paused session");
            self.tracker.resume(now);
            self.is_resuming = false;
            Vec::new()
        } else {
            debug!("Starting session at {:?}", self.machine.state().phase);
            self.tracker.start(now);
            self.show_timer_text = true;
            self.show_progress_ring = true;
            self.phase_start_effects(self.machine.state().phase)
        };

        self.machine.set_running(true);
        self.persist();
        effects
    }

    /// Freeze the session. The next `start` resumes where this left off.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if !self.machine.state().is_running {
            return;
        }
        debug!("Pausing session");
        self.tracker.pause(now);
        self.machine.set_running(false);
        self.is_resuming = true;
        self.persist();
    }

    /// External dismissal. The only way an unbounded session reaches the
    /// completed state; skips the completion fanfare.
    pub fn stop(&mut self) {
        if self.machine.state().phase.is_completed() {
            return;
        }
        info!("Stopping session");
        self.tracker = ElapsedTimeTracker::new();
        self.machine.complete();
        self.is_resuming = false;
        self.persist();
    }

    /// Advance the session from the tracker's elapsed time. Returns the
    /// effects to request right now; delayed completion actions go on
    /// the internal queue instead.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<EffectRequest> {
        if !self.machine.state().is_running {
            return Vec::new();
        }

        let elapsed = self.tracker.elapsed_seconds(now);
        match self.machine.advance(elapsed, &self.config) {
            TransitionResult::NoTransition => Vec::new(),
            TransitionResult::PhaseStarted(phase) => {
                debug!("Entered {} {}", phase.name(), phase.index().unwrap_or(0));
                self.tracker.start(now);
                self.persist();
                self.phase_start_effects(phase)
            }
            TransitionResult::RoundRestarted => {
                debug!("Unbounded round restarted");
                self.tracker.start(now);
                self.persist();
                self.phase_start_effects(TimerPhase::Round(1))
            }
            TransitionResult::SessionCompleted => {
                info!("Session completed after {} rounds", self.config.round_count);
                self.schedule_completion_sequence(now);
                self.persist();
                // First pulse of the triple fires immediately
                self.completion_effects()
            }
        }
    }

    /// Pop every queued action whose fire time has arrived. Display
    /// actions are applied here; effect actions are returned for the
    /// sink.
    pub fn drain_due(&mut self, now: DateTime<Utc>) -> Vec<EffectRequest> {
        if self.scheduled.is_empty() {
            return Vec::new();
        }

        let mut due = Vec::new();
        let mut index = 0;
        while index < self.scheduled.len() {
            if self.scheduled[index].fire_at > now {
                index += 1;
                continue;
            }
            let entry = self.scheduled.remove(index);
            match entry.action {
                DelayedAction::Effect(effect) => due.push(effect),
                DelayedAction::HideTimerText => self.show_timer_text = false,
                DelayedAction::HideProgressRing => self.show_progress_ring = false,
                DelayedAction::ClearDisplay => self.clear_display(),
            }
        }
        due
    }

    /// Current read-only view for the presentation layer
    pub fn view(&self) -> SessionView {
        let state = self.machine.state();
        SessionView {
            phase: state.phase,
            seconds_remaining: state.seconds_remaining,
            progress: state.progress,
            is_running: state.is_running,
            is_completed: state.phase.is_completed(),
            current_round: state.phase.index().unwrap_or(self.config.round_count.max(1)),
            round_count: self.config.round_count,
            show_timer_text: self.show_timer_text,
            show_progress_ring: self.show_progress_ring,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Serialized form of the current session
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.machine.state();
        SessionSnapshot {
            config: self.config,
            prefs: self.prefs.clone(),
            phase: state.phase,
            start_instant: self.tracker.start_instant(),
            accumulated_pause_seconds: self.tracker.accumulated_pause_seconds(),
            is_paused: self.tracker.is_paused(),
            is_running: state.is_running,
        }
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        if let Err(e) = self.store.save(&snapshot) {
            warn!("Failed to persist session snapshot: {}", e);
        }
    }

    fn phase_start_effects(&self, phase: TimerPhase) -> Vec<EffectRequest> {
        let sound = match phase {
            TimerPhase::Round(_) => self.prefs.round_start_sound.clone(),
            TimerPhase::Break(_) => self.prefs.break_start_sound.clone(),
            TimerPhase::Completed => return Vec::new(),
        };

        let mut effects = Vec::new();
        if self.prefs.vibration_enabled {
            effects.push(EffectRequest::Haptic {
                strength: HapticStrength::Medium,
            });
        }
        effects.push(EffectRequest::Sound { id: sound });
        effects
    }

    fn completion_effects(&self) -> Vec<EffectRequest> {
        let mut effects = Vec::new();
        if self.prefs.vibration_enabled {
            effects.push(EffectRequest::Haptic {
                strength: HapticStrength::Heavy,
            });
        }
        effects.push(EffectRequest::Sound {
            id: self.prefs.session_end_sound.clone(),
        });
        effects
    }

    /// Queue the staged completion sequence: the second and third pulses
    /// of the triple, then the visual fade-out, then a full display
    /// reset. `configure`/`reset` discard whatever has not fired yet.
    fn schedule_completion_sequence(&mut self, now: DateTime<Utc>) {
        for offset_ms in [200, 400] {
            for effect in self.completion_effects() {
                self.scheduled.push(ScheduledAction {
                    fire_at: now + Duration::milliseconds(offset_ms),
                    action: DelayedAction::Effect(effect),
                });
            }
        }
        self.scheduled.push(ScheduledAction {
            fire_at: now + Duration::milliseconds(1_000),
            action: DelayedAction::HideTimerText,
        });
        self.scheduled.push(ScheduledAction {
            fire_at: now + Duration::milliseconds(3_000),
            action: DelayedAction::HideProgressRing,
        });
        self.scheduled.push(ScheduledAction {
            fire_at: now + Duration::milliseconds(5_000),
            action: DelayedAction::ClearDisplay,
        });
    }

    /// Final step of the completion sequence: back to round 1, not
    /// running, display elements left hidden until the next start.
    fn clear_display(&mut self) {
        self.tracker = ElapsedTimeTracker::new();
        self.machine = SessionStateMachine::new(&self.config);
        self.is_resuming = false;
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;

    use crate::session::{MemoryStore, SnapshotStore};
    use super::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_750_000_000 + seconds, 0).unwrap()
    }

    fn at_ms(millis: i64) -> DateTime<Utc> {
        at(0) + Duration::milliseconds(millis)
    }

    /// Store handle that lets tests observe what the controller persisted
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<MemoryStore>>);

    impl SharedStore {
        fn stored(&self) -> Option<SessionSnapshot> {
            self.0.lock().unwrap().load().unwrap()
        }
    }

    impl SnapshotStore for SharedStore {
        fn load(&self) -> anyhow::Result<Option<SessionSnapshot>> {
            self.0.lock().unwrap().load()
        }

        fn save(&mut self, snapshot: &SessionSnapshot) -> anyhow::Result<()> {
            self.0.lock().unwrap().save(snapshot)
        }

        fn clear(&mut self) -> anyhow::Result<()> {
            self.0.lock().unwrap().clear()
        }
    }

    fn controller(config: SessionConfig) -> SessionController {
        SessionController::new(config, EffectPrefs::default(), Box::new(MemoryStore::new()))
    }

    fn sounds(effects: &[EffectRequest]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                EffectRequest::Sound { id } => Some(id.as_str()),
                EffectRequest::Haptic { .. } => None,
            })
            .collect()
    }

    #[test]
    fn rounds_and_breaks_progress_on_schedule() {
        // rounds=3, round=60s, break=10s, started at t=0
        let mut c = controller(SessionConfig::new(3, 60, 10));
        let effects = c.start(at(0));
        assert_eq!(sounds(&effects), vec!["bowl"]);

        assert!(c.tick(at(59)).is_empty());
        assert_eq!(c.view().phase, TimerPhase::Round(1));
        assert_eq!(c.view().seconds_remaining, 1);

        let effects = c.tick(at(60));
        assert_eq!(c.view().phase, TimerPhase::Break(1));
        assert_eq!(sounds(&effects), vec!["bell"]);

        let effects = c.tick(at(70));
        assert_eq!(c.view().phase, TimerPhase::Round(2));
        assert_eq!(sounds(&effects), vec!["bowl"]);

        c.tick(at(130));
        assert_eq!(c.view().phase, TimerPhase::Break(2));
        c.tick(at(140));
        assert_eq!(c.view().phase, TimerPhase::Round(3));

        let effects = c.tick(at(200));
        assert_eq!(c.view().phase, TimerPhase::Completed);
        assert!(c.view().is_completed);
        assert!(!c.view().is_running);
        assert_eq!(sounds(&effects), vec!["gong"]);
    }

    #[test]
    fn pause_preserves_remaining_time_across_any_gap() {
        // 60s round, paused at t=30, resumed much later
        let mut c = controller(SessionConfig::new(1, 60, 0));
        c.start(at(0));
        c.tick(at(30));
        c.pause(at(30));
        assert!(!c.view().is_running);

        let effects = c.start(at(5_000));
        // Resuming does not replay the phase-start cue
        assert!(effects.is_empty());
        c.tick(at(5_000));
        assert_eq!(c.view().seconds_remaining, 30);
        assert!(c.view().is_running);
    }

    #[test]
    fn pause_twice_equals_pause_once() {
        let mut c = controller(SessionConfig::new(1, 60, 0));
        c.start(at(0));
        c.pause(at(20));
        c.pause(at(40));

        c.start(at(100));
        c.tick(at(110));
        assert_eq!(c.view().seconds_remaining, 30);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let mut c = controller(SessionConfig::new(1, 60, 0));
        c.start(at(0));
        assert!(c.start(at(10)).is_empty());
        c.tick(at(20));
        assert_eq!(c.view().seconds_remaining, 40);
    }

    #[test]
    fn unbounded_session_restarts_with_progress_reset() {
        let mut c = controller(SessionConfig::new(0, 5, 0));
        c.start(at(0));

        for cycle in 1i64..=4 {
            let effects = c.tick(at(cycle * 5));
            assert_eq!(c.view().phase, TimerPhase::Round(1));
            assert_eq!(c.view().progress, 0.0);
            assert!(!c.view().is_completed);
            assert_eq!(sounds(&effects), vec!["bowl"]);
        }
    }

    #[test]
    fn stop_is_the_only_completion_for_unbounded_sessions() {
        let mut c = controller(SessionConfig::new(0, 5, 0));
        c.start(at(0));
        c.tick(at(23));

        c.stop();
        assert!(c.view().is_completed);
        assert!(!c.view().is_running);
        // Dismissal does not schedule the completion fanfare
        assert!(c.drain_due(at(30)).is_empty());
    }

    #[test]
    fn completion_schedules_triple_pulse_and_fade_out() {
        let mut c = controller(SessionConfig::new(1, 5, 0));
        c.start(at(0));

        let immediate = c.tick(at(5));
        assert_eq!(sounds(&immediate), vec!["gong"]);
        assert!(immediate.contains(&EffectRequest::Haptic {
            strength: HapticStrength::Heavy
        }));

        // Nothing due yet at +0.1s
        assert!(c.drain_due(at_ms(5_100)).is_empty());

        let second = c.drain_due(at_ms(5_250));
        assert_eq!(sounds(&second), vec!["gong"]);
        let third = c.drain_due(at_ms(5_450));
        assert_eq!(sounds(&third), vec!["gong"]);

        assert!(c.view().show_timer_text);
        c.drain_due(at_ms(6_100));
        assert!(!c.view().show_timer_text);
        assert!(c.view().show_progress_ring);

        c.drain_due(at_ms(8_100));
        assert!(!c.view().show_progress_ring);

        // Full reset at +5s: back to round 1, display still hidden
        c.drain_due(at_ms(10_100));
        assert_eq!(c.view().phase, TimerPhase::Round(1));
        assert!(!c.view().is_completed);
        assert!(!c.view().show_timer_text);
        assert!(!c.view().show_progress_ring);
    }

    #[test]
    fn reset_discards_pending_completion_actions() {
        let mut c = controller(SessionConfig::new(1, 5, 0));
        c.start(at(0));
        c.tick(at(5));

        c.reset();
        assert!(c.drain_due(at(60)).is_empty());
        assert_eq!(c.view().phase, TimerPhase::Round(1));
        assert!(c.view().show_timer_text);
        assert!(c.view().show_progress_ring);
    }

    #[test]
    fn configure_reinitializes_under_the_new_config() {
        let mut c = controller(SessionConfig::new(1, 5, 0));
        c.start(at(0));
        c.tick(at(3));

        c.configure(SessionConfig::new(2, 30, 5));
        let view = c.view();
        assert_eq!(view.phase, TimerPhase::Round(1));
        assert_eq!(view.seconds_remaining, 30);
        assert_eq!(view.round_count, 2);
        assert!(!view.is_running);
    }

    #[test]
    fn snapshot_is_persisted_when_the_phase_changes() {
        let store = SharedStore::default();
        let mut c = SessionController::new(
            SessionConfig::new(2, 10, 0),
            EffectPrefs::default(),
            Box::new(store.clone()),
        );

        c.start(at(0));
        let stored = store.stored().unwrap();
        assert_eq!(stored.phase, TimerPhase::Round(1));
        assert_eq!(stored.start_instant, Some(at(0)));
        assert!(stored.is_running);

        c.tick(at(10));
        let stored = store.stored().unwrap();
        assert_eq!(stored.phase, TimerPhase::Round(2));
        assert_eq!(stored.start_instant, Some(at(10)));
    }

    #[test]
    fn restored_running_snapshot_catches_up_on_first_tick() {
        // Persist mid-round, then come back an hour later: the first
        // tick reports real elapsed time, not a stale reading.
        let mut c = controller(SessionConfig::new(1, 7_200, 0));
        c.start(at(0));
        let snapshot = c.snapshot();
        drop(c);

        let mut revived =
            SessionController::from_snapshot(snapshot, Box::new(MemoryStore::new()));
        revived.tick(at(3_600));
        assert_eq!(revived.view().seconds_remaining, 3_600);
        assert!(revived.view().is_running);
    }

    #[test]
    fn restored_paused_snapshot_resumes_instead_of_restarting() {
        let mut c = controller(SessionConfig::new(1, 60, 0));
        c.start(at(0));
        c.tick(at(30));
        c.pause(at(30));
        let snapshot = c.snapshot();

        let mut revived =
            SessionController::from_snapshot(snapshot, Box::new(MemoryStore::new()));
        let effects = revived.start(at(90_000));
        assert!(effects.is_empty());
        revived.tick(at(90_000));
        assert_eq!(revived.view().seconds_remaining, 30);
    }

    #[test]
    fn vibration_can_be_disabled() {
        let prefs = EffectPrefs {
            vibration_enabled: false,
            ..EffectPrefs::default()
        };
        let mut c = SessionController::new(
            SessionConfig::new(1, 5, 0),
            prefs,
            Box::new(MemoryStore::new()),
        );

        let effects = c.start(at(0));
        assert_eq!(effects, vec![EffectRequest::Sound { id: "bowl".to_string() }]);
    }
}
