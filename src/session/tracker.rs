//! Elapsed-time tracking anchored on absolute wall-clock timestamps
//!
//! The tracker never reads the clock itself; every operation takes `now`
//! from the caller. Elapsed time is the distance between two absolute
//! timestamps plus a pause baseline, so a session recovers correctly
//! after the host process was suspended for any length of time: no tick
//! has to fire during the gap, only the start instant has to survive it.

use chrono::{DateTime, Utc};

/// Converts "now" into whole seconds elapsed since the logical start of
/// the active phase, across pauses and process suspensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElapsedTimeTracker {
    start_instant: Option<DateTime<Utc>>,
    accumulated_pause_seconds: u64,
    is_paused: bool,
}

impl ElapsedTimeTracker {
    /// Create a tracker with no phase in flight
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tracker from persisted parts
    pub fn from_parts(
        start_instant: Option<DateTime<Utc>>,
        accumulated_pause_seconds: u64,
        is_paused: bool,
    ) -> Self {
        Self {
            start_instant,
            accumulated_pause_seconds,
            is_paused,
        }
    }

    /// Begin timing a fresh phase. Not used for resuming: resuming goes
    /// through [`resume`](Self::resume) so the pause baseline survives.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.start_instant = Some(now);
        self.accumulated_pause_seconds = 0;
        self.is_paused = false;
    }

    /// Freeze elapsed time at its current value. Idempotent.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.is_paused {
            return;
        }
        self.accumulated_pause_seconds = self.elapsed_seconds(now);
        self.is_paused = true;
        self.start_instant = None;
    }

    /// Continue accumulating from the frozen baseline. No-op unless paused.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.is_paused {
            return;
        }
        self.start_instant = Some(now);
        self.is_paused = false;
    }

    /// Whole seconds elapsed since the logical phase start.
    ///
    /// A `now` earlier than the stored start instant (device clock moved
    /// backwards) clamps to zero instead of going negative.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.start_instant {
            Some(start) if !self.is_paused => {
                let since_start = (now - start).num_seconds().max(0) as u64;
                since_start + self.accumulated_pause_seconds
            }
            _ => self.accumulated_pause_seconds,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.start_instant
    }

    pub fn accumulated_pause_seconds(&self) -> u64 {
        self.accumulated_pause_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_750_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn elapsed_counts_from_start() {
        let mut tracker = ElapsedTimeTracker::new();
        tracker.start(at(0));
        assert_eq!(tracker.elapsed_seconds(at(0)), 0);
        assert_eq!(tracker.elapsed_seconds(at(42)), 42);
    }

    #[test]
    fn pause_freezes_elapsed_regardless_of_wall_clock() {
        let mut tracker = ElapsedTimeTracker::new();
        tracker.start(at(0));
        tracker.pause(at(30));
        assert_eq!(tracker.elapsed_seconds(at(30)), 30);
        assert_eq!(tracker.elapsed_seconds(at(9_000)), 30);
    }

    #[test]
    fn resume_continues_from_the_pause_baseline() {
        let mut tracker = ElapsedTimeTracker::new();
        tracker.start(at(0));
        tracker.pause(at(30));
        tracker.resume(at(500));
        assert_eq!(tracker.elapsed_seconds(at(500)), 30);
        assert_eq!(tracker.elapsed_seconds(at(510)), 40);
    }

    #[test]
    fn pause_is_idempotent() {
        let mut tracker = ElapsedTimeTracker::new();
        tracker.start(at(0));
        tracker.pause(at(30));
        tracker.pause(at(100));
        assert_eq!(tracker.elapsed_seconds(at(200)), 30);
    }

    #[test]
    fn resume_without_pause_is_a_no_op() {
        let mut tracker = ElapsedTimeTracker::new();
        tracker.start(at(0));
        tracker.resume(at(10));
        assert_eq!(tracker.elapsed_seconds(at(20)), 20);
    }

    #[test]
    fn clock_rollback_clamps_to_zero() {
        let mut tracker = ElapsedTimeTracker::new();
        tracker.start(at(100));
        assert_eq!(tracker.elapsed_seconds(at(40)), 0);
    }

    #[test]
    fn long_suspension_gap_is_recovered_exactly() {
        let mut tracker = ElapsedTimeTracker::new();
        tracker.start(at(0));

        // Rebuild from persisted parts, as if the process died and came back
        let revived = ElapsedTimeTracker::from_parts(
            tracker.start_instant(),
            tracker.accumulated_pause_seconds(),
            tracker.is_paused(),
        );
        assert_eq!(revived.elapsed_seconds(at(3_600)), 3_600);
    }

    #[test]
    fn start_resets_the_pause_baseline() {
        let mut tracker = ElapsedTimeTracker::new();
        tracker.start(at(0));
        tracker.pause(at(30));
        tracker.start(at(100));
        assert_eq!(tracker.elapsed_seconds(at(110)), 10);
        assert!(!tracker.is_paused());
    }
}
