//! Session tick background task

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::state::AppState;

/// Tick cadence. Sub-second only to keep the progress ring smooth and to
/// give the staged completion pulses their 0.2s spacing; whole-second
/// remaining time always derives from floored absolute elapsed time, so
/// it never moves faster than once per elapsed second.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Wall-clock gap between iterations that indicates the host slept
const SUSPEND_GAP_SECONDS: i64 = 5;

/// Background task that drives the session controller: one `tick(now)`
/// per iteration plus a drain of due delayed actions, with the returned
/// effect requests forwarded to the sink.
///
/// There is no catch-up logic for ticks missed during a suspension. The
/// first iteration after wake feeds the controller a fresh absolute
/// timestamp and the tracker recovers the full gap on its own.
pub async fn session_tick_task(state: Arc<AppState>) {
    info!("Starting session tick task");

    let mut ticker = interval(TICK_INTERVAL);
    // After a suspension the interval would otherwise fire in a burst
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_seen = Utc::now();

    loop {
        ticker.tick().await;
        let now = Utc::now();

        let gap = (now - last_seen).num_seconds();
        if gap >= SUSPEND_GAP_SECONDS {
            info!(
                "Wake-up detected after {}s gap, recovering elapsed time from absolute timestamps",
                gap
            );
        }
        last_seen = now;

        match state.with_controller(|controller| {
            let mut effects = controller.tick(now);
            effects.extend(controller.drain_due(now));
            effects
        }) {
            Ok(effects) => state.play_effects(&effects),
            Err(e) => {
                error!("Session tick failed: {}", e);
                // Back off instead of spinning on a poisoned lock
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
