//! Main application state management

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::warn;

use crate::effects::{EffectRequest, EffectSink};
use crate::session::{SessionController, SessionView};

/// Shared application state: the session controller behind a lock, the
/// effect sink, and server metadata.
pub struct AppState {
    /// The one session this server manages
    pub controller: Mutex<SessionController>,
    /// Collaborator that renders requested sounds and haptics
    pub sink: Arc<dyn EffectSink>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel publishing the session view after every mutation
    pub view_tx: watch::Sender<SessionView>,
    /// Keep the receiver alive to prevent channel closure
    pub _view_rx: watch::Receiver<SessionView>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        controller: SessionController,
        sink: Arc<dyn EffectSink>,
    ) -> Self {
        let (view_tx, view_rx) = watch::channel(controller.view());

        Self {
            controller: Mutex::new(controller),
            sink,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            view_tx,
            _view_rx: view_rx,
        }
    }

    /// Run a command against the controller, record it as the last
    /// action, and publish the updated view.
    pub fn command<T>(
        &self,
        action: &str,
        f: impl FnOnce(&mut SessionController) -> T,
    ) -> Result<T, String> {
        let result = self.with_controller(f)?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(result)
    }

    /// Run a closure against the controller and publish the updated
    /// view, without touching last-action tracking. Used by the tick
    /// loop, which is not a client action.
    pub fn with_controller<T>(
        &self,
        f: impl FnOnce(&mut SessionController) -> T,
    ) -> Result<T, String> {
        let mut controller = self
            .controller
            .lock()
            .map_err(|e| format!("Failed to lock session controller: {}", e))?;

        let result = f(&mut controller);
        let view = controller.view();
        drop(controller);

        if let Err(e) = self.view_tx.send(view) {
            warn!("Failed to publish session view: {}", e);
        }

        Ok(result)
    }

    /// Current session view without mutating anything
    pub fn current_view(&self) -> Result<SessionView, String> {
        self.controller
            .lock()
            .map(|controller| controller.view())
            .map_err(|e| format!("Failed to lock session controller: {}", e))
    }

    /// Forward effect requests to the sink. Sink failures are the
    /// sink's problem; session state is already settled by now.
    pub fn play_effects(&self, effects: &[EffectRequest]) {
        for effect in effects {
            self.sink.play(effect);
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use crate::effects::{EffectPrefs, LogEffectSink};
    use crate::session::{MemoryStore, SessionConfig, TimerPhase};
    use super::*;

    fn app_state() -> AppState {
        let controller = SessionController::new(
            SessionConfig::new(2, 10, 0),
            EffectPrefs::default(),
            Box::new(MemoryStore::new()),
        );
        AppState::new(20554, "127.0.0.1".to_string(), controller, Arc::new(LogEffectSink))
    }

    #[test]
    fn command_records_the_last_action() {
        let state = app_state();
        state.command("start", |c| c.start(Utc::now())).unwrap();

        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("start"));
        assert!(time.is_some());
    }

    #[test]
    fn views_are_published_to_watchers() {
        let state = app_state();
        let rx = state.view_tx.subscribe();

        state.command("start", |c| c.start(Utc::now())).unwrap();
        assert!(rx.borrow().is_running);
        assert_eq!(rx.borrow().phase, TimerPhase::Round(1));
    }

    #[test]
    fn tick_driving_does_not_count_as_an_action() {
        let state = app_state();
        state.with_controller(|c| c.tick(Utc::now())).unwrap();

        let (action, _) = state.get_last_action();
        assert!(action.is_none());
    }
}
