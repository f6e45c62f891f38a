//! Durable session snapshots
//!
//! Everything the tracker needs to reconstruct elapsed time after the
//! host process was suspended or killed lives in [`SessionSnapshot`]:
//! the absolute start instant, the pause baseline, and the phase it
//! belongs to. The controller writes a snapshot through a
//! [`SnapshotStore`] whenever one of those fields changes.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::effects::EffectPrefs;
use super::{SessionConfig, TimerPhase};

/// Serialized form of one session, sufficient to rebuild the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub config: SessionConfig,
    pub prefs: EffectPrefs,
    pub phase: TimerPhase,
    pub start_instant: Option<DateTime<Utc>>,
    pub accumulated_pause_seconds: u64,
    pub is_paused: bool,
    pub is_running: bool,
}

/// Persistence capability injected into the controller
pub trait SnapshotStore {
    /// Load the stored snapshot. Missing or unreadable state resolves to
    /// `Ok(None)` so a corrupt file degrades to "no prior session".
    fn load(&self) -> Result<Option<SessionSnapshot>>;

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()>;

    fn clear(&mut self) -> Result<()>;
}

/// Snapshot store backed by a JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Snapshot path under the platform data directory
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "sit-still")
            .map(|dirs| dirs.data_local_dir().join("session.json"))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<SessionSnapshot>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read session snapshot from {}", self.path.display())
                })
            }
        };

        match serde_json::from_str(&data) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!("Discarding unreadable session snapshot: {}", e);
                Ok(None)
            }
        }
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create snapshot directory {}", parent.display())
            })?;
        }
        let data = serde_json::to_string_pretty(snapshot)
            .context("failed to serialize session snapshot")?;
        fs::write(&self.path, data).with_context(|| {
            format!("failed to write session snapshot to {}", self.path.display())
        })
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("failed to remove session snapshot {}", self.path.display())
            }),
        }
    }
}

/// In-memory store, used when no data directory is available and by tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Option<SessionSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<SessionSnapshot>> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        self.snapshot = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }
}
