//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::effects::EffectPrefs;
use crate::session::SessionConfig;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "sit-still")]
#[command(about = "A state-managed HTTP server for interval and meditation timing")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Number of rounds per session (0 runs unbounded)
    #[arg(short, long, default_value = "4")]
    pub rounds: u32,

    /// Round length in seconds
    #[arg(long, default_value = "300")]
    pub round_length: u32,

    /// Break length in seconds (0 disables breaks)
    #[arg(long, default_value = "0")]
    pub break_length: u32,

    /// Disable haptic feedback requests
    #[arg(long)]
    pub no_vibration: bool,

    /// Sound id requested at round start
    #[arg(long, default_value = "bowl")]
    pub round_start_sound: String,

    /// Sound id requested at break start
    #[arg(long, default_value = "bell")]
    pub break_start_sound: String,

    /// Sound id requested when the session completes
    #[arg(long, default_value = "gong")]
    pub session_end_sound: String,

    /// Directory for the persisted session snapshot
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Default session configuration from the CLI flags
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.rounds, self.round_length, self.break_length)
    }

    /// Effect preferences from the CLI flags
    pub fn effect_prefs(&self) -> EffectPrefs {
        EffectPrefs {
            vibration_enabled: !self.no_vibration,
            round_start_sound: self.round_start_sound.clone(),
            break_start_sound: self.break_start_sound.clone(),
            session_end_sound: self.session_end_sound.clone(),
        }
    }

    /// Snapshot file path when a data directory was given explicitly
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("session.json"))
    }
}
