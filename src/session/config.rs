//! Session configuration

use serde::{Deserialize, Serialize};

/// Immutable per-session configuration supplied by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of rounds in the session; 0 selects unbounded mode
    pub round_count: u32,
    /// Length of one round in seconds, at least 1
    pub round_length_seconds: u32,
    /// Length of the break between rounds in seconds; 0 disables breaks
    pub break_length_seconds: u32,
}

impl SessionConfig {
    pub fn new(round_count: u32, round_length_seconds: u32, break_length_seconds: u32) -> Self {
        Self {
            round_count,
            round_length_seconds,
            break_length_seconds,
        }
    }

    /// Check whether this session cycles forever instead of counting rounds
    pub fn is_unbounded(&self) -> bool {
        self.round_count == 0
    }

    /// Validate the configuration at the boundary, before it reaches the core
    pub fn validate(&self) -> Result<(), String> {
        if self.round_length_seconds == 0 {
            return Err("round length must be at least 1 second".to_string());
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            round_count: 4,
            round_length_seconds: 300,
            break_length_seconds: 0,
        }
    }
}
