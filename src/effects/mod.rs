//! Side-effect requests and the collaborator that renders them
//!
//! The session core only decides *when* a sound or haptic should
//! happen; rendering is the job of an [`EffectSink`] collaborator.
//! Sound identifiers are opaque to the core and pass straight through
//! from configuration.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Strength of a requested haptic pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HapticStrength {
    Medium,
    Heavy,
}

/// A single side effect the session core wants performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectRequest {
    Sound { id: String },
    Haptic { strength: HapticStrength },
}

/// User preferences for which effects accompany which phase changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectPrefs {
    pub vibration_enabled: bool,
    pub round_start_sound: String,
    pub break_start_sound: String,
    pub session_end_sound: String,
}

impl Default for EffectPrefs {
    fn default() -> Self {
        Self {
            vibration_enabled: true,
            round_start_sound: "bowl".to_string(),
            break_start_sound: "bell".to_string(),
            session_end_sound: "gong".to_string(),
        }
    }
}

/// Renders effect requests. Implementations must keep failures to
/// themselves: a sound that cannot play never affects session state.
pub trait EffectSink: Send + Sync {
    fn play(&self, effect: &EffectRequest);
}

/// Sink that renders effect requests as log events. Stands in for the
/// audio/haptics layer a UI client would provide.
pub struct LogEffectSink;

impl EffectSink for LogEffectSink {
    fn play(&self, effect: &EffectRequest) {
        match effect {
            // "none" is the configured way to silence a cue
            EffectRequest::Sound { id } if id == "none" => {}
            EffectRequest::Sound { id } => info!("Playing sound: {}", id),
            EffectRequest::Haptic { strength } => {
                info!("Triggering {:?} haptic pulse", strength)
            }
        }
    }
}
