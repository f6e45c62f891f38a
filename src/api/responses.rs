//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{SessionConfig, SessionView};

/// API response structure for session command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, session: SessionView) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            session,
        }
    }

    /// Create a running response
    pub fn running(message: String, session: SessionView) -> Self {
        Self::new("running".to_string(), message, session)
    }

    /// Create a paused response
    pub fn paused(message: String, session: SessionView) -> Self {
        Self::new("paused".to_string(), message, session)
    }

    /// Create an idle response
    pub fn idle(message: String, session: SessionView) -> Self {
        Self::new("idle".to_string(), message, session)
    }

    /// Create a stopped response
    pub fn stopped(message: String, session: SessionView) -> Self {
        Self::new("stopped".to_string(), message, session)
    }

    /// Create an error response
    pub fn error(message: String, session: SessionView) -> Self {
        Self::new("error".to_string(), message, session)
    }
}

/// Full status response with configuration and server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session: SessionView,
    pub config: SessionConfig,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: "1.0.0".to_string(),
        }
    }
}
