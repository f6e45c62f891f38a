//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use tracing::{error, info};

use crate::session::SessionConfig;
use crate::state::AppState;
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Handle POST /configure - Replace the session configuration
pub async fn configure_handler(
    State(state): State<Arc<AppState>>,
    Json(config): Json<SessionConfig>,
) -> Result<Json<ApiResponse>, StatusCode> {
    // Invalid configurations never reach the session core
    if let Err(validation) = config.validate() {
        let session = state
            .current_view()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        info!("Rejected configuration: {}", validation);
        return Ok(Json(ApiResponse::error(validation, session)));
    }

    match state.command("configure", |c| {
        c.configure(config);
        c.view()
    }) {
        Ok(session) => {
            info!("Configure endpoint called - session reinitialized");
            Ok(Json(ApiResponse::idle(
                "Session configured".to_string(),
                session,
            )))
        }
        Err(e) => {
            error!("Failed to configure session: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start - Start or resume the session
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.command("start", |c| (c.start(Utc::now()), c.view())) {
        Ok((effects, session)) => {
            state.play_effects(&effects);
            info!("Start endpoint called - session running");
            Ok(Json(ApiResponse::running(
                "Session started".to_string(),
                session,
            )))
        }
        Err(e) => {
            error!("Failed to start session: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /pause - Pause the running session
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.command("pause", |c| {
        c.pause(Utc::now());
        c.view()
    }) {
        Ok(session) => {
            info!("Pause endpoint called - session paused");
            Ok(Json(ApiResponse::paused(
                "Session paused".to_string(),
                session,
            )))
        }
        Err(e) => {
            error!("Failed to pause session: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /reset - Reset the session to round 1
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.command("reset", |c| {
        c.reset();
        c.view()
    }) {
        Ok(session) => {
            info!("Reset endpoint called - session reset");
            Ok(Json(ApiResponse::idle("Session reset".to_string(), session)))
        }
        Err(e) => {
            error!("Failed to reset session: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /stop - Dismiss the session
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.command("stop", |c| {
        c.stop();
        c.view()
    }) {
        Ok(session) => {
            info!("Stop endpoint called - session dismissed");
            Ok(Json(ApiResponse::stopped(
                "Session stopped".to_string(),
                session,
            )))
        }
        Err(e) => {
            error!("Failed to stop session: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current session status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let (session, config) = {
        let controller = match state.controller.lock() {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to lock session controller: {}", e);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };
        (controller.view(), *controller.config())
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        session,
        config,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
