//! Sit Still - A state-managed HTTP server for interval and meditation timing
//!
//! This is the main entry point for the sit-still application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use sit_still::{
    api::create_router,
    config::Config,
    effects::LogEffectSink,
    session::{JsonFileStore, MemoryStore, SessionController, SnapshotStore},
    state::AppState,
    tasks::session_tick_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("sit_still={},tower_http=info", config.log_level()))
        .init();

    info!("Starting sit-still server v1.0.0");
    info!(
        "Configuration: host={}, port={}, rounds={}, round={}s, break={}s",
        config.host, config.port, config.rounds, config.round_length, config.break_length
    );

    let session_config = config.session_config();
    if let Err(e) = session_config.validate() {
        tracing::error!("Invalid session configuration: {}", e);
        std::process::exit(1);
    }

    // Snapshot store: explicit --data-dir, then the platform data
    // directory, then memory-only as a last resort
    let store: Box<dyn SnapshotStore + Send> =
        match config.snapshot_path().or_else(JsonFileStore::default_path) {
            Some(path) => {
                info!("Persisting session snapshots to {}", path.display());
                Box::new(JsonFileStore::new(path))
            }
            None => {
                warn!("No data directory available, session snapshots are memory-only");
                Box::new(MemoryStore::new())
            }
        };

    // A session that was mid-flight when the process died is picked up
    // where the wall clock says it should be; anything else starts fresh
    // from the CLI configuration
    let snapshot = store.load().unwrap_or_else(|e| {
        warn!("Failed to load session snapshot: {}", e);
        None
    });
    let controller = match snapshot {
        Some(snap) if snap.is_running || snap.is_paused => {
            info!(
                "Restoring {} session at {} {}",
                if snap.is_paused { "paused" } else { "running" },
                snap.phase.name(),
                snap.phase.index().unwrap_or(0)
            );
            SessionController::from_snapshot(snap, store)
        }
        _ => SessionController::new(session_config, config.effect_prefs(), store),
    };

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        controller,
        Arc::new(LogEffectSink),
    ));

    // Start the session tick background task
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        session_tick_task(tick_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /configure - Replace the session configuration");
    info!("  POST /start     - Start or resume the session");
    info!("  POST /pause     - Pause the running session");
    info!("  POST /reset     - Reset the session to round 1");
    info!("  POST /stop      - Dismiss the session");
    info!("  GET  /status    - Check session status and timer");
    info!("  GET  /health    - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
