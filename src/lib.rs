//! Sit Still - A state-managed HTTP server for interval and meditation timing
//!
//! This library runs one interval/meditation session at a time: timed
//! rounds separated by breaks, for a configured number of repetitions or
//! unbounded. Elapsed time is anchored on absolute wall-clock timestamps
//! persisted to disk, so the session survives the host being suspended.

pub mod api;
pub mod config;
pub mod effects;
pub mod session;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use session::{SessionConfig, SessionController};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
