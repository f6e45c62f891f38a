//! State management module
//!
//! Shared ownership wrapper around the session controller plus server
//! metadata.

pub mod app_state;

// Re-export main types
pub use app_state::AppState;
