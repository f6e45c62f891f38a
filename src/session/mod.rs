//! Session timer core
//!
//! The round/break state machine, the background-safe elapsed-time
//! tracker, the controller that glues them together on a pulled tick,
//! and the snapshot persistence that survives process suspension.

pub mod config;
pub mod controller;
pub mod machine;
pub mod phase;
pub mod snapshot;
pub mod tracker;

// Re-export main types
pub use config::SessionConfig;
pub use controller::{SessionController, SessionView};
pub use machine::{SessionState, SessionStateMachine};
pub use phase::{TimerPhase, TransitionResult};
pub use snapshot::{JsonFileStore, MemoryStore, SessionSnapshot, SnapshotStore};
pub use tracker::ElapsedTimeTracker;
