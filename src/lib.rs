//! Screen Awake - A state-managed HTTP server to keep a host awake
//!
//! This library coordinates a background keep-awake worker that nudges the
//! pointer on a user-chosen interval, a pause gate, and the display
//! refreshers that render countdown and elapsed-time feedback.

pub mod api;
pub mod config;
pub mod error;
pub mod input;
pub mod interval;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{NudgeError, SessionError};
pub use input::{Nudger, PointerNudger, PointerTracker};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
