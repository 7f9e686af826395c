//! Background tasks module
//!
//! This module contains the keep-awake worker and the display refreshers
//! that run alongside the HTTP server during a session.

pub mod display_ticker;
pub mod keep_awake;

// Re-export main functions
pub use display_ticker::{countdown_ticker_task, elapsed_ticker_task};
pub use keep_awake::keep_awake_task;
