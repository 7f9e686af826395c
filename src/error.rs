//! Error types for the session core and the nudge primitive

use thiserror::Error;

/// Errors surfaced by the session state machine and interval parsing
#[derive(Debug, Error)]
pub enum SessionError {
    /// The selected duration does not match the menu format
    #[error("invalid duration label {label:?} (expected \"<number> sec\" or \"<number> min\")")]
    InvalidDurationLabel { label: String },

    /// The session state lock was poisoned by a panicking holder
    #[error("session state lock poisoned")]
    StatePoisoned,
}

/// Errors returned by a [`Nudger`](crate::input::Nudger) when performing one action
#[derive(Debug, Error)]
pub enum NudgeError {
    /// The fail-safe aborted the nudge because the pointer sits in a guarded corner
    #[error("fail-safe interrupt: pointer at guarded corner ({x:.0}, {y:.0})")]
    FailSafeInterrupt { x: f64, y: f64 },

    /// Any other failure while simulating pointer movement
    #[error("pointer simulation failed: {0}")]
    Simulation(String),
}
