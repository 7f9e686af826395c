//! Display surface payloads
//!
//! `DisplaySnapshot` is the watch-channel payload a presentation layer
//! subscribes to; `SessionEvent` is the broadcast payload for cycle and
//! action notifications.

use serde::{Deserialize, Serialize};

/// Rendered display strings, updated by the state machine and the two
/// refresher tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    /// Status line, e.g. "Status: Idle"
    pub status: String,
    /// Countdown line, e.g. "Next action in: 00:45"; empty while idle
    pub countdown: String,
    /// Total running time as HH:MM:SS
    pub elapsed: String,
}

impl DisplaySnapshot {
    /// The snapshot shown while no session is active
    pub fn idle() -> Self {
        Self {
            status: "Status: Idle".to_string(),
            countdown: String::new(),
            elapsed: "00:00:00".to_string(),
        }
    }
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

/// Session notifications broadcast to any interested subscriber
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The worker began a fresh interval cycle
    CycleStarted { total_seconds: u64 },
    /// One nudge was performed
    NudgePerformed,
    /// A nudge failed; the worker keeps looping
    NudgeFailed { reason: String },
}
