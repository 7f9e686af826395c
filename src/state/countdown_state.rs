//! Countdown counter and its display rendering

use crate::interval;

use super::SessionState;

/// Countdown toward the next nudge, created on start and dropped on stop.
///
/// Two writers mutate it, both under the session lock: the worker resets it
/// to the full interval at each fresh cycle, and the countdown refresher
/// decrements it once per second while the session is running.
#[derive(Debug, Clone)]
pub struct CountdownState {
    pub remaining_seconds: u64,
    pub total_seconds: u64,
}

impl CountdownState {
    /// Create a fresh countdown at the full interval
    pub fn new(total_seconds: u64) -> Self {
        Self {
            remaining_seconds: total_seconds,
            total_seconds,
        }
    }

    /// Reset to the full interval (a fresh cycle)
    pub fn reset(&mut self) {
        self.remaining_seconds = self.total_seconds;
    }

    /// One display tick: decrement toward zero, never below
    pub fn decrement(&mut self) {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
    }

    /// Render the countdown label text for the given session phase.
    ///
    /// While time remains the text counts down regardless of pause state;
    /// at zero a running session shows the action text and a paused session
    /// shows that the pending action is held.
    pub fn text(&self, phase: SessionState) -> String {
        match phase {
            SessionState::Idle => String::new(),
            SessionState::Running | SessionState::Paused => {
                if self.remaining_seconds > 0 {
                    format!(
                        "Next action in: {}",
                        interval::format_countdown(self.remaining_seconds, self.total_seconds)
                    )
                } else if phase == SessionState::Running {
                    "Performing action...".to_string()
                } else {
                    "Next action: Paused".to_string()
                }
            }
        }
    }
}
