//! Interval selection menu and time formatting
//!
//! Pure functions only: label parsing and the display formats used by the
//! countdown and elapsed-time labels.

use crate::error::SessionError;

/// Fixed menu of selectable nudge intervals, in display order
pub const DURATION_MENU: [&str; 7] = [
    "30 sec", "1 min", "5 min", "10 min", "15 min", "30 min", "60 min",
];

/// Default menu selection (the first entry)
pub const DEFAULT_DURATION: &str = DURATION_MENU[0];

/// Immutable per-session interval configuration, parsed at start time
#[derive(Debug, Clone)]
pub struct IntervalConfig {
    pub label: String,
    pub total_seconds: u64,
}

impl IntervalConfig {
    /// Parse a menu label into a session configuration
    pub fn from_label(label: &str) -> Result<Self, SessionError> {
        Ok(Self {
            label: label.to_string(),
            total_seconds: parse(label)?,
        })
    }
}

/// Convert a duration label like "30 sec" or "5 min" into whole seconds.
///
/// Fails with [`SessionError::InvalidDurationLabel`] on anything outside the
/// `"<integer> <sec|min>"` format, including a zero value. The menu is
/// closed, so this should be unreachable from the UI; it still fails loudly
/// rather than defaulting.
pub fn parse(label: &str) -> Result<u64, SessionError> {
    let invalid = || SessionError::InvalidDurationLabel {
        label: label.to_string(),
    };

    let mut parts = label.split_whitespace();
    let (value, unit) = match (parts.next(), parts.next(), parts.next()) {
        (Some(value), Some(unit), None) => (value, unit),
        _ => return Err(invalid()),
    };

    let value: u64 = value.parse().map_err(|_| invalid())?;
    if value == 0 {
        return Err(invalid());
    }

    match unit.to_ascii_lowercase().as_str() {
        "sec" => Ok(value),
        "min" => Ok(value * 60),
        _ => Err(invalid()),
    }
}

/// Format the remaining countdown for display.
///
/// Sub-minute intervals render as `"NN sec"`, everything else as `"MM:SS"`.
pub fn format_countdown(remaining_seconds: u64, total_seconds: u64) -> String {
    if total_seconds < 60 {
        format!("{:02} sec", remaining_seconds)
    } else {
        let minutes = remaining_seconds / 60;
        let seconds = remaining_seconds % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Format elapsed wall time as `HH:MM:SS`
pub fn format_elapsed(elapsed_seconds: u64) -> String {
    let hours = elapsed_seconds / 3600;
    let minutes = (elapsed_seconds % 3600) / 60;
    let seconds = elapsed_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
