//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    interval::{DEFAULT_DURATION, DURATION_MENU},
    state::{DisplaySnapshot, SessionOverview, SessionState},
};

/// Request body for the start endpoint; the interval label is optional and
/// falls back to the configured default
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub interval: Option<String>,
}

/// API response structure for the command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionState,
    pub display: DisplaySnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, session: SessionState, display: DisplaySnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            session,
            display,
        }
    }

    /// The command took effect
    pub fn applied(message: String, session: SessionState, display: DisplaySnapshot) -> Self {
        Self::new("ok".to_string(), message, session, display)
    }

    /// The command was a no-op in the current state
    pub fn ignored(message: String, session: SessionState, display: DisplaySnapshot) -> Self {
        Self::new("noop".to_string(), message, session, display)
    }
}

/// Full status response with session and server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session: SessionState,
    pub worker_alive: bool,
    pub interval_label: Option<String>,
    pub interval_seconds: Option<u64>,
    pub remaining_seconds: Option<u64>,
    pub elapsed_seconds: Option<u64>,
    pub display: DisplaySnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_command: Option<String>,
    pub last_command_time: Option<DateTime<Utc>>,
}

impl StatusResponse {
    /// Assemble a status response from a session overview plus server metadata
    pub fn from_overview(
        overview: SessionOverview,
        display: DisplaySnapshot,
        uptime: String,
        port: u16,
        host: String,
        last_command: Option<String>,
        last_command_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            session: overview.state,
            worker_alive: overview.worker_alive,
            interval_label: overview.interval_label,
            interval_seconds: overview.interval_seconds,
            remaining_seconds: overview.remaining_seconds,
            elapsed_seconds: overview.elapsed_seconds,
            display,
            uptime,
            port,
            host,
            last_command,
            last_command_time,
        }
    }
}

/// The fixed duration menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalsResponse {
    pub intervals: Vec<String>,
    pub default: String,
}

impl IntervalsResponse {
    pub fn menu() -> Self {
        Self {
            intervals: DURATION_MENU.iter().map(|s| s.to_string()).collect(),
            default: DEFAULT_DURATION.to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
