//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info, warn};

use crate::{
    error::SessionError,
    state::{AppState, Transition},
};

use super::responses::{
    ApiResponse, HealthResponse, IntervalsResponse, StartRequest, StatusResponse,
};

fn internal_error(err: SessionError) -> (StatusCode, String) {
    error!("Session state unavailable: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Handle POST /start - Begin a keep-awake session
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<StartRequest>>,
) -> Result<Json<ApiResponse>, (StatusCode, String)> {
    let label = body
        .and_then(|Json(request)| request.interval)
        .unwrap_or_else(|| state.default_interval().to_string());

    match state.start(&label) {
        Ok(Transition::Applied { to, .. }) => {
            info!("Start endpoint called - session started with {:?}", label);
            Ok(Json(ApiResponse::applied(
                format!("Session started with {label:?} interval"),
                to,
                state.display(),
            )))
        }
        Ok(Transition::Ignored { current }) => {
            info!("Start endpoint called while {}, ignoring", current);
            Ok(Json(ApiResponse::ignored(
                format!("Start ignored, session is already {current}"),
                current,
                state.display(),
            )))
        }
        Err(err @ SessionError::InvalidDurationLabel { .. }) => {
            warn!("Start rejected: {}", err);
            Err((StatusCode::BAD_REQUEST, err.to_string()))
        }
        Err(err) => Err(internal_error(err)),
    }
}

/// Handle POST /pause - Pause the running session
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, (StatusCode, String)> {
    match state.pause() {
        Ok(Transition::Applied { to, .. }) => {
            info!("Pause endpoint called - session paused");
            Ok(Json(ApiResponse::applied(
                "Session paused".to_string(),
                to,
                state.display(),
            )))
        }
        Ok(Transition::Ignored { current }) => Ok(Json(ApiResponse::ignored(
            format!("Pause ignored, session is {current}"),
            current,
            state.display(),
        ))),
        Err(err) => Err(internal_error(err)),
    }
}

/// Handle POST /resume - Resume a paused session
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, (StatusCode, String)> {
    match state.resume() {
        Ok(Transition::Applied { to, .. }) => {
            info!("Resume endpoint called - session resumed");
            Ok(Json(ApiResponse::applied(
                "Session resumed".to_string(),
                to,
                state.display(),
            )))
        }
        Ok(Transition::Ignored { current }) => Ok(Json(ApiResponse::ignored(
            format!("Resume ignored, session is {current}"),
            current,
            state.display(),
        ))),
        Err(err) => Err(internal_error(err)),
    }
}

/// Handle POST /stop - Stop the session and re-arm the fail-safe
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, (StatusCode, String)> {
    match state.stop() {
        Ok(Transition::Applied { from, to }) => {
            info!("Stop endpoint called - session stopped (was {})", from);
            Ok(Json(ApiResponse::applied(
                "Session stopped".to_string(),
                to,
                state.display(),
            )))
        }
        Ok(Transition::Ignored { current }) => Ok(Json(ApiResponse::ignored(
            "Stop ignored, no session is active".to_string(),
            current,
            state.display(),
        ))),
        Err(err) => Err(internal_error(err)),
    }
}

/// Handle GET /status - Return current session and server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    let overview = state.overview().map_err(internal_error)?;
    let (last_command, last_command_time) = state.get_last_command();

    Ok(Json(StatusResponse::from_overview(
        overview,
        state.display(),
        state.get_uptime(),
        state.port,
        state.host.clone(),
        last_command,
        last_command_time,
    )))
}

/// Handle GET /intervals - Return the fixed duration menu
pub async fn intervals_handler() -> Json<IntervalsResponse> {
    Json(IntervalsResponse::menu())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
