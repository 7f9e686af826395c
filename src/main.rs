//! Screen Awake - A state-managed HTTP server to keep a host awake
//!
//! This is the main entry point for the screen-awake application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use screen_awake::{
    config::Config,
    input::{Nudger, PointerNudger, PointerTracker},
    interval,
    state::AppState,
    api::create_router,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "screen_awake={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting screen-awake server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, interval={:?}",
        config.host, config.port, config.interval
    );

    // Fail fast on a default interval the session could never start with
    if let Err(e) = interval::parse(&config.interval) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    // Track the pointer so nudges move out and back from its real position
    let tracker = PointerTracker::spawn();
    let nudger: Arc<dyn Nudger> = Arc::new(PointerNudger::new(tracker));

    // Create application state
    let state = AppState::new(
        config.port,
        config.host.clone(),
        config.interval.clone(),
        nudger,
    );

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start     - Start a keep-awake session");
    info!("  POST /pause     - Pause the running session");
    info!("  POST /resume    - Resume a paused session");
    info!("  POST /stop      - Stop the session");
    info!("  GET  /status    - Check session status and timers");
    info!("  GET  /intervals - List selectable intervals");
    info!("  GET  /health    - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Stop any active session so the fail-safe is re-armed before exit
    if let Err(e) = state.stop() {
        warn!("Failed to stop session during shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
