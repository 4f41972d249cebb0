//! Step Flow - A timed step-progression controller
//! 
//! This is the main entry point for the step-flow server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use step_flow::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::{spawn_flow, step_change_log_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("step_flow={},tower_http=info", config.log_level()))
        .init();

    info!("Starting step-flow server v{}", env!("CARGO_PKG_VERSION"));
    let flow_config = config.flow_config()?;
    info!("Configuration: host={}, port={}, steps={}, delay={}ms, loop={}, auto_start={}",
          config.host, config.port, flow_config.steps, flow_config.delay.as_millis(),
          flow_config.looping, flow_config.auto_start);

    // Start the flow runtime and the shared application state
    let flow = spawn_flow(flow_config);
    let state = Arc::new(AppState::new(flow.clone(), config.port, config.host.clone()));

    // Log step changes in the background
    let log_state = Arc::clone(&state);
    tokio::spawn(async move {
        step_change_log_task(log_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /pause        - Pause automatic progression");
    info!("  POST /resume       - Resume automatic progression");
    info!("  POST /next         - Move forward one step");
    info!("  POST /prev         - Move back one step");
    info!("  POST /goto/:index  - Jump to a step");
    info!("  POST /reset?to=N   - Reset to a step");
    info!("  GET  /status       - Check current step and timer");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = flow.shutdown().await {
        warn!("Flow runtime already stopped: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
