//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    state::{AppState, FlowSnapshot},
    tasks::FlowCommand,
};
use super::responses::{ApiResponse, HealthResponse, ResetParams, StatusResponse};

/// Apply a command and wrap the resulting snapshot, mapping a stopped runtime to 503
async fn run_command<F>(
    state: &AppState,
    command: FlowCommand,
    message: F,
) -> Result<Json<ApiResponse>, StatusCode>
where
    F: FnOnce(&FlowSnapshot) -> String,
{
    match state.apply(command).await {
        Ok(snapshot) => {
            let message = message(&snapshot);
            info!("{} endpoint called - {}", command.name(), message);
            Ok(Json(ApiResponse::new(message, snapshot)))
        }
        Err(e) => {
            error!("Failed to apply {}: {}", command.name(), e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /pause - Stop automatic progression
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, FlowCommand::Pause, |flow| match flow.remaining_ms {
        Some(remaining) => format!("Paused at step {} with {}ms remaining", flow.current, remaining),
        None => format!("Paused at step {}", flow.current),
    })
    .await
}

/// Handle POST /resume - Restart automatic progression
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, FlowCommand::Resume, |flow| {
        format!("Running from step {}", flow.current)
    })
    .await
}

/// Handle POST /next - Move forward one step
pub async fn next_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, FlowCommand::Next, |flow| format!("At step {}", flow.current)).await
}

/// Handle POST /prev - Move back one step
pub async fn prev_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, FlowCommand::Prev, |flow| format!("At step {}", flow.current)).await
}

/// Handle POST /goto/:index - Jump to a step
pub async fn goto_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, FlowCommand::GoTo(index), |flow| {
        if index < flow.steps {
            format!("Moved to step {}", index)
        } else {
            format!("Step {} is outside 0..{}, ignored", index, flow.steps)
        }
    })
    .await
}

/// Handle POST /reset?to=N - Jump to a step and restore the configured running state
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResetParams>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let index = params.to.unwrap_or(0);
    run_command(&state, FlowCommand::Reset(index), |flow| {
        format!("Reset to step {}", flow.current)
    })
    .await
}

/// Handle GET /status - Return current flow and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let flow = match state.flow.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to get flow snapshot: {}", e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        flow,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
        last_step_change_time: state.get_last_step_change().map(|(_, time)| time),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
