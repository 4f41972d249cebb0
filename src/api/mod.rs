//! HTTP API module
//! 
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/next", post(next_handler))
        .route("/prev", post(prev_handler))
        .route("/goto/:index", post(goto_handler))
        .route("/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{flow::FlowConfig, tasks::spawn_flow};

    fn test_router(config: FlowConfig) -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(spawn_flow(config), 0, "127.0.0.1".to_string()));
        (create_router(Arc::clone(&state)), state)
    }

    async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test(start_paused = true)]
    async fn test_health() {
        let (app, _) = test_router(FlowConfig::new(3));
        let (status, body) = call(&app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_endpoints() {
        let (app, _) = test_router(FlowConfig::new(3).auto_start(false));

        let (status, body) = call(&app, "POST", "/next").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flow"]["current"], 1);
        assert_eq!(body["status"], "paused");

        let (_, body) = call(&app, "POST", "/goto/2").await;
        assert_eq!(body["flow"]["current"], 2);

        let (_, body) = call(&app, "POST", "/goto/7").await;
        assert_eq!(body["flow"]["current"], 2);
        assert!(body["message"].as_str().unwrap().contains("ignored"));

        let (_, body) = call(&app, "POST", "/prev").await;
        assert_eq!(body["flow"]["current"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_resume_endpoints() {
        let (app, _) = test_router(FlowConfig::new(3));

        let (_, body) = call(&app, "POST", "/pause").await;
        assert_eq!(body["status"], "paused");
        assert!(body["flow"]["remaining_ms"].is_u64());

        let (_, body) = call(&app, "POST", "/resume").await;
        assert_eq!(body["status"], "running");
        assert!(body["flow"]["remaining_ms"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_endpoint() {
        let (app, _) = test_router(FlowConfig::new(4).auto_start(false));

        let (_, body) = call(&app, "POST", "/reset?to=2").await;
        assert_eq!(body["flow"]["current"], 2);
        assert_eq!(body["flow"]["running"], false);

        let (_, body) = call(&app, "POST", "/reset").await;
        assert_eq!(body["flow"]["current"], 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reports_last_action() {
        let (app, _) = test_router(FlowConfig::new(3).auto_start(false));
        call(&app, "POST", "/next").await;

        let (status, body) = call(&app, "GET", "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flow"]["current"], 1);
        assert_eq!(body["flow"]["steps"], 3);
        assert_eq!(body["last_action"], "next");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_flow_is_unavailable() {
        let (app, state) = test_router(FlowConfig::new(3));
        state.flow.shutdown().await.unwrap();

        let (status, _) = call(&app, "POST", "/pause").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let (status, _) = call(&app, "GET", "/status").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
