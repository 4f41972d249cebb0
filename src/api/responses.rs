//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::FlowSnapshot;

/// API response structure for flow control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub flow: FlowSnapshot,
}

impl ApiResponse {
    /// Create a response whose status reflects the flow's running state
    pub fn new(message: String, flow: FlowSnapshot) -> Self {
        Self {
            status: flow.status().to_string(),
            message,
            timestamp: Utc::now(),
            flow,
        }
    }
}

/// Query parameters accepted by POST /reset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetParams {
    pub to: Option<usize>,
}

/// Status response with server and flow information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub flow: FlowSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
    pub last_step_change_time: Option<DateTime<Utc>>,
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
