//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::tasks::{FlowCommand, FlowError, FlowHandle};
use super::FlowSnapshot;

/// Main application state shared by the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    /// Handle to the flow runtime
    pub flow: FlowHandle,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Last step change observed by the log task
    pub last_step_change: Arc<Mutex<Option<(usize, DateTime<Utc>)>>>,
}

impl AppState {
    /// Create a new AppState around a running flow
    pub fn new(flow: FlowHandle, port: u16, host: String) -> Self {
        Self {
            flow,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            last_step_change: Arc::new(Mutex::new(None)),
        }
    }

    /// Forward a command to the flow runtime and record it as the last action
    pub async fn apply(&self, command: FlowCommand) -> Result<FlowSnapshot, FlowError> {
        info!("Applying {} action", command.name());
        let snapshot = self.flow.execute(command).await?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(command.name().to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(snapshot)
    }

    /// Record a step change notification
    pub fn record_step_change(&self, step: usize) {
        if let Ok(mut last_change) = self.last_step_change.lock() {
            *last_change = Some((step, Utc::now()));
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Get the last step change and when it happened
    pub fn get_last_step_change(&self) -> Option<(usize, DateTime<Utc>)> {
        self.last_step_change.lock().ok().and_then(|c| *c)
    }
}

fn format_uptime(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
