//! Read-only view of a controller, published to observers

use serde::{Deserialize, Serialize};

/// Point-in-time view of a step flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub current: usize,
    pub running: bool,
    pub steps: usize,
    pub delay_ms: u64,
    pub looping: bool,
    /// Time captured by the last pause; cleared on resume and reset, so it
    /// is always `None` while running
    pub remaining_ms: Option<u64>,
}

impl FlowSnapshot {
    /// Status label used in API responses
    pub fn status(&self) -> &'static str {
        if self.running { "running" } else { "paused" }
    }
}
