//! Mutable record owned by a controller

use std::time::Duration;

use crate::flow::TimerHandle;

/// Per-timeline state mutated only by the controller's operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowState {
    /// Active step
    pub current: usize,
    /// Whether automatic advancement is armed
    pub running: bool,
    /// Unconsumed part of the interval captured by the last pause
    pub remaining: Option<Duration>,
    /// The single outstanding timer, if any
    pub pending: Option<TimerHandle>,
    /// Scheduler time at which `pending` was armed
    pub armed_at: Duration,
}

impl FlowState {
    /// Fresh state at step 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly armed timer
    pub fn arm(&mut self, handle: TimerHandle, now: Duration) {
        self.pending = Some(handle);
        self.armed_at = now;
    }

    /// Time elapsed at `now` since the last timer was armed
    pub fn elapsed_since_arm(&self, now: Duration) -> Duration {
        now.saturating_sub(self.armed_at)
    }
}
