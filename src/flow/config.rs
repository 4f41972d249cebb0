//! Controller configuration fixed at creation

use std::time::Duration;

/// Delay used when none is configured
pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

/// Step count, cadence and looping behaviour of a controller.
///
/// `steps` and `delay` are expected to be non-zero; the controller does not
/// validate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub steps: usize,
    pub delay: Duration,
    pub auto_start: bool,
    pub looping: bool,
}

impl FlowConfig {
    /// Configuration for `steps` steps with the default delay, auto-start on, no looping
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            delay: DEFAULT_DELAY,
            auto_start: true,
            looping: false,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}
