//! Host scheduling facility used by the controller

use std::time::Duration;

/// Identifies one scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wrap a raw id handed out by a scheduler
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Raw id of this handle
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Schedule-after-delay and cancel, plus a monotonic clock.
///
/// A scheduler never calls into the controller itself. When a timer elapses
/// the host delivers its handle to [`StepFlowController::fire`], which is what
/// lets a virtual clock and a channel-driven worker host the controller alike.
///
/// [`StepFlowController::fire`]: super::StepFlowController::fire
pub trait Scheduler {
    /// Time elapsed since the scheduler's epoch
    fn now(&self) -> Duration;

    /// Arrange for `handle` to be delivered once `delay` has elapsed
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Cancel a previously scheduled timer. Unknown handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}
