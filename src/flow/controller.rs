//! Step flow controller: timed auto-advance with pause/resume and manual navigation

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{FlowConfig, Scheduler, TimerHandle};
use crate::state::{FlowSnapshot, FlowState};

/// Callback invoked with the new step after every change of the current step
pub type StepCallback = Box<dyn FnMut(usize) + Send>;

/// Advances a cursor through a fixed number of steps on a fixed delay.
///
/// At most one timer is pending at any time. Every operation that replaces
/// or stops the timer cancels the outstanding one before returning, and a
/// fire delivered for any handle other than the pending one is discarded.
/// Dropping the controller cancels its pending timer.
pub struct StepFlowController<S: Scheduler> {
    config: FlowConfig,
    state: FlowState,
    scheduler: S,
    on_step_change: Option<StepCallback>,
}

impl<S: Scheduler> StepFlowController<S> {
    /// Create a controller at step 0, arming the first timer if `auto_start` is set
    pub fn new(config: FlowConfig, scheduler: S) -> Self {
        let mut controller = Self {
            config,
            state: FlowState::new(),
            scheduler,
            on_step_change: None,
        };
        if controller.config.auto_start {
            controller.start();
        }
        controller
    }

    /// Register the step change callback
    pub fn on_step_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.on_step_change = Some(Box::new(callback));
        self
    }

    pub fn current(&self) -> usize {
        self.state.current
    }

    pub fn running(&self) -> bool {
        self.state.running
    }

    /// Time captured by the last pause, if it has not been consumed yet
    pub fn remaining(&self) -> Option<Duration> {
        self.state.remaining
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub(crate) fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Handle of the outstanding timer
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.state.pending
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            current: self.state.current,
            running: self.state.running,
            steps: self.config.steps,
            delay_ms: self.config.delay.as_millis() as u64,
            looping: self.config.looping,
            remaining_ms: self.state.remaining.map(|r| r.as_millis() as u64),
        }
    }

    fn start(&mut self) {
        self.state.running = true;
        self.schedule_next(self.config.delay);
    }

    /// Deliver an elapsed timer. Returns whether it was the pending one.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.state.pending != Some(handle) || !self.state.running {
            debug!("Ignoring stale timer {:?}", handle);
            return false;
        }
        self.state.pending = None;
        self.advance_automatically();
        true
    }

    fn advance_automatically(&mut self) {
        let previous = self.state.current;
        let next = previous + 1;

        if next < self.config.steps {
            self.state.current = next;
            self.schedule_next(self.config.delay);
        } else if self.config.looping {
            self.state.current = 0;
            self.schedule_next(self.config.delay);
        } else {
            self.state.running = false;
            debug!("Reached last step {}, automatic progression stopped", previous);
        }

        debug!("Auto-advance {} -> {}", previous, self.state.current);
        self.notify_if_changed(previous);
    }

    /// Stop automatic progression, keeping the unconsumed part of the interval
    pub fn pause(&mut self) {
        if !self.state.running {
            debug!("Pause ignored, flow is not running");
            return;
        }
        self.clear_timer();
        let elapsed = self.state.elapsed_since_arm(self.scheduler.now());
        let remaining = self.config.delay.saturating_sub(elapsed);
        self.state.remaining = Some(remaining);
        self.state.running = false;
        info!("Paused at step {} with {}ms remaining", self.state.current, remaining.as_millis());
    }

    /// Restart automatic progression, honouring time captured by a prior pause
    pub fn resume(&mut self) {
        if self.state.running {
            debug!("Resume ignored, flow is already running");
            return;
        }
        let interval = self.state.remaining.take().unwrap_or(self.config.delay);
        self.state.running = true;
        self.schedule_next(interval);
        info!("Resumed at step {}, next advance in {}ms", self.state.current, interval.as_millis());
    }

    /// Move forward one step without touching the timer
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        let previous = self.state.current;
        let next = previous + 1;
        self.state.current = if next >= self.config.steps {
            if self.config.looping { 0 } else { previous }
        } else {
            next
        };
        self.notify_if_changed(previous);
    }

    /// Move back one step without touching the timer
    pub fn prev(&mut self) {
        let previous = self.state.current;
        self.state.current = match previous.checked_sub(1) {
            Some(prev) => prev,
            None if self.config.looping => self.config.steps.saturating_sub(1),
            None => 0,
        };
        self.notify_if_changed(previous);
    }

    /// Jump to `index`; indices outside the step range are ignored
    pub fn go_to(&mut self, index: usize) {
        if index >= self.config.steps {
            debug!("Ignoring go_to({}) outside 0..{}", index, self.config.steps);
            return;
        }
        let previous = self.state.current;
        self.state.current = index;
        self.notify_if_changed(previous);
    }

    /// Jump to `index` and restore the configured running state.
    ///
    /// The index is not bounds checked.
    pub fn reset(&mut self, index: usize) {
        if index >= self.config.steps {
            warn!("Resetting to step {} outside 0..{}", index, self.config.steps);
        }
        self.clear_timer();
        let previous = self.state.current;
        self.state.current = index;
        self.state.remaining = None;
        self.state.running = self.config.auto_start;
        if self.config.auto_start {
            self.schedule_next(self.config.delay);
        }
        info!("Reset to step {} (running: {})", index, self.state.running);
        self.notify_if_changed(previous);
    }

    fn schedule_next(&mut self, interval: Duration) {
        self.clear_timer();
        let handle = self.scheduler.schedule(interval);
        let now = self.scheduler.now();
        self.state.arm(handle, now);
    }

    fn clear_timer(&mut self) {
        if let Some(handle) = self.state.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn notify_if_changed(&mut self, previous: usize) {
        let current = self.state.current;
        if current == previous {
            return;
        }
        if let Some(callback) = self.on_step_change.as_mut() {
            callback(current);
        }
    }
}

impl<S: Scheduler> Drop for StepFlowController<S> {
    fn drop(&mut self) {
        self.clear_timer();
    }
}

impl<S: Scheduler + fmt::Debug> fmt::Debug for StepFlowController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepFlowController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
