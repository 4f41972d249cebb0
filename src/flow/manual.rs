//! Virtual clock scheduler for deterministic hosting and tests

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use super::{Scheduler, StepFlowController, TimerHandle};

/// Scheduler whose clock only moves when told to.
///
/// Keeps every pending deadline and counts scheduled and cancelled timers so
/// callers can check that no more than one timer is ever live.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerHandle, Duration>,
    scheduled: usize,
    cancellations: Arc<Mutex<Vec<TimerHandle>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers that are scheduled and not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled
    }

    pub fn cancelled_count(&self) -> usize {
        self.cancellations.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Shared log of cancelled handles, readable after the scheduler is dropped
    pub fn cancellations(&self) -> Arc<Mutex<Vec<TimerHandle>>> {
        Arc::clone(&self.cancellations)
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.values().min().copied()
    }

    /// Move the clock to `now` without delivering any timer
    pub(crate) fn set_now(&mut self, now: Duration) {
        self.now = now;
    }

    /// Remove the earliest timer due at or before `until` and move the clock to its deadline
    fn take_due(&mut self, until: Duration) -> Option<TimerHandle> {
        let deadline = self.next_deadline().filter(|deadline| *deadline <= until)?;
        let handle = self
            .pending
            .iter()
            .find(|(_, due)| **due == deadline)
            .map(|(handle, _)| *handle)?;

        self.pending.remove(&handle);
        self.now = self.now.max(deadline);
        Some(handle)
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle::from_raw(self.next_id);
        self.pending.insert(handle, self.now + delay);
        self.scheduled += 1;
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if self.pending.remove(&handle).is_some() {
            if let Ok(mut log) = self.cancellations.lock() {
                log.push(handle);
            }
        }
    }
}

impl StepFlowController<ManualScheduler> {
    /// Move the virtual clock forward by `by`, firing every timer that falls due.
    ///
    /// Timers armed while firing are fired too if their deadline lies inside
    /// the window.
    pub fn advance_time(&mut self, by: Duration) {
        let target = self.scheduler().now() + by;
        while let Some(handle) = self.scheduler_mut().take_due(target) {
            self.fire(handle);
        }
        self.scheduler_mut().set_now(target);
    }
}
