//! Tokio backed scheduler

use std::{collections::HashMap, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{sleep, Instant},
};
use tracing::trace;

use super::{Scheduler, TimerHandle};

/// Scheduler that spawns one sleeping task per armed timer.
///
/// Elapsed handles are sent on the channel returned by [`TokioScheduler::new`]
/// and must be fed back to the controller by whoever owns it. Cancelling
/// aborts the sleeping task; a handle that was already sent is rejected by
/// the controller as stale.
#[derive(Debug)]
pub struct TokioScheduler {
    epoch: Instant,
    next_id: u64,
    fired_tx: mpsc::UnboundedSender<TimerHandle>,
    timers: HashMap<TimerHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Must be called from within a Tokio runtime
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerHandle>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            epoch: Instant::now(),
            next_id: 0,
            fired_tx,
            timers: HashMap::new(),
        };
        (scheduler, fired_rx)
    }

    /// Number of timer tasks still sleeping
    pub fn live_timers(&self) -> usize {
        self.timers.values().filter(|task| !task.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.timers.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let handle = TimerHandle::from_raw(self.next_id);
        let fired_tx = self.fired_tx.clone();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            if fired_tx.send(handle).is_err() {
                trace!("Timer {:?} elapsed after its flow shut down", handle);
            }
        });
        self.timers.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.timers.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (mut scheduler, mut fired_rx) = TokioScheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(1000));

        sleep(Duration::from_millis(999)).await;
        assert!(fired_rx.try_recv().is_err());

        sleep(Duration::from_millis(10)).await;
        assert_eq!(fired_rx.try_recv().ok(), Some(handle));
        assert!(scheduler.now() >= Duration::from_millis(1009));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (mut scheduler, mut fired_rx) = TokioScheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(500));
        scheduler.cancel(handle);

        sleep(Duration::from_millis(1000)).await;
        assert!(fired_rx.try_recv().is_err());
        assert_eq!(scheduler.live_timers(), 0);
    }
}
