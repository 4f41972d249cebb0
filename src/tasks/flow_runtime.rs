//! Flow runtime background task
//!
//! Hosts a [`StepFlowController`] on a Tokio task. The task owns the
//! controller outright and serialises timer fires and caller commands through
//! a single `select!` loop, so every decision reads the latest state.

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, trace};

use crate::{
    flow::{FlowConfig, StepFlowController, TimerHandle, TokioScheduler},
    state::FlowSnapshot,
};

/// Errors returned by a [`FlowHandle`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("flow runtime has stopped")]
    Stopped,
}

/// Operations a caller can request from the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowCommand {
    Pause,
    Resume,
    Next,
    Prev,
    GoTo(usize),
    Reset(usize),
    Snapshot,
    Shutdown,
}

impl FlowCommand {
    /// Short action name used for logging and last action tracking
    pub fn name(&self) -> &'static str {
        match self {
            FlowCommand::Pause => "pause",
            FlowCommand::Resume => "resume",
            FlowCommand::Next => "next",
            FlowCommand::Prev => "prev",
            FlowCommand::GoTo(_) => "goto",
            FlowCommand::Reset(_) => "reset",
            FlowCommand::Snapshot => "snapshot",
            FlowCommand::Shutdown => "shutdown",
        }
    }

    fn apply(self, controller: &mut StepFlowController<TokioScheduler>) {
        match self {
            FlowCommand::Pause => controller.pause(),
            FlowCommand::Resume => controller.resume(),
            FlowCommand::Next => controller.next(),
            FlowCommand::Prev => controller.prev(),
            FlowCommand::GoTo(index) => controller.go_to(index),
            FlowCommand::Reset(index) => controller.reset(index),
            FlowCommand::Snapshot | FlowCommand::Shutdown => {}
        }
    }
}

#[derive(Debug)]
struct FlowRequest {
    command: FlowCommand,
    reply: oneshot::Sender<FlowSnapshot>,
}

/// Cloneable handle to a running flow
#[derive(Debug, Clone)]
pub struct FlowHandle {
    command_tx: mpsc::Sender<FlowRequest>,
    snapshot_rx: watch::Receiver<FlowSnapshot>,
    step_tx: broadcast::Sender<usize>,
}

/// Spawn a flow runtime for `config`.
///
/// Must be called from within a Tokio runtime. The runtime stops on
/// [`FlowHandle::shutdown`] or once every handle is dropped, cancelling its
/// pending timer.
pub fn spawn_flow(config: FlowConfig) -> FlowHandle {
    let (command_tx, command_rx) = mpsc::channel(32);
    let (step_tx, _) = broadcast::channel(100);
    let (scheduler, fired_rx) = TokioScheduler::new();

    let notify_tx = step_tx.clone();
    let controller = StepFlowController::new(config, scheduler).on_step_change(move |step| {
        if notify_tx.send(step).is_err() {
            trace!("No subscribers for step change to {}", step);
        }
    });

    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
    tokio::spawn(flow_runtime_task(controller, command_rx, fired_rx, snapshot_tx));

    FlowHandle {
        command_tx,
        snapshot_rx,
        step_tx,
    }
}

async fn flow_runtime_task(
    mut controller: StepFlowController<TokioScheduler>,
    mut command_rx: mpsc::Receiver<FlowRequest>,
    mut fired_rx: mpsc::UnboundedReceiver<TimerHandle>,
    snapshot_tx: watch::Sender<FlowSnapshot>,
) {
    let config = controller.config();
    info!(
        "Starting flow runtime: {} steps every {}ms (loop: {}, auto start: {})",
        config.steps,
        config.delay.as_millis(),
        config.looping,
        config.auto_start
    );

    loop {
        tokio::select! {
            biased;

            Some(handle) = fired_rx.recv() => {
                if controller.fire(handle) {
                    snapshot_tx.send_replace(controller.snapshot());
                }
            }

            request = command_rx.recv() => {
                let Some(FlowRequest { command, reply }) = request else {
                    debug!("All flow handles dropped");
                    break;
                };

                debug!("Flow runtime received command: {:?}", command);
                command.apply(&mut controller);
                let snapshot = controller.snapshot();
                snapshot_tx.send_replace(snapshot.clone());

                if reply.send(snapshot).is_err() {
                    debug!("Caller stopped waiting for {} reply", command.name());
                }
                if command == FlowCommand::Shutdown {
                    break;
                }
            }
        }
    }

    // Dropping the controller cancels its pending timer
    drop(controller);
    info!("Flow runtime stopped");
}

impl FlowHandle {
    /// Send a command and wait for the resulting snapshot
    pub async fn execute(&self, command: FlowCommand) -> Result<FlowSnapshot, FlowError> {
        let (reply, reply_rx) = oneshot::channel();
        self.command_tx
            .send(FlowRequest { command, reply })
            .await
            .map_err(|_| FlowError::Stopped)?;
        reply_rx.await.map_err(|_| FlowError::Stopped)
    }

    pub async fn pause(&self) -> Result<FlowSnapshot, FlowError> {
        self.execute(FlowCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<FlowSnapshot, FlowError> {
        self.execute(FlowCommand::Resume).await
    }

    pub async fn next(&self) -> Result<FlowSnapshot, FlowError> {
        self.execute(FlowCommand::Next).await
    }

    pub async fn prev(&self) -> Result<FlowSnapshot, FlowError> {
        self.execute(FlowCommand::Prev).await
    }

    pub async fn go_to(&self, index: usize) -> Result<FlowSnapshot, FlowError> {
        self.execute(FlowCommand::GoTo(index)).await
    }

    pub async fn reset(&self, index: usize) -> Result<FlowSnapshot, FlowError> {
        self.execute(FlowCommand::Reset(index)).await
    }

    /// Current state as seen by the runtime, after any queued commands
    pub async fn snapshot(&self) -> Result<FlowSnapshot, FlowError> {
        self.execute(FlowCommand::Snapshot).await
    }

    /// Stop the runtime and cancel its pending timer
    pub async fn shutdown(&self) -> Result<(), FlowError> {
        info!("Shutting down flow runtime");
        self.execute(FlowCommand::Shutdown).await.map(|_| ())
    }

    /// Last published snapshot, without a round trip to the runtime
    pub fn latest(&self) -> FlowSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receive every step change from now on
    pub fn subscribe(&self) -> broadcast::Receiver<usize> {
        self.step_tx.subscribe()
    }

    /// Watch published snapshots
    pub fn watch(&self) -> watch::Receiver<FlowSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Check if the runtime task has stopped
    pub fn is_stopped(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Wait until the runtime task has stopped
    pub async fn stopped(&self) {
        self.command_tx.closed().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_cadence() {
        let flow = spawn_flow(FlowConfig::new(3).delay(ms(1000)));
        assert_eq!(flow.snapshot().await.unwrap().current, 0);

        sleep(ms(1010)).await;
        assert_eq!(flow.snapshot().await.unwrap().current, 1);

        sleep(ms(1000)).await;
        assert_eq!(flow.snapshot().await.unwrap().current, 2);

        sleep(ms(1000)).await;
        let snapshot = flow.snapshot().await.unwrap();
        assert_eq!(snapshot.current, 2);
        assert!(!snapshot.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_keeps_running() {
        let flow = spawn_flow(FlowConfig::new(3).delay(ms(1000)).looping(true));

        sleep(ms(3010)).await;
        let snapshot = flow.snapshot().await.unwrap();
        assert_eq!(snapshot.current, 0);
        assert!(snapshot.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume_preserve_remaining() {
        let flow = spawn_flow(FlowConfig::new(2).delay(ms(2000)));

        sleep(ms(700)).await;
        let paused = flow.pause().await.unwrap();
        let remaining = paused.remaining_ms.unwrap();
        assert!((1299..=1300).contains(&remaining));

        sleep(ms(5000)).await;
        assert_eq!(flow.snapshot().await.unwrap().current, 0);

        let resumed = flow.resume().await.unwrap();
        assert!(resumed.running);
        assert_eq!(resumed.remaining_ms, None);

        sleep(ms(1310)).await;
        assert_eq!(flow.snapshot().await.unwrap().current, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_navigation() {
        let flow = spawn_flow(FlowConfig::new(3).auto_start(false).looping(true));

        assert_eq!(flow.go_to(2).await.unwrap().current, 2);
        assert_eq!(flow.next().await.unwrap().current, 0);
        assert_eq!(flow.prev().await.unwrap().current, 2);
        assert_eq!(flow.go_to(3).await.unwrap().current, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_respects_auto_start() {
        let flow = spawn_flow(FlowConfig::new(4).delay(ms(500)).auto_start(false));

        let snapshot = flow.reset(2).await.unwrap();
        assert_eq!(snapshot.current, 2);
        assert!(!snapshot.running);

        flow.resume().await.unwrap();
        sleep(ms(510)).await;
        assert_eq!(flow.snapshot().await.unwrap().current, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_each_change() {
        let flow = spawn_flow(FlowConfig::new(3).delay(ms(1000)));
        let mut step_rx = flow.subscribe();

        flow.go_to(2).await.unwrap();
        flow.go_to(2).await.unwrap();
        flow.prev().await.unwrap();
        sleep(ms(1010)).await;

        assert_eq!(step_rx.recv().await.unwrap(), 2);
        assert_eq!(step_rx.recv().await.unwrap(), 1);
        assert_eq!(step_rx.recv().await.unwrap(), 2);
        assert!(step_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_tracks_latest_snapshot() {
        let flow = spawn_flow(FlowConfig::new(3).delay(ms(1000)));
        let mut snapshot_rx = flow.watch();

        sleep(ms(1010)).await;
        assert!(snapshot_rx.has_changed().unwrap());
        assert_eq!(snapshot_rx.borrow_and_update().current, 1);
        assert_eq!(flow.latest().current, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_timers() {
        let flow = spawn_flow(FlowConfig::new(3).delay(ms(1000)));
        let mut step_rx = flow.subscribe();

        flow.shutdown().await.unwrap();
        sleep(ms(5000)).await;

        assert!(step_rx.try_recv().is_err());
        assert!(flow.is_stopped());
        flow.stopped().await;
        assert_eq!(flow.pause().await, Err(FlowError::Stopped));
        assert_eq!(flow.latest().current, 0);
    }
}
