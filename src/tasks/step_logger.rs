//! Step change log background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::AppState;

/// Background task that logs every step change and records when it happened
pub async fn step_change_log_task(state: Arc<AppState>) {
    info!("Starting step change log task");

    let mut step_rx = state.flow.subscribe();

    loop {
        // The handle in `state` keeps the step sender alive, so the channel
        // never closes on its own; watch the runtime instead
        let received = tokio::select! {
            received = step_rx.recv() => received,
            _ = state.flow.stopped() => {
                info!("Flow runtime stopped, stopping step change log task");
                break;
            }
        };

        match received {
            Ok(step) => {
                info!("Step changed to {}", step);
                state.record_step_change(step);
            }
            Err(RecvError::Lagged(missed)) => {
                warn!("Step change log lagged behind, {} notifications dropped", missed);
            }
            Err(RecvError::Closed) => {
                info!("Step change channel closed, stopping log task");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{flow::FlowConfig, tasks::spawn_flow};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_records_step_changes() {
        let flow = spawn_flow(FlowConfig::new(3).auto_start(false));
        let state = Arc::new(AppState::new(flow, 0, "127.0.0.1".to_string()));

        let log_state = Arc::clone(&state);
        tokio::spawn(async move {
            step_change_log_task(log_state).await;
        });
        tokio::task::yield_now().await;

        state.flow.go_to(2).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let (step, _) = state.get_last_step_change().unwrap();
        assert_eq!(step, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_after_flow_shutdown() {
        let flow = spawn_flow(FlowConfig::new(3).delay(Duration::from_millis(1000)));
        let state = Arc::new(AppState::new(flow, 0, "127.0.0.1".to_string()));

        let log_state = Arc::clone(&state);
        let task = tokio::spawn(async move {
            step_change_log_task(log_state).await;
        });
        tokio::task::yield_now().await;

        state.flow.shutdown().await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("log task should exit once the flow stops")
            .unwrap();
    }
}
