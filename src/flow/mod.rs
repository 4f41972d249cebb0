//! Step flow core
//!
//! The controller is a synchronous state machine over a [`Scheduler`]. Hosts
//! deliver elapsed timers back to it with [`StepFlowController::fire`].

pub mod config;
pub mod controller;
pub mod manual;
pub mod scheduler;
pub mod tokio_timer;

// Re-export main types
pub use config::{FlowConfig, DEFAULT_DELAY};
pub use controller::{StepCallback, StepFlowController};
pub use manual::ManualScheduler;
pub use scheduler::{Scheduler, TimerHandle};
pub use tokio_timer::TokioScheduler;
