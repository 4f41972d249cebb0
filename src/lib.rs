//! Step Flow - A timed step-progression controller
//! 
//! This library advances a cursor through a fixed number of steps on a fixed
//! delay, with pause/resume that preserves the remaining time, manual
//! navigation, optional looping and step change notifications. A Tokio
//! runtime and an HTTP control surface host the controller in a server.

pub mod config;
pub mod flow;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use flow::{FlowConfig, ManualScheduler, Scheduler, StepFlowController, TimerHandle, TokioScheduler};
pub use state::{AppState, FlowSnapshot};
pub use api::create_router;
pub use tasks::{spawn_flow, FlowError, FlowHandle};
pub use utils::signals::shutdown_signal;
