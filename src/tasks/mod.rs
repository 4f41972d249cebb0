//! Background tasks module
//! 
//! This module contains the flow runtime that hosts the controller and the
//! tasks that observe it alongside the HTTP server.

pub mod flow_runtime;
pub mod step_logger;

// Re-export main types and functions
pub use flow_runtime::{spawn_flow, FlowCommand, FlowError, FlowHandle};
pub use step_logger::step_change_log_task;
