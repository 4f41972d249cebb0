//! State management module
//! 
//! This module contains the controller record, its published snapshot and the
//! server-wide application state.

pub mod app_state;
pub mod flow_state;
pub mod snapshot;

// Re-export main types
pub use app_state::AppState;
pub use flow_state::FlowState;
pub use snapshot::FlowSnapshot;
