//! State management for simulated workflows.
//!
//! This module provides:
//! - The time-driven workflow state machine
//! - WorkflowRegistry for coordinating all workflows
//! - Clock abstraction used to read the current time

pub mod clock;
pub mod machine;
pub mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::WorkflowRegistry;
