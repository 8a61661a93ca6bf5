//! # bf-protocol
//!
//! Wire models for the Blue Force COP demo.
//!
//! This crate defines all shared data structures used for:
//! - Workflow snapshots served by the status endpoint and the event stream
//! - Request and response bodies of the HTTP surface
//! - The `.cop-demo/config.toml` configuration file
//! - The simulated CDM track feed
//!
//! ## Modules
//!
//! - [`workflow_models`]: Workflow, personas, logs and compliance
//! - [`api_models`]: HTTP request and response bodies
//! - [`config_models`]: Configuration file sections
//! - [`sim_models`]: Simulated CDM track events
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for the browser client
//! - Independent compilation: No dependencies on other workspace crates

pub mod api_models;
pub mod config_models;
pub mod sim_models;
pub mod workflow_models;

pub use api_models::*;
pub use config_models::*;
pub use sim_models::*;
pub use workflow_models::*;
