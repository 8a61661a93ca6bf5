//! # bf-core
//!
//! Workflow simulation and generation streaming for the Blue Force COP demo.
//!
//! This crate provides:
//! - Configuration loading from the `.cop-demo/` directory
//! - The time-driven workflow state machine and its registry
//! - Snapshot streams for push-mode observers and the simulated CDM feed
//! - Generation through an upstream model service with a synthetic fallback
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`state`]: Workflow state machine and registry
//! - [`events`]: Snapshot distribution and simulated track events
//! - [`generate`]: Token stream reframing and fallback

pub mod config;
pub mod events;
pub mod generate;
pub mod state;
