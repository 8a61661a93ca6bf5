//! Common test utilities shared by the integration tests.
//!
//! This module provides:
//! - Test fixtures (project directories, registries on a manual clock,
//!   upstream bodies)
//! - Workflow invariant assertions

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
