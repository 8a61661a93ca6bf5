//! Configuration loading and validation.
//!
//! This module loads the optional `.cop-demo/config.toml` file. Command-line
//! and environment overrides are applied by the binaries on top of it.

pub mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_file, validate_config};
