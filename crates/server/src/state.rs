//! Application state for API handlers

use bf_core::generate::{GenerateError, GenerationService, OllamaClient};
use bf_core::state::WorkflowRegistry;
use bf_protocol::config_models::AppConfig;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Every workflow started by this process
    pub registry: Arc<WorkflowRegistry>,

    /// Generation with synthetic fallback
    pub generation: Arc<GenerationService>,

    /// Upstream client for the model list and health queries
    pub upstream: Arc<OllamaClient>,

    /// Cadence of the SSE snapshot channel
    pub snapshot_interval: Duration,

    /// Server version
    pub version: String,
}

impl AppState {
    /// Create new application state
    pub fn new(
        registry: Arc<WorkflowRegistry>,
        generation: Arc<GenerationService>,
        upstream: Arc<OllamaClient>,
        snapshot_interval: Duration,
    ) -> Self {
        Self {
            registry,
            generation,
            upstream,
            snapshot_interval,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Build state from configuration with the given registry.
    pub fn from_config(
        config: &AppConfig,
        registry: Arc<WorkflowRegistry>,
    ) -> Result<Self, GenerateError> {
        let (generation, upstream) = GenerationService::from_config(config)?;
        Ok(Self::new(
            registry,
            Arc::new(generation),
            upstream,
            Duration::from_millis(config.streams.snapshot_interval_ms),
        ))
    }
}
