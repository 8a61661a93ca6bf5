//! Configuration models for `.cop-demo/config.toml`.
//!
//! Every section and field has a default, so an absent or partial file is
//! valid.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";

/// Root of the configuration file.
///
/// # Example
///
/// ```toml
/// # .cop-demo/config.toml
/// [server]
/// listen-addr = "0.0.0.0:3000"
///
/// [upstream]
/// base-url = "http://localhost:11434"
/// force-fallback = true
///
/// [streams]
/// snapshot-interval-ms = 1000
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub streams: StreamConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

/// Settings for the Ollama-compatible generation service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default, rename_all = "kebab-case")]
pub struct UpstreamConfig {
    pub base_url: String,

    /// Always serve the synthetic stream, never contacting the upstream.
    pub force_fallback: bool,

    /// Model used when a request does not name one.
    pub default_model: String,

    /// Timeout for establishing the upstream connection and for the
    /// non-streaming queries (models, health).
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            force_fallback: false,
            default_model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Pacing of the long-lived streams.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default, rename_all = "kebab-case")]
pub struct StreamConfig {
    /// Cadence of the SSE snapshot channel.
    pub snapshot_interval_ms: u64,

    /// Delay between lines of the synthetic generation stream.
    pub fallback_interval_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: 1000,
            fallback_interval_ms: 150,
        }
    }
}
