//! Command-line and environment overrides on top of the config file.

use anyhow::Context;
use bf_core::config::{load_config, load_config_file, validate_config};
use bf_protocol::config_models::AppConfig;
use clap::Args;
use std::path::PathBuf;

/// Options shared by every command that talks to the upstream.
///
/// All options are global, so they may follow a subcommand.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Project root containing `.cop-demo/config.toml`
    #[arg(long, global = true, env = "COP_DEMO_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Explicit configuration file, instead of the one under the root
    #[arg(short, long, global = true, env = "COP_DEMO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the Ollama-compatible upstream
    #[arg(long, global = true, env = "OLLAMA_URL")]
    pub upstream_url: Option<String>,

    /// Always serve the synthetic stream, never contacting the upstream
    #[arg(long, global = true, env = "COP_DEMO_FORCE_FALLBACK")]
    pub force_fallback: bool,
}

impl ConfigArgs {
    /// Load the config file and apply these overrides.
    pub async fn resolve(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path).await?,
            None => load_config(&self.root).await?,
        };

        if let Some(url) = &self.upstream_url {
            config.upstream.base_url = url.clone();
        }
        if self.force_fallback {
            config.upstream.force_fallback = true;
        }

        validate_config(&config)
            .map_err(anyhow::Error::msg)
            .context("invalid command-line override")?;
        Ok(config)
    }
}

/// Options of the HTTP server.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Listen address, overriding `server.listen-addr`
    #[arg(short, long, global = true, env = "COP_DEMO_LISTEN_ADDR")]
    pub listen: Option<String>,

    /// Log level
    #[arg(long, global = true, env = "COP_DEMO_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true, env = "COP_DEMO_LOG_JSON")]
    pub log_json: bool,
}

impl ServeArgs {
    pub async fn resolve(&self) -> anyhow::Result<AppConfig> {
        let mut config = self.config.resolve().await?;

        if let Some(listen) = &self.listen {
            config.server.listen_addr = listen.clone();
            validate_config(&config)
                .map_err(anyhow::Error::msg)
                .context("invalid listen address")?;
        }
        Ok(config)
    }
}
