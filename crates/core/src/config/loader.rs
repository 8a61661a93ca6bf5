//! Configuration file loader for the `.cop-demo/` directory.
//!
//! Only one file is read, `.cop-demo/config.toml`. It is optional: a missing
//! directory or file yields the default configuration.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use bf_protocol::config_models::AppConfig;
use std::net::SocketAddr;
use std::path::Path;

/// Name of the configuration directory looked up under the project root.
pub const CONFIG_DIR: &str = ".cop-demo";

/// Loads configuration from `<root>/.cop-demo/config.toml`.
///
/// # Arguments
///
/// * `root` - Directory containing the `.cop-demo/` folder
///
/// # Returns
///
/// The parsed and validated configuration, or the defaults if the file
/// does not exist.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file has invalid TOML syntax or unknown value types
/// - A value fails validation (bad address, bad URL, zero interval)
///
/// # Example
///
/// ```rust,no_run
/// use bf_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Upstream at {}", config.upstream.base_url);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let config_path = root.join(CONFIG_DIR).join("config.toml");

    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    load_config_file(&config_path).await
}

/// Loads and validates an explicit configuration file.
pub async fn load_config_file(path: &Path) -> ConfigResult<AppConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(|reason| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(config)
}

/// Checks values that parse but cannot be used.
///
/// Also called by the binaries after applying command-line overrides.
pub fn validate_config(config: &AppConfig) -> Result<(), String> {
    config
        .server
        .listen_addr
        .parse::<SocketAddr>()
        .map_err(|e| format!("server.listen-addr '{}': {e}", config.server.listen_addr))?;

    let base_url = config.upstream.base_url.as_str();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(format!(
            "upstream.base-url must be an http(s) URL, got '{base_url}'"
        ));
    }

    if config.streams.snapshot_interval_ms == 0 {
        return Err("streams.snapshot-interval-ms must be greater than zero".to_string());
    }

    if config.upstream.request_timeout_secs == 0 {
        return Err("upstream.request-timeout-secs must be greater than zero".to_string());
    }

    if config.upstream.default_model.trim().is_empty() {
        return Err("upstream.default-model must not be empty".to_string());
    }

    Ok(())
}
