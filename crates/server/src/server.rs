//! Server setup and lifecycle management

use crate::router::create_router;
use crate::state::AppState;
use anyhow::Context;
use bf_core::state::WorkflowRegistry;
use bf_protocol::config_models::AppConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Blue Force COP demo server
pub struct Server {
    addr: SocketAddr,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration.
    ///
    /// The workflow registry is created here and lives as long as the
    /// server.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let addr: SocketAddr = config
            .server
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address '{}'", config.server.listen_addr))?;

        let registry = Arc::new(WorkflowRegistry::new());
        let state = AppState::from_config(config, registry)?;

        Ok(Self { addr, state })
    }

    /// Run the server until Ctrl+C or SIGTERM
    pub async fn run(self) -> anyhow::Result<()> {
        let app = create_router(self.state.clone());

        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;

        tracing::info!(
            addr = %self.addr,
            upstream = %self.state.upstream.base_url(),
            forced_fallback = self.state.generation.is_fallback_forced(),
            "COP demo server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        tracing::info!(
            workflows = self.state.registry.workflow_count().await,
            "COP demo server shut down"
        );
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
