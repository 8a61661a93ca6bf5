//! # bf-server
//!
//! HTTP surface for the Blue Force COP demo.
//!
//! Routes:
//! - `/workflows/...`: start, list, observe (poll or SSE) and control workflows
//! - `/generate`, `/personas/{type}/execute`: streamed text generation
//! - `/generate/models`, `/health/upstream`, `/health`: upstream and liveness queries
//! - `/sim/cdm/events`: simulated Link-16/VMF track feed (SSE)
//!
//! The binary in this crate and the `cop-demo` CLI both start the server
//! through [`run`].

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod settings;
pub mod state;
pub mod telemetry;

pub use router::create_router;
pub use server::Server;
pub use settings::{ConfigArgs, ServeArgs};
pub use state::AppState;

/// Initialize tracing, resolve configuration and serve until shutdown.
pub async fn run(args: &ServeArgs) -> anyhow::Result<()> {
    telemetry::init_tracing(&args.log_level, args.log_json);

    let config = args.resolve().await?;
    Server::new(&config)?.run().await
}
