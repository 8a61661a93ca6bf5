//! Main entry point for the bf-server binary.
//!
//! This executable runs the HTTP server alone; the `cop-demo` CLI offers the
//! same server plus client commands.

use bf_server::ServeArgs;
use clap::Parser;

/// Blue Force COP demo server
#[derive(Parser)]
#[command(name = "bf-server", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    bf_server::run(&cli.serve).await
}
