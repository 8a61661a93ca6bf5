//! `cop-demo`: run the Blue Force COP demo server or talk to the upstream
//! model service from the terminal.

use bf_core::generate::GenerationService;
use bf_server::ServeArgs;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use colored::Colorize;
use std::io::Write;
use tokio_stream::StreamExt;

#[derive(Parser)]
#[command(name = "cop-demo", version, about = "Blue Force COP demo backend", long_about = None)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Stream a completion to stdout through the generation service
    Generate {
        /// Prompt text
        #[arg(short, long)]
        prompt: String,

        /// Model name, defaults to `upstream.default-model`
        #[arg(short, long)]
        model: Option<String>,

        /// Use the synthetic stream without contacting the upstream
        #[arg(long)]
        fallback: bool,
    },

    /// List models installed on the upstream
    Models,

    /// Check that the upstream answers
    Health,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    bf_server::telemetry::init_tracing(&cli.serve.log_level, cli.serve.log_json);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => bf_server::run(&cli.serve)
            .await
            .map_err(|e| eyre!("{e:#}")),
        Command::Generate {
            prompt,
            model,
            fallback,
        } => generate(&cli.serve, &prompt, model.as_deref(), fallback).await,
        Command::Models => models(&cli.serve).await,
        Command::Health => health(&cli.serve).await,
    }
}

async fn generate(
    args: &ServeArgs,
    prompt: &str,
    model: Option<&str>,
    fallback: bool,
) -> color_eyre::Result<()> {
    let mut config = args.config.resolve().await.map_err(|e| eyre!("{e:#}"))?;
    if fallback {
        config.upstream.force_fallback = true;
    }

    let (service, _client) = GenerationService::from_config(&config)?;
    let request = service.request(model, Some(prompt))?;
    let mut stream = service.generate(&request).await?;

    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.wrap_err("generation stream broke")?;
        stdout.write_all(&chunk)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}

async fn models(args: &ServeArgs) -> color_eyre::Result<()> {
    let config = args.config.resolve().await.map_err(|e| eyre!("{e:#}"))?;
    let (_service, client) = GenerationService::from_config(&config)?;

    let models = client
        .list_models()
        .await
        .wrap_err_with(|| format!("failed to list models at {}", client.base_url()))?;

    if models.is_empty() {
        println!("{}", "No models installed".yellow());
    }
    for model in models {
        println!("{}", model.cyan());
    }
    Ok(())
}

async fn health(args: &ServeArgs) -> color_eyre::Result<()> {
    let config = args.config.resolve().await.map_err(|e| eyre!("{e:#}"))?;
    let (service, client) = GenerationService::from_config(&config)?;

    if service.is_fallback_forced() {
        println!("{}", "Synthetic fallback is forced".yellow());
    }

    match client.health().await {
        Ok(()) => println!("{} {}", "ok".green(), client.base_url()),
        Err(e) => {
            println!("{} {}: {}", "down".red(), client.base_url(), e);
            return Err(eyre!("upstream unavailable"));
        }
    }
    Ok(())
}
