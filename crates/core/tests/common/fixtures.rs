//! Test fixtures for creating sample configurations and test data.

use bf_core::state::{ManualClock, WorkflowRegistry};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary project directory, optionally with a
/// `.cop-demo/config.toml`.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project(config_toml: Option<&str>) -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;

    if let Some(content) = config_toml {
        let config_dir = temp_dir.path().join(".cop-demo");
        std::fs::create_dir_all(&config_dir)?;
        std::fs::write(config_dir.join("config.toml"), content)?;
    }

    Ok(temp_dir)
}

/// A registry whose time only moves when the returned clock is advanced.
#[allow(dead_code)]
pub fn registry_with_manual_clock() -> (Arc<WorkflowRegistry>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let registry = Arc::new(WorkflowRegistry::with_clock(clock.clone()));
    (registry, clock)
}

/// Build an upstream NDJSON body from text fragments, terminated by a
/// `done` record.
#[allow(dead_code)]
pub fn ndjson_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        body.push_str(&serde_json::json!({ "response": fragment, "done": false }).to_string());
        body.push('\n');
    }
    body.push_str("{\"response\":\"\",\"done\":true}\n");
    body
}

/// Base URL of a server that accepts connections and never answers.
#[allow(dead_code)]
pub async fn silent_upstream() -> std::io::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    Ok(format!("http://{addr}"))
}
