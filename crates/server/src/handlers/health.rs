//! Health handlers

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use bf_protocol::api_models::{ServiceHealth, UpstreamHealth};

/// Liveness of this server
pub async fn health_check(State(state): State<AppState>) -> Json<ServiceHealth> {
    Json(ServiceHealth {
        status: "ok".to_string(),
        version: state.version.clone(),
    })
}

/// Reachability of the upstream; 503 when it is down
pub async fn upstream_health(
    State(state): State<AppState>,
) -> (StatusCode, Json<UpstreamHealth>) {
    let forced_fallback = state.generation.is_fallback_forced();

    let (status, body) = match state.upstream.health().await {
        Ok(()) => (
            StatusCode::OK,
            UpstreamHealth {
                ok: true,
                forced_fallback,
                error: None,
            },
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            UpstreamHealth {
                ok: false,
                forced_fallback,
                error: Some(e.to_string()),
            },
        ),
    };

    (status, Json(body))
}
