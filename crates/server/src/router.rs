//! API Router configuration

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        .route("/health/upstream", get(handlers::upstream_health))
        // Generation
        .route("/generate", post(handlers::generate))
        .route("/generate/models", get(handlers::list_models))
        .route("/personas/:type/execute", post(handlers::execute_persona))
        // Workflows. On start, `:id` is the collection name.
        .route("/workflows", get(handlers::list_workflows))
        .route("/workflows/:id/start", post(handlers::start_workflow))
        .route("/workflows/:id/status", get(handlers::workflow_status))
        .route("/workflows/:id/events", get(handlers::workflow_events))
        .route("/workflows/:id/stop", post(handlers::stop_workflow))
        .route("/workflows/:id/fail", post(handlers::fail_workflow))
        .route("/workflows/:id/retry", post(handlers::retry_workflow))
        // Simulation
        .route("/sim/cdm/events", get(handlers::cdm_events))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
