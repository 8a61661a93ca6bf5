//! Persona execution handler

use crate::error::{ApiError, ApiResult};
use crate::handlers::generate::stream_generation;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use bf_core::generate::build_persona_prompt;
use bf_protocol::api_models::PersonaExecuteRequest;
use bf_protocol::workflow_models::PersonaType;

/// Run a persona's role prompt through the generation path
pub async fn execute_persona(
    State(state): State<AppState>,
    Path(persona): Path<String>,
    body: Option<Json<PersonaExecuteRequest>>,
) -> ApiResult<Response> {
    let persona = PersonaType::parse(&persona)
        .ok_or_else(|| ApiError::NotFound(format!("persona type {persona}")))?;
    let body = body.map(|Json(body)| body).unwrap_or_default();

    let prompt = build_persona_prompt(persona, body.task.as_deref(), body.context.as_ref());
    let request = state
        .generation
        .request(body.model.as_deref(), Some(prompt.as_str()))?;

    stream_generation(&state, request).await
}
