//! Text generation handlers

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bf_core::generate::{GenerationRequest, TextStream};
use bf_protocol::api_models::{GenerateRequest, ModelList};

/// Wrap a generation stream as a `text/plain` response body.
///
/// A mid-stream error aborts the body, so the client sees a broken
/// transfer instead of a clean end.
pub(crate) fn text_stream_response(stream: TextStream) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

pub(crate) async fn stream_generation(state: &AppState, request: GenerationRequest) -> ApiResult<Response> {
    tracing::info!(
        model = %request.model,
        prompt_len = request.prompt.len(),
        "generation requested"
    );
    let stream = state.generation.generate(&request).await?;
    Ok(text_stream_response(stream))
}

/// Generate text for `{model?, prompt}`
pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = state
        .generation
        .request(body.model.as_deref(), body.prompt.as_deref())?;

    stream_generation(&state, request).await
}

/// List models installed on the upstream
pub async fn list_models(State(state): State<AppState>) -> ApiResult<Json<ModelList>> {
    let models = state.upstream.list_models().await?;
    Ok(Json(ModelList { models }))
}
