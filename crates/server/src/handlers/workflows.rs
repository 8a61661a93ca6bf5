//! Workflow control and observation handlers

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use bf_core::events::snapshot_stream;
use bf_protocol::api_models::{FailRequest, WorkflowAck};
use bf_protocol::workflow_models::{Workflow, WorkflowKind};
use futures_util::stream::{Stream, StreamExt};
use std::time::Duration;
use uuid::Uuid;

/// Unparseable ids are reported like unknown ones.
fn parse_workflow_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::workflow_not_found(id))
}

/// Start a workflow in the given collection
pub async fn start_workflow(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> ApiResult<Json<WorkflowAck>> {
    let kind = WorkflowKind::from_collection(&collection)
        .ok_or_else(|| ApiError::NotFound(format!("collection {collection}")))?;

    let workflow = state.registry.create(kind).await;
    Ok(Json(WorkflowAck::from(&workflow)))
}

/// List all workflows
pub async fn list_workflows(State(state): State<AppState>) -> Json<Vec<Workflow>> {
    Json(state.registry.list().await)
}

/// Point-in-time snapshot
pub async fn workflow_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Workflow>> {
    let id = parse_workflow_id(&id)?;
    state
        .registry
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::workflow_not_found(id))
}

/// Stream snapshots via SSE until the workflow is terminal
pub async fn workflow_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let id = parse_workflow_id(&id)?;
    if state.registry.get(id).await.is_none() {
        return Err(ApiError::workflow_not_found(id));
    }

    tracing::debug!(workflow_id = %id, "snapshot subscriber connected");
    let stream = snapshot_stream(state.registry.clone(), id, state.snapshot_interval)
        .map(|workflow| Event::default().json_data(&workflow));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    ))
}

/// Stop a running workflow
pub async fn stop_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowAck>> {
    let id = parse_workflow_id(&id)?;
    let workflow = state
        .registry
        .stop(id)
        .await
        .ok_or_else(|| ApiError::workflow_not_found(id))?;
    Ok(Json(WorkflowAck::from(&workflow)))
}

/// Inject a failure, with an optional `{reason}` body
pub async fn fail_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<FailRequest>>,
) -> ApiResult<Json<WorkflowAck>> {
    let id = parse_workflow_id(&id)?;
    let reason = body.and_then(|Json(request)| request.reason);

    let workflow = state
        .registry
        .fail(id, reason.as_deref())
        .await
        .ok_or_else(|| ApiError::workflow_not_found(id))?;
    Ok(Json(WorkflowAck::from(&workflow)))
}

/// Restart a failed workflow under the same id
pub async fn retry_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowAck>> {
    let id = parse_workflow_id(&id)?;
    let workflow = state
        .registry
        .retry(id)
        .await
        .ok_or_else(|| ApiError::workflow_not_found(id))?;
    Ok(Json(WorkflowAck::from(&workflow)))
}
