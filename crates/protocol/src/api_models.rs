//! Request and response bodies of the HTTP surface.
//!
//! The browser talks to the server through plain JSON bodies for the
//! workflow controls and the generation endpoints. Streams (SSE snapshots
//! and generated text) are described by [`crate::workflow_models`] and raw
//! bytes respectively.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::workflow_models::{Workflow, WorkflowStatus};

/// Reply of every workflow control operation (start, stop, fail, retry).
///
/// ```json
/// { "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427", "status": "RUNNING" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct WorkflowAck {
    #[ts(type = "string")]
    pub id: Uuid,
    pub status: WorkflowStatus,
}

impl From<&Workflow> for WorkflowAck {
    fn from(workflow: &Workflow) -> Self {
        Self {
            id: workflow.id,
            status: workflow.status,
        }
    }
}

/// Optional body of the fail-injection endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct FailRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `POST /generate`.
///
/// `prompt` is optional on the wire so that a missing prompt is reported
/// as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct GenerateRequest {
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub prompt: Option<String>,
}

/// Body of `POST /personas/{type}/execute`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct PersonaExecuteRequest {
    #[serde(default)]
    pub model: Option<String>,

    /// Free-text task; a role-specific default is used when empty.
    #[serde(default)]
    pub task: Option<String>,

    /// Arbitrary context rendered into the prompt.
    #[serde(default)]
    #[ts(type = "unknown")]
    pub context: Option<serde_json::Value>,
}

/// Reply of `GET /generate/models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ModelList {
    pub models: Vec<String>,
}

/// Reply of `GET /health/upstream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamHealth {
    pub ok: bool,

    /// Whether generation is pinned to the synthetic stream.
    pub forced_fallback: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ServiceHealth {
    pub status: String,
    pub version: String,
}
