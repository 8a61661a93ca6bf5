//! Runtime workflow state models.
//!
//! This module defines the snapshot shape that the browser receives from the
//! status endpoint and the event stream. Timestamps travel as epoch
//! milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Represents the lifecycle status of a workflow.
///
/// Normal progression is Running -> Completed. A workflow created through
/// the start endpoint is already Running; Pending is part of the wire
/// vocabulary but never produced by the simulation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    /// Workflow has been created but not started yet.
    Pending,

    /// Workflow is advancing through its steps.
    Running,

    /// Workflow reached its final step.
    Completed,

    /// Workflow was stopped or had a failure injected.
    Failed,
}

impl WorkflowStatus {
    /// Whether no further transitions apply (retry aside).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Collection a workflow belongs to. Only the COP demo exists today.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowKind {
    CopDemo,
}

impl WorkflowKind {
    /// Resolve the `{collection}` path segment of the start endpoint.
    pub fn from_collection(collection: &str) -> Option<Self> {
        match collection {
            "cop-demo" | "COP_DEMO" => Some(Self::CopDemo),
            _ => None,
        }
    }

    /// Display name given to new workflows of this kind.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::CopDemo => "Blue Force COP Demo",
        }
    }
}

/// The four fixed roles taking part in the COP demo, in pipeline order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonaType {
    StandardsAnalyst,
    DataPipelineEngineer,
    DataModeler,
    UiuxPrototyper,
}

impl PersonaType {
    /// All personas in the order they work.
    pub const ALL: [PersonaType; 4] = [
        PersonaType::StandardsAnalyst,
        PersonaType::DataPipelineEngineer,
        PersonaType::DataModeler,
        PersonaType::UiuxPrototyper,
    ];

    /// Parse the wire name (`STANDARDS_ANALYST`, ...). Case-insensitive,
    /// accepts dashes in place of underscores.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "STANDARDS_ANALYST" => Some(Self::StandardsAnalyst),
            "DATA_PIPELINE_ENGINEER" => Some(Self::DataPipelineEngineer),
            "DATA_MODELER" => Some(Self::DataModeler),
            "UIUX_PROTOTYPER" => Some(Self::UiuxPrototyper),
            _ => None,
        }
    }
}

/// Status of a single persona within a workflow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonaStatus {
    Idle,
    Working,
    Waiting,
    Completed,
}

/// A persona owned by exactly one workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct PersonaInstance {
    #[ts(type = "string")]
    pub id: Uuid,

    #[serde(rename = "type")]
    pub persona_type: PersonaType,

    pub status: PersonaStatus,

    /// Last time `status` changed.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub last_update: DateTime<Utc>,
}

/// Phase tag attached to log entries and violations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Ingest,
    Codegen,
    Mapping,
    Viz,
    Done,
}

/// A single line in the workflow activity log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub ts: DateTime<Utc>,

    pub message: String,

    /// Persona that produced the entry, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | undefined")]
    pub persona_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
}

/// Point-in-time copy of the compliance counters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
pub struct ComplianceSnapshot {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub ts: DateTime<Utc>,
    pub passed: u32,
    pub failed: u32,
    pub total: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A compliance rule violation recorded during the run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct Violation {
    #[ts(type = "string")]
    pub id: Uuid,
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub ts: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
}

/// Aggregate compliance counters plus their append-only history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct Compliance {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,

    /// One entry for the initial state and one per step transition.
    pub history: Vec<ComplianceSnapshot>,

    pub violations: Vec<Violation>,
}

impl Compliance {
    /// Append the current counters to `history`.
    pub fn record(&mut self, ts: DateTime<Utc>) {
        self.history.push(ComplianceSnapshot {
            ts,
            passed: self.passed,
            failed: self.failed,
            total: self.total,
        });
    }
}

/// Full snapshot of a simulated workflow.
///
/// This is the payload of both the status endpoint and every event pushed
/// on the SSE channel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Stable identity; survives retries.
    #[ts(type = "string")]
    pub id: Uuid,

    pub name: String,

    #[serde(rename = "type")]
    pub kind: WorkflowKind,

    pub status: WorkflowStatus,

    /// Start of the current attempt. Step progression is measured from here.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub created_at: DateTime<Utc>,

    /// Linear step, 0..=5.
    pub step: u8,

    /// 1 for a fresh workflow, incremented by every retry.
    pub attempt: u32,

    pub personas: Vec<PersonaInstance>,

    pub logs: Vec<LogEntry>,

    pub compliance: Compliance,

    /// Reason recorded when the workflow was stopped or failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Workflow {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
