//! Registry of every workflow started during the process lifetime.
//!
//! The registry is the only shared mutable state of the server. It is
//! constructed once at startup and handed to request handlers behind an
//! `Arc`. Entries are never removed.

use crate::state::clock::{Clock, SystemClock};
use crate::state::machine::{advance, create_workflow, fail_workflow, retry_workflow, stop_workflow};
use bf_protocol::workflow_models::{Workflow, WorkflowKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Manages all simulated workflows.
///
/// The WorkflowRegistry provides a centralized interface for:
/// - Starting new workflows
/// - Reading snapshots (which advances the state machine)
/// - Stopping, failing and retrying workflows
pub struct WorkflowRegistry {
    /// All workflows, indexed by their UUID.
    ///
    /// Each workflow sits behind its own lock so that one advance is applied
    /// atomically even when a poller and a subscriber read at the same time.
    workflows: Mutex<HashMap<Uuid, Arc<Mutex<Workflow>>>>,

    clock: Arc<dyn Clock>,
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowRegistry {
    /// Create an empty registry driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty registry driven by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            workflows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Start a new workflow of the given kind.
    ///
    /// # Returns
    ///
    /// A snapshot of the newly created workflow (Running, step 0).
    pub async fn create(&self, kind: WorkflowKind) -> Workflow {
        let workflow = create_workflow(kind, self.clock.now());
        let snapshot = workflow.clone();

        let mut workflows = self.workflows.lock().await;
        workflows.insert(workflow.id, Arc::new(Mutex::new(workflow)));

        tracing::info!(workflow_id = %snapshot.id, kind = ?kind, "workflow started");
        snapshot
    }

    async fn entry(&self, id: Uuid) -> Option<Arc<Mutex<Workflow>>> {
        let workflows = self.workflows.lock().await;
        workflows.get(&id).cloned()
    }

    /// Get the current state of a workflow.
    ///
    /// Reads are not pure: the state machine is advanced to the current
    /// time before the snapshot is taken.
    ///
    /// # Returns
    ///
    /// A clone of the workflow state, or None if not found.
    pub async fn get(&self, id: Uuid) -> Option<Workflow> {
        let entry = self.entry(id).await?;
        let mut workflow = entry.lock().await;

        if let Some(step) = advance(&mut workflow, self.clock.now()) {
            tracing::debug!(
                workflow_id = %id,
                step,
                status = ?workflow.status,
                "workflow advanced"
            );
        }

        Some(workflow.clone())
    }

    /// Get every workflow, each advanced exactly like [`Self::get`].
    ///
    /// Ordered by creation time of the current attempt.
    pub async fn list(&self) -> Vec<Workflow> {
        let ids: Vec<Uuid> = {
            let workflows = self.workflows.lock().await;
            workflows.keys().copied().collect()
        };

        let mut result = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(workflow) = self.get(id).await {
                result.push(workflow);
            }
        }
        result.sort_by_key(|workflow| workflow.created_at);
        result
    }

    /// Stop a running workflow. Terminal workflows are returned unchanged.
    pub async fn stop(&self, id: Uuid) -> Option<Workflow> {
        let entry = self.entry(id).await?;
        let mut workflow = entry.lock().await;

        if stop_workflow(&mut workflow, self.clock.now()) {
            tracing::info!(workflow_id = %id, step = workflow.step, "workflow stopped");
        }
        Some(workflow.clone())
    }

    /// Force a running workflow into Failed with an optional reason.
    /// Terminal workflows are returned unchanged.
    pub async fn fail(&self, id: Uuid, reason: Option<&str>) -> Option<Workflow> {
        let entry = self.entry(id).await?;
        let mut workflow = entry.lock().await;

        if fail_workflow(&mut workflow, reason, self.clock.now()) {
            tracing::info!(
                workflow_id = %id,
                reason = workflow.error.as_deref().unwrap_or_default(),
                "workflow failed"
            );
        }
        Some(workflow.clone())
    }

    /// Restart a failed workflow under the same id. Workflows that are not
    /// Failed are returned unchanged.
    pub async fn retry(&self, id: Uuid) -> Option<Workflow> {
        let entry = self.entry(id).await?;
        let mut workflow = entry.lock().await;

        if retry_workflow(&mut workflow, self.clock.now()) {
            tracing::info!(workflow_id = %id, attempt = workflow.attempt, "workflow retried");
        } else {
            tracing::debug!(workflow_id = %id, status = ?workflow.status, "retry ignored");
        }
        Some(workflow.clone())
    }

    /// Get the number of registered workflows.
    pub async fn workflow_count(&self) -> usize {
        let workflows = self.workflows.lock().await;
        workflows.len()
    }
}
