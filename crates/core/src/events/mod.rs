//! Snapshot distribution for workflow observers.
//!
//! Observers either poll ([`WorkflowRegistry::get`]) or subscribe to a
//! snapshot stream built here. Both go through the same registry read, so
//! they observe the state machine identically.
//!
//! The stream is a plain lazy generator: the ticker lives inside it and is
//! dropped together with it, so a subscriber that disconnects leaves no
//! periodic work behind.
//!
//! [`cdm`] holds the simulated track feed, built the same way.

pub mod cdm;

use crate::state::WorkflowRegistry;
use bf_protocol::workflow_models::Workflow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_stream::Stream;
use uuid::Uuid;

/// Default cadence of the push channel.
pub const DEFAULT_SNAPSHOT_INTERVAL: Duration = Duration::from_secs(1);

/// Stream workflow snapshots until the workflow is terminal.
///
/// The first snapshot is emitted immediately, then one per `every`. The
/// terminal snapshot is the last item; the stream then ends. If the
/// workflow is unknown the stream is empty.
///
/// # Arguments
///
/// * `registry` - Registry the snapshots are read from
/// * `id` - Workflow to observe
/// * `every` - Emission cadence
pub fn snapshot_stream(
    registry: Arc<WorkflowRegistry>,
    id: Uuid,
    every: Duration,
) -> impl Stream<Item = Workflow> + Send + 'static {
    async_stream::stream! {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(workflow) = registry.get(id).await else {
                break;
            };

            let terminal = workflow.is_terminal();
            yield workflow;

            if terminal {
                tracing::debug!(workflow_id = %id, "snapshot stream finished");
                break;
            }
        }
    }
}
