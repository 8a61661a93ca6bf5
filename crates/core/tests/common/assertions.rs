//! Custom assertion helpers for workflow snapshots.

use bf_protocol::workflow_models::{PersonaStatus, Workflow, WorkflowStatus};

/// Assert the invariants every snapshot must satisfy.
///
/// Checks that:
/// 1. Compliance counts never exceed the total, in the snapshot and in history
/// 2. History has one entry per applied step plus the initial one
/// 3. Log and history timestamps are non-decreasing
#[allow(dead_code)]
pub fn assert_snapshot_invariants(workflow: &Workflow, applied_steps: usize) {
    let compliance = &workflow.compliance;
    assert!(compliance.passed + compliance.failed <= compliance.total);
    for entry in &compliance.history {
        assert!(
            entry.passed + entry.failed <= entry.total,
            "history entry over total: {entry:?}"
        );
    }

    assert_eq!(
        compliance.history.len(),
        applied_steps + 1,
        "history should hold one entry per applied step plus the initial one"
    );

    assert!(workflow.logs.windows(2).all(|pair| pair[0].ts <= pair[1].ts));
    assert!(compliance.history.windows(2).all(|pair| pair[0].ts <= pair[1].ts));
}

/// Assert that at most one persona is working, and none while terminal.
#[allow(dead_code)]
pub fn assert_single_working_persona(workflow: &Workflow) {
    let working = workflow
        .personas
        .iter()
        .filter(|p| p.status == PersonaStatus::Working)
        .count();

    if workflow.status == WorkflowStatus::Completed {
        assert_eq!(working, 0, "completed workflow has working personas");
    } else {
        assert!(working <= 1, "more than one persona working: {working}");
    }
}
