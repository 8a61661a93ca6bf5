//! Workflow state machine implementation.
//!
//! Progression is lazy: nothing runs in the background. Every read calls
//! [`advance`], which derives the target step from the elapsed time since
//! `created_at` and applies that step's effects once. All functions here are
//! synchronous and take `now` explicitly; locking lives in the registry.

use bf_protocol::workflow_models::{
    Compliance, LogEntry, PersonaInstance, PersonaStatus, PersonaType, Phase, Severity, Violation,
    Workflow, WorkflowKind, WorkflowStatus,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Wall-clock time spent on each step.
pub const STEP_DURATION_MS: i64 = 2000;

/// Step at which the workflow completes.
pub const FINAL_STEP: u8 = 5;

/// Number of compliance rules checked by the demo.
pub const COMPLIANCE_TOTAL: u32 = 20;

/// Default reason recorded by fail injection.
pub const DEFAULT_FAILURE_REASON: &str = "Injected failure";

/// Effects applied when a workflow reaches a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepEffect {
    phase: Phase,
    message: &'static str,
    /// Persona finishing its work; also the author of the log entry.
    completes: Option<usize>,
    /// Persona picking up the work.
    starts: Option<usize>,
    passed: u32,
    failed: u32,
    low_violation: bool,
}

/// Phase reached at each step. Step 0 has no phase.
pub fn phase_for_step(step: u8) -> Option<Phase> {
    match step {
        1 => Some(Phase::Ingest),
        2 => Some(Phase::Codegen),
        3 => Some(Phase::Mapping),
        4 => Some(Phase::Viz),
        5 => Some(Phase::Done),
        _ => None,
    }
}

fn effect_for(phase: Phase) -> StepEffect {
    match phase {
        Phase::Ingest => StepEffect {
            phase,
            message: "Standards Analyst parsed Link-16/VMF docs",
            completes: Some(0),
            starts: Some(1),
            passed: 5,
            failed: 0,
            low_violation: false,
        },
        Phase::Codegen => StepEffect {
            phase,
            message: "Pipeline Engineer generated parsing/validation code",
            completes: Some(1),
            starts: Some(2),
            passed: 10,
            failed: 1,
            low_violation: true,
        },
        Phase::Mapping => StepEffect {
            phase,
            message: "Data Modeler aligned schemas and validated interoperability",
            completes: Some(2),
            starts: Some(3),
            passed: 15,
            failed: 1,
            low_violation: false,
        },
        Phase::Viz => StepEffect {
            phase,
            message: "UI/UX Prototyper created COP visualization",
            completes: Some(3),
            starts: None,
            passed: 19,
            failed: 1,
            low_violation: false,
        },
        Phase::Done => StepEffect {
            phase,
            message: "Workflow completed successfully",
            completes: None,
            starts: None,
            passed: 20,
            failed: 0,
            low_violation: false,
        },
    }
}

/// Step a running workflow should be at, given the current time.
pub fn target_step(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u8 {
    let elapsed_ms = (now - created_at).num_milliseconds().max(0);
    let step = (elapsed_ms / STEP_DURATION_MS).min(i64::from(FINAL_STEP));
    // Bounded by FINAL_STEP above.
    u8::try_from(step).unwrap_or(FINAL_STEP)
}

fn fresh_personas(now: DateTime<Utc>) -> Vec<PersonaInstance> {
    PersonaType::ALL
        .iter()
        .enumerate()
        .map(|(index, persona_type)| PersonaInstance {
            id: Uuid::new_v4(),
            persona_type: *persona_type,
            status: if index == 0 {
                PersonaStatus::Working
            } else {
                PersonaStatus::Idle
            },
            last_update: now,
        })
        .collect()
}

fn fresh_compliance(now: DateTime<Utc>) -> Compliance {
    let mut compliance = Compliance {
        total: COMPLIANCE_TOTAL,
        passed: 0,
        failed: 0,
        history: Vec::new(),
        violations: Vec::new(),
    };
    compliance.record(now);
    compliance
}

fn push_log(
    workflow: &mut Workflow,
    now: DateTime<Utc>,
    message: String,
    persona_id: Option<Uuid>,
    phase: Option<Phase>,
) {
    workflow.logs.push(LogEntry {
        ts: now,
        message,
        persona_id,
        phase,
    });
}

/// Create a new workflow, already Running at step 0.
pub fn create_workflow(kind: WorkflowKind, now: DateTime<Utc>) -> Workflow {
    Workflow {
        id: Uuid::new_v4(),
        name: kind.display_name().to_string(),
        kind,
        status: WorkflowStatus::Running,
        created_at: now,
        step: 0,
        attempt: 1,
        personas: fresh_personas(now),
        logs: vec![LogEntry {
            ts: now,
            message: "Workflow started".to_string(),
            persona_id: None,
            phase: None,
        }],
        compliance: fresh_compliance(now),
        error: None,
    }
}

fn set_persona_status(
    workflow: &mut Workflow,
    index: usize,
    status: PersonaStatus,
    now: DateTime<Utc>,
) {
    if let Some(persona) = workflow.personas.get_mut(index) {
        persona.status = status;
        persona.last_update = now;
    }
}

/// Bring a running workflow up to date with the clock.
///
/// Jumps straight to the target step and applies only that step's effects;
/// steps skipped between two reads are not replayed.
///
/// # Returns
///
/// The step that was applied, or `None` when nothing changed (terminal
/// workflow, or still inside the same 2-second window).
pub fn advance(workflow: &mut Workflow, now: DateTime<Utc>) -> Option<u8> {
    if workflow.is_terminal() {
        return None;
    }

    let target = target_step(workflow.created_at, now);
    if target <= workflow.step {
        return None;
    }

    // target > step >= 0, so a phase always exists here.
    let effect = effect_for(phase_for_step(target)?);
    workflow.step = target;

    let author = effect
        .completes
        .and_then(|index| workflow.personas.get(index))
        .map(|persona| persona.id);
    push_log(
        workflow,
        now,
        effect.message.to_string(),
        author,
        Some(effect.phase),
    );

    if let Some(index) = effect.completes {
        set_persona_status(workflow, index, PersonaStatus::Completed, now);
    }
    if let Some(index) = effect.starts {
        set_persona_status(workflow, index, PersonaStatus::Working, now);
    }

    workflow.compliance.passed = effect.passed;
    workflow.compliance.failed = effect.failed;
    if effect.low_violation {
        workflow.compliance.violations.push(Violation {
            id: Uuid::new_v4(),
            rule: "VMF-VAL-001".to_string(),
            severity: Severity::Low,
            message: "Optional field missing default mapping; using fallback".to_string(),
            ts: now,
            phase: Some(effect.phase),
        });
    }
    workflow.compliance.record(now);

    if effect.phase == Phase::Done {
        workflow.status = WorkflowStatus::Completed;
    }

    Some(target)
}

/// Stop a running workflow on user request.
///
/// Returns `false` (and changes nothing) if the workflow was already terminal.
pub fn stop_workflow(workflow: &mut Workflow, now: DateTime<Utc>) -> bool {
    if workflow.is_terminal() {
        return false;
    }

    workflow.status = WorkflowStatus::Failed;
    workflow.error = Some("Stopped by user".to_string());
    push_log(workflow, now, "Workflow stopped by user".to_string(), None, None);
    true
}

/// Inject a failure into a running workflow.
///
/// Returns `false` (and changes nothing) if the workflow was already terminal.
pub fn fail_workflow(workflow: &mut Workflow, reason: Option<&str>, now: DateTime<Utc>) -> bool {
    if workflow.is_terminal() {
        return false;
    }

    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_FAILURE_REASON)
        .to_string();

    workflow.status = WorkflowStatus::Failed;
    push_log(workflow, now, format!("Workflow failed: {reason}"), None, None);
    workflow.error = Some(reason);
    true
}

/// Reset a failed workflow to a fresh Running attempt with the same id.
///
/// Returns `false` (and changes nothing) unless the workflow is Failed.
pub fn retry_workflow(workflow: &mut Workflow, now: DateTime<Utc>) -> bool {
    if workflow.status != WorkflowStatus::Failed {
        return false;
    }

    let fresh = create_workflow(workflow.kind, now);
    *workflow = Workflow {
        id: workflow.id,
        attempt: workflow.attempt + 1,
        ..fresh
    };
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(workflow: &Workflow, ms: i64) -> DateTime<Utc> {
        workflow.created_at + Duration::milliseconds(ms)
    }

    #[test]
    fn test_create_workflow() {
        let now = Utc::now();
        let workflow = create_workflow(WorkflowKind::CopDemo, now);

        assert_eq!(workflow.name, "Blue Force COP Demo");
        assert_eq!(workflow.status, WorkflowStatus::Running);
        assert_eq!(workflow.step, 0);
        assert_eq!(workflow.attempt, 1);
        assert_eq!(workflow.personas.len(), 4);
        assert_eq!(workflow.personas[0].status, PersonaStatus::Working);
        assert!(workflow.personas[1..]
            .iter()
            .all(|p| p.status == PersonaStatus::Idle));
        assert_eq!(workflow.logs.len(), 1);
        assert_eq!(workflow.compliance.total, COMPLIANCE_TOTAL);
        assert_eq!(workflow.compliance.history.len(), 1);
        assert!(workflow.error.is_none());
    }

    #[test]
    fn test_target_step() {
        let start = Utc::now();
        assert_eq!(target_step(start, start), 0);
        assert_eq!(target_step(start, start + Duration::milliseconds(1999)), 0);
        assert_eq!(target_step(start, start + Duration::milliseconds(2000)), 1);
        assert_eq!(target_step(start, start + Duration::milliseconds(2999)), 1);
        assert_eq!(target_step(start, start + Duration::milliseconds(9999)), 4);
        assert_eq!(target_step(start, start + Duration::seconds(600)), 5);
        // Clock skew never moves backwards past step 0.
        assert_eq!(target_step(start, start - Duration::seconds(5)), 0);
    }

    #[test]
    fn test_advance_is_idempotent_within_window() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());

        assert_eq!({ let t = at(&workflow, 2999); advance(&mut workflow, t) }, Some(1));
        let logs = workflow.logs.len();
        let history = workflow.compliance.history.len();

        for ms in [2000, 2500, 3999] {
            assert_eq!({ let t = at(&workflow, ms); advance(&mut workflow, t) }, None);
        }

        assert_eq!(workflow.step, 1);
        assert_eq!(workflow.logs.len(), logs);
        assert_eq!(workflow.compliance.history.len(), history);
    }

    #[test]
    fn test_step_one_effects() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());
        { let t = at(&workflow, 2000); advance(&mut workflow, t) };

        let last = workflow.logs.last().unwrap();
        assert_eq!(last.phase, Some(Phase::Ingest));
        assert_eq!(last.persona_id, Some(workflow.personas[0].id));
        assert_eq!(workflow.personas[0].status, PersonaStatus::Completed);
        assert_eq!(workflow.personas[1].status, PersonaStatus::Working);
        assert_eq!(workflow.compliance.passed, 5);
        assert_eq!(workflow.compliance.history.len(), 2);
    }

    #[test]
    fn test_step_two_records_violation() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());
        { let t = at(&workflow, 2000); advance(&mut workflow, t) };
        { let t = at(&workflow, 4000); advance(&mut workflow, t) };

        assert_eq!(workflow.compliance.passed, 10);
        assert_eq!(workflow.compliance.failed, 1);
        assert_eq!(workflow.compliance.violations.len(), 1);
        let violation = &workflow.compliance.violations[0];
        assert_eq!(violation.severity, Severity::Low);
        assert_eq!(violation.rule, "VMF-VAL-001");
        assert_eq!(violation.phase, Some(Phase::Codegen));
    }

    #[test]
    fn test_full_progression() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());

        for step in 1..=5u8 {
            let applied = { let t = at(&workflow, i64::from(step) * STEP_DURATION_MS); advance(&mut workflow, t) };
            assert_eq!(applied, Some(step));

            let working = workflow
                .personas
                .iter()
                .filter(|p| p.status == PersonaStatus::Working)
                .count();
            assert!(working <= 1, "at most one persona works at a time");
        }

        assert_eq!(workflow.status, WorkflowStatus::Completed);
        assert_eq!(workflow.step, FINAL_STEP);
        assert!(workflow
            .personas
            .iter()
            .all(|p| p.status == PersonaStatus::Completed));
        assert_eq!(workflow.compliance.passed, 20);
        assert_eq!(workflow.compliance.failed, 0);
        assert_eq!(workflow.compliance.history.len(), 6);
        assert_eq!(workflow.logs.last().unwrap().phase, Some(Phase::Done));

        for snapshot in &workflow.compliance.history {
            assert!(snapshot.passed + snapshot.failed <= snapshot.total);
        }
        for pair in workflow.logs.windows(2) {
            assert!(pair[0].ts <= pair[1].ts);
        }
    }

    #[test]
    fn test_long_gap_skips_intermediate_steps() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());

        assert_eq!({ let t = at(&workflow, 7000); advance(&mut workflow, t) }, Some(3));

        // Only step 3's effects are visible; steps 1 and 2 never ran.
        assert_eq!(workflow.logs.len(), 2);
        assert_eq!(workflow.logs[1].phase, Some(Phase::Mapping));
        assert!(workflow.compliance.violations.is_empty());
        assert_eq!(workflow.compliance.history.len(), 2);
        assert_eq!(workflow.compliance.passed, 15);
    }

    #[test]
    fn test_completed_workflow_is_frozen() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());
        { let t = at(&workflow, 60_000); advance(&mut workflow, t) };
        let snapshot = workflow.clone();

        assert_eq!({ let t = at(&workflow, 120_000); advance(&mut workflow, t) }, None);
        assert!(!{ let t = at(&workflow, 120_000); stop_workflow(&mut workflow, t) });
        assert!(!{ let t = at(&workflow, 120_000); fail_workflow(&mut workflow, Some("late"), t) });
        assert!(!{ let t = at(&workflow, 120_000); retry_workflow(&mut workflow, t) });
        assert_eq!(workflow, snapshot);
    }

    #[test]
    fn test_stop_is_terminal() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());
        { let t = at(&workflow, 2000); advance(&mut workflow, t) };

        assert!({ let t = at(&workflow, 2100); stop_workflow(&mut workflow, t) });
        assert_eq!(workflow.status, WorkflowStatus::Failed);
        assert_eq!(workflow.logs.last().unwrap().message, "Workflow stopped by user");

        assert_eq!({ let t = at(&workflow, 60_000); advance(&mut workflow, t) }, None);
        assert_eq!(workflow.step, 1);
    }

    #[test]
    fn test_fail_records_reason() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());

        assert!({ let t = at(&workflow, 10); fail_workflow(&mut workflow, Some("disk full"), t) });
        assert_eq!(workflow.status, WorkflowStatus::Failed);
        assert_eq!(workflow.error.as_deref(), Some("disk full"));
        assert_eq!(workflow.logs.last().unwrap().message, "Workflow failed: disk full");
    }

    #[test]
    fn test_fail_without_reason_uses_default() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());

        assert!({ let t = at(&workflow, 10); fail_workflow(&mut workflow, Some("   "), t) });
        assert_eq!(workflow.error.as_deref(), Some(DEFAULT_FAILURE_REASON));
    }

    #[test]
    fn test_retry_resets_but_keeps_id() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());
        let id = workflow.id;
        { let t = at(&workflow, 4000); advance(&mut workflow, t) };
        { let t = at(&workflow, 4100); stop_workflow(&mut workflow, t) };

        let retry_at = at(&workflow, 30_000);
        assert!(retry_workflow(&mut workflow, retry_at));

        assert_eq!(workflow.id, id);
        assert_eq!(workflow.status, WorkflowStatus::Running);
        assert_eq!(workflow.step, 0);
        assert_eq!(workflow.attempt, 2);
        assert_eq!(workflow.created_at, retry_at);
        assert_eq!(workflow.logs.len(), 1);
        assert_eq!(workflow.compliance.history.len(), 1);
        assert!(workflow.compliance.violations.is_empty());
        assert!(workflow.error.is_none());
        assert_eq!(workflow.personas[0].status, PersonaStatus::Working);

        // Progresses like a fresh workflow from the retry instant.
        assert_eq!(advance(&mut workflow, retry_at + Duration::milliseconds(1999)), None);
        assert_eq!(advance(&mut workflow, retry_at + Duration::milliseconds(2000)), Some(1));
    }

    #[test]
    fn test_retry_ignores_running_workflow() {
        let mut workflow = create_workflow(WorkflowKind::CopDemo, Utc::now());
        let snapshot = workflow.clone();

        assert!(!{ let t = at(&workflow, 500); retry_workflow(&mut workflow, t) });
        assert_eq!(workflow, snapshot);
    }
}
