//! Role prompts for the four workflow personas.

use bf_protocol::workflow_models::PersonaType;
use serde_json::Value;

pub const DEFAULT_TASK: &str = "Summarize next steps for your role.";

const STANDARDS_ANALYST: &str = "You are a military standards analyst specializing in Link-16 and VMF protocols.
Your role: parse technical documentation, extract schemas, identify compliance rules, and summarize key structures.

Task: {task}
Context: {context}

Expected output:
- Concise bullet summary
- JSON schema sketch (entities, fields, types)
- Rules list (required fields, ranges, constraints)
";

const DATA_PIPELINE_ENGINEER: &str = "You are a data pipeline engineer for military data integration.
Your role: propose ingestion + validation + transformation steps from source schema to CDM.

Task: {task}
Context: {context}

Expected output:
- Ingestion plan (steps)
- Validation rules summary
- Mapping notes to CDM fields
";

const DATA_MODELER: &str = "You are a data modeler focused on schema harmonization and ontology/CDM alignment.
Your role: map source fields to CDM, note conflicts and resolutions.

Task: {task}
Context: {context}

Expected output:
- Mapping table (source -> CDM)
- Conflicts with rationale
- Gaps and recommendations
";

const UIUX_PROTOTYPER: &str = "You are a UI/UX prototyper for a COP interface with MIL-STD-2525 concerns.
Your role: suggest panels, toggles, and a quick demo flow for data layers and compliance.

Task: {task}
Context: {context}

Expected output:
- UI sections and brief rationale
- 2-3 key interactions
- Minimal success criteria for demo
";

pub fn template(persona: PersonaType) -> &'static str {
    match persona {
        PersonaType::StandardsAnalyst => STANDARDS_ANALYST,
        PersonaType::DataPipelineEngineer => DATA_PIPELINE_ENGINEER,
        PersonaType::DataModeler => DATA_MODELER,
        PersonaType::UiuxPrototyper => UIUX_PROTOTYPER,
    }
}

/// Fill a persona template.
///
/// A blank task becomes [`DEFAULT_TASK`]. A string context is inserted as
/// is; any other context is pretty-printed JSON, and a missing one is `{}`.
pub fn build_persona_prompt(persona: PersonaType, task: Option<&str>, context: Option<&Value>) -> String {
    let task = task
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TASK);

    let context = match context {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "{}".to_string(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };

    fill(template(persona), task, &context)
}

// Single pass, so placeholder text inside the task is left alone.
fn fill(template: &str, task: &str, context: &str) -> String {
    let Some((head, rest)) = template.split_once("{task}") else {
        return template.replacen("{context}", context, 1);
    };
    match rest.split_once("{context}") {
        Some((middle, tail)) => format!("{head}{task}{middle}{context}{tail}"),
        None => format!("{head}{task}{rest}"),
    }
}
