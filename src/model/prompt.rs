//! Prompt templates.
//!
//! Each function constructs a `Vec<ChatMessage>` ready to be sent to an LLM:
//!
//! - **Decision**: choose the next actor command from an observation.
//! - **Narrative**: summarise a finished run in a short paragraph.

use serde_json::Value;

use crate::model::api::ChatMessage;
use crate::observation::Observation;
use crate::session::SessionCounters;

// ---------------------------------------------------------------------------
// Decision context rendering
// ---------------------------------------------------------------------------

/// Substitute `{placeholder}` counters into a template string.
///
/// Recognised placeholders: `{steps_taken}`, `{max_steps}`, `{idle_steps}`,
/// `{goal_found}`, `{goal_total}`, `{objective_attempts}`,
/// `{active_objective}`. Unknown placeholders are left as-is.
pub fn fill_template(template: &str, counters: &SessionCounters) -> String {
    let active = counters.active_objective.as_deref().unwrap_or("none");
    template
        .replace("{steps_taken}", &counters.steps_taken.to_string())
        .replace("{max_steps}", &counters.max_steps.to_string())
        .replace("{idle_steps}", &counters.idle_steps.to_string())
        .replace("{goal_found}", &counters.goal_found.to_string())
        .replace("{goal_total}", &counters.goal_total.to_string())
        .replace("{objective_attempts}", &counters.objective_attempts.to_string())
        .replace("{active_objective}", active)
}

/// Render the scenario's opaque decision context as prompt text.
///
/// Strings are treated as templates; an object with a `template` string has
/// that template filled and any remaining keys appended as JSON; anything
/// else is pretty-printed.
pub fn render_decision_context(context: &Value, counters: &SessionCounters) -> String {
    match context {
        Value::Null => "(no scenario guidance)".to_string(),
        Value::String(template) => fill_template(template, counters),
        Value::Object(map) => match map.get("template").and_then(Value::as_str) {
            Some(template) => {
                let filled = fill_template(template, counters);
                let rest: serde_json::Map<String, Value> = map
                    .iter()
                    .filter(|(k, _)| k.as_str() != "template")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                if rest.is_empty() {
                    filled
                } else {
                    let extra = serde_json::to_string_pretty(&rest).unwrap_or_default();
                    format!("{filled}\n\n{extra}")
                }
            }
            None => serde_json::to_string_pretty(context).unwrap_or_default(),
        },
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Decision prompt
// ---------------------------------------------------------------------------

/// Build the prompt asking the model for the actor's next command.
pub fn decision_prompt(
    observation: &Observation,
    context: &Value,
    counters: &SessionCounters,
) -> Vec<ChatMessage> {
    let guidance = render_decision_context(context, counters);

    let system = format!(
        r#"You are steering an autonomous actor through a 3D test level.

## Scenario Guidance
{guidance}

## Command Grammar
Exactly one of:
- move_fwd:<seconds>   move_back:<seconds>
- move_left:<seconds>  move_right:<seconds>
- turn_left:<degrees>  turn_right:<degrees>
- jump

## Output Format
Respond with a single JSON object and nothing else:
{{"command": "<one command>", "note": "<one short sentence explaining why>"}}"#
    );

    let p = observation.position;
    let active = counters.active_objective.as_deref().unwrap_or("none");
    let user = format!(
        "## Observation\nposition: x={:.2} y={:.2} z={:.2}\nyaw: {:.1} degrees\ngoals found: {} of {}\n\n\
         ## Progress\nstep {} of {}\nconsecutive idle steps: {}\nactive objective: {}\nobjective attempts: {}\n\n\
         What is the next command?",
        p.x,
        p.y,
        p.z,
        observation.yaw,
        observation.goal_found,
        observation.goal_total,
        counters.steps_taken,
        counters.max_steps,
        counters.idle_steps,
        active,
        counters.objective_attempts,
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

// ---------------------------------------------------------------------------
// Narrative prompt
// ---------------------------------------------------------------------------

/// Build the prompt asking for a short prose summary of a run.
///
/// `facts` is a plain-text digest of the report (status, objectives, issue).
pub fn narrative_prompt(facts: &str) -> Vec<ChatMessage> {
    let system = "You write concise QA summaries of automated exploration test runs. \
                  Write one paragraph of at most four sentences. State the outcome first, \
                  then the most important observation. Do not invent facts that are not \
                  in the data.";

    let user = format!("## Run Data\n{facts}\n\nWrite the summary.");

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}
