//! LLM-backed decision policy.
//!
//! Sends the decision prompt to a chat model and parses its answer. The model
//! is asked for a JSON object `{"command": ..., "note": ...}`; answers wrapped
//! in code fences or surrounded by prose are tolerated, and a trailing
//! `Command: <cmd>` line is accepted as a last resort. Anything else is a
//! malformed answer and surfaces as an error so the orchestrator can fall
//! back.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use super::traits::{Decision, DecisionPolicy};
use crate::config::{ModelConfig, PolicyConfig};
use crate::model::api::LlmClient;
use crate::model::prompt::decision_prompt;
use crate::observation::Observation;
use crate::session::SessionCounters;

pub struct LlmPolicy {
    client: LlmClient,
    temperature: f64,
    max_tokens: usize,
}

impl LlmPolicy {
    pub fn new(model: &ModelConfig, policy: &PolicyConfig) -> Result<Self> {
        Ok(Self {
            client: LlmClient::new(model)?,
            temperature: policy.temperature,
            max_tokens: policy.max_tokens,
        })
    }
}

impl DecisionPolicy for LlmPolicy {
    async fn decide(
        &self,
        observation: &Observation,
        context: &Value,
        counters: &SessionCounters,
    ) -> Result<Decision> {
        let messages = decision_prompt(observation, context, counters);
        let raw = self
            .client
            .complete_text(&messages, self.temperature, self.max_tokens)
            .await
            .context("decision model chat completion failed")?;

        let decision = parse_decision_response(&raw)?;
        debug!(model = self.client.model_id(), command = %decision.command, "model proposed command");
        Ok(decision)
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Extract a [`Decision`] from a model answer.
pub fn parse_decision_response(response: &str) -> Result<Decision> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        bail!("model returned an empty answer");
    }

    if let Some(decision) = extract_json_decision(trimmed) {
        return Ok(decision);
    }

    // Search from the end so a command mentioned in reasoning does not win.
    for line in trimmed.lines().rev() {
        let line = line.trim();
        let rest = line
            .strip_prefix("Command:")
            .or_else(|| line.strip_prefix("command:"));
        if let Some(rest) = rest {
            let command = rest.trim().trim_matches('`').trim();
            if !command.is_empty() {
                warn!("model answer was not JSON; using its 'Command:' line");
                return Ok(Decision::new(command, "parsed from Command line"));
            }
        }
    }

    bail!("model answer contained no command: {trimmed}")
}

/// Parse the outermost `{ ... }` span of `text` as a decision object.
fn extract_json_decision(text: &str) -> Option<Decision> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: Value = serde_json::from_str(&text[start..=end]).ok()?;
    let command = value.get("command")?.as_str()?.trim().to_string();
    if command.is_empty() {
        return None;
    }
    let note = value
        .get("note")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(Decision { command, note })
}
