//! Optional prose summaries of a finished run.

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::config::ModelConfig;
use crate::model::api::LlmClient;
use crate::model::prompt::narrative_prompt;

/// Turns a plain-text digest of a report into a short prose summary.
#[allow(async_fn_in_trait)]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate(&self, facts: &str) -> Result<String>;
}

/// Stand-in generator for orchestrators built without one. Never called:
/// the orchestrator uses the disabled placeholder instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNarrator;

impl NarrativeGenerator for NoNarrator {
    async fn narrate(&self, _facts: &str) -> Result<String> {
        bail!("no narrative generator configured")
    }
}

/// Narrative generator backed by the chat model.
pub struct LlmNarrator {
    client: LlmClient,
    temperature: f64,
    max_tokens: usize,
}

impl LlmNarrator {
    pub fn new(model: &ModelConfig) -> Result<Self> {
        Ok(Self {
            client: LlmClient::new(model)?,
            temperature: 0.3,
            max_tokens: 300,
        })
    }
}

impl NarrativeGenerator for LlmNarrator {
    async fn narrate(&self, facts: &str) -> Result<String> {
        let messages = narrative_prompt(facts);
        let text = self
            .client
            .complete_text(&messages, self.temperature, self.max_tokens)
            .await
            .context("narrative chat completion failed")?;

        let text = text.trim();
        if text.is_empty() {
            bail!("narrative model returned an empty answer");
        }
        debug!(chars = text.len(), "narrative generated");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_narrator_always_fails() {
        assert!(NoNarrator.narrate("status: PASS").await.is_err());
    }
}
