//! The decision policy interface.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::observation::Observation;
use crate::session::SessionCounters;

/// A policy's answer: the next wire command and a short explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub command: String,
    #[serde(default)]
    pub note: String,
}

impl Decision {
    pub fn new(command: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            note: note.into(),
        }
    }
}

/// Maps an observation plus scenario context to the next command.
///
/// Implementations may fail or hang; the orchestrator bounds every call with
/// a timeout and substitutes a fallback command on any failure, so policies
/// should simply return errors rather than inventing defaults.
#[allow(async_fn_in_trait)]
pub trait DecisionPolicy: Send + Sync {
    async fn decide(
        &self,
        observation: &Observation,
        context: &Value,
        counters: &SessionCounters,
    ) -> Result<Decision>;
}
