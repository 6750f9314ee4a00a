//! Decision policies: the external strategy that picks the actor's next
//! command.
//!
//! Included policies:
//! - **Sweep** ([`sweep`]) -- deterministic rule-based exploration.
//! - **LLM** ([`llm`]) -- asks a chat model for the next command.

pub mod llm;
pub mod sweep;
pub mod traits;

pub use llm::LlmPolicy;
pub use sweep::SweepPolicy;
pub use traits::{Decision, DecisionPolicy};

use anyhow::Result;
use serde_json::Value;

use crate::observation::Observation;
use crate::session::SessionCounters;

// ---------------------------------------------------------------------------
// AnyPolicy: enum dispatch wrapper for runtime policy selection
// ---------------------------------------------------------------------------

/// An enum wrapper around the concrete policies, enabling runtime selection
/// without `dyn` (which async trait methods do not support).
pub enum AnyPolicy {
    Sweep(SweepPolicy),
    Llm(LlmPolicy),
}

impl DecisionPolicy for AnyPolicy {
    async fn decide(
        &self,
        observation: &Observation,
        context: &Value,
        counters: &SessionCounters,
    ) -> Result<Decision> {
        match self {
            Self::Sweep(p) => p.decide(observation, context, counters).await,
            Self::Llm(p) => p.decide(observation, context, counters).await,
        }
    }
}
