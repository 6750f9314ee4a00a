//! Objective sequencing.
//!
//! One objective is active at a time. Each step it either succeeds, times out,
//! or keeps running. A resolved attempt advances to the next objective; past
//! the end of the list the sequence wraps back to the first objective, so a
//! scenario acts as a repeatable probe until the global attempt cap is
//! reached. That cycling is deliberate: do not turn it into a once-through
//! checklist.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::clock::seconds_between;
use crate::config::SessionConfig;

use super::state::{ObjectiveResult, ObjectiveStatus, Session};

#[derive(Debug, Clone, Copy)]
pub struct ObjectiveSequencer {
    max_attempts: u32,
    time_limit_secs: f64,
}

impl ObjectiveSequencer {
    /// A cap below one is raised to one: a session must resolve at least one
    /// attempt before it can count as complete.
    pub fn new(max_attempts: u32, time_limit_secs: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            time_limit_secs,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.max_objective_attempts, config.objective_time_limit_secs)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Evaluate the active objective against the session's counters.
    ///
    /// Returns the attempt resolved on this step, if any. At most one attempt
    /// resolves per call.
    pub fn advance(&self, session: &mut Session, now: DateTime<Utc>) -> Option<ObjectiveResult> {
        let count = session.scenario.objectives.len();
        if count == 0 || session.objective_attempts >= self.max_attempts {
            return None;
        }
        if session.objective_index >= count {
            // Only reachable when the cap was raised after the list was exhausted.
            session.objective_index = 0;
        }

        let started = *session.objective_started_at.get_or_insert(now);
        let elapsed = seconds_between(started, now);

        let index = session.objective_index;
        let objective = &session.scenario.objectives[index];

        let status = if objective.is_satisfied(session.goal_found, session.goal_total) {
            ObjectiveStatus::Success
        } else if elapsed >= self.time_limit_secs {
            ObjectiveStatus::Timeout
        } else {
            return None;
        };

        session.objective_attempts += 1;
        let result = ObjectiveResult {
            id: objective.resolved_id(index),
            kind: objective.kind.clone(),
            status,
            elapsed_seconds: elapsed,
            attempt: session.objective_attempts,
            goal_found: session.goal_found,
        };

        info!(
            objective = %result.id,
            status = status.as_str(),
            elapsed_secs = elapsed,
            attempt = result.attempt,
            max_attempts = self.max_attempts,
            "objective attempt resolved"
        );

        session.objective_results.push(result.clone());
        session.objective_index += 1;
        session.objective_started_at = Some(now);

        if session.objective_index >= count && session.objective_attempts < self.max_attempts {
            session.objective_index = 0;
        }

        Some(result)
    }
}

impl Default for ObjectiveSequencer {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
