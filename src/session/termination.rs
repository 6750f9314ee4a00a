//! Termination decision.
//!
//! Checks run in strict priority order and the first match wins:
//!
//! 1. attempt cap reached -> [`DoneReason::AttemptsComplete`]
//! 2. step budget used up -> [`DoneReason::MaxSteps`]
//! 3. idle run over the limit -> [`DoneReason::IdleTooLong`]
//! 4. below the floor with `avoidFalling` -> [`DoneReason::FellOutOfLevel`]
//!
//! Attempt exhaustion is the scenario's own completion signal and outranks
//! the incidental limits.

use crate::config::SessionConfig;

use super::state::{DoneReason, Session};

#[derive(Debug, Clone, Copy)]
pub struct TerminationEvaluator {
    max_attempts: u32,
    floor_threshold: f64,
}

impl TerminationEvaluator {
    pub fn new(max_attempts: u32, floor_threshold: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            floor_threshold,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.max_objective_attempts, config.floor_threshold)
    }

    /// The reason the session must stop now, if any.
    pub fn evaluate(&self, session: &Session) -> Option<DoneReason> {
        let constraints = &session.scenario.constraints;

        if session.objective_attempts >= self.max_attempts {
            return Some(DoneReason::AttemptsComplete);
        }
        if session.steps_taken >= session.scenario.max_steps {
            return Some(DoneReason::MaxSteps);
        }
        if constraints
            .max_idle_steps
            .is_some_and(|limit| session.idle_steps > limit)
        {
            return Some(DoneReason::IdleTooLong);
        }
        if constraints.avoid_falling
            && session
                .last_position
                .is_some_and(|p| p.y < self.floor_threshold)
        {
            return Some(DoneReason::FellOutOfLevel);
        }
        None
    }
}

impl Default for TerminationEvaluator {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::observation::Vec3;
    use crate::scenario::{Constraints, ScenarioDefinition};

    fn session() -> Session {
        let scenario = ScenarioDefinition {
            max_steps: 10,
            constraints: Constraints {
                max_idle_steps: Some(3),
                avoid_falling: true,
            },
            ..ScenarioDefinition::default_scenario()
        };
        Session::new(scenario, Utc::now())
    }

    #[test]
    fn test_active_session_has_no_reason() {
        let mut s = session();
        s.steps_taken = 9;
        s.idle_steps = 3;
        s.objective_attempts = 4;
        s.last_position = Some(Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(TerminationEvaluator::default().evaluate(&s), None);
    }

    #[test]
    fn test_attempts_outrank_everything() {
        let mut s = session();
        s.objective_attempts = 5;
        s.steps_taken = 10;
        s.idle_steps = 99;
        s.last_position = Some(Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(
            TerminationEvaluator::default().evaluate(&s),
            Some(DoneReason::AttemptsComplete)
        );
    }

    #[test]
    fn test_steps_outrank_idle_and_fall() {
        let mut s = session();
        s.steps_taken = 10;
        s.idle_steps = 4;
        s.last_position = Some(Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(TerminationEvaluator::default().evaluate(&s), Some(DoneReason::MaxSteps));
    }

    #[test]
    fn test_idle_outranks_fall() {
        let mut s = session();
        s.idle_steps = 4;
        s.last_position = Some(Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(TerminationEvaluator::default().evaluate(&s), Some(DoneReason::IdleTooLong));
    }

    #[test]
    fn test_fall_only_with_constraint() {
        let mut s = session();
        s.last_position = Some(Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(
            TerminationEvaluator::default().evaluate(&s),
            Some(DoneReason::FellOutOfLevel)
        );
        s.scenario.constraints.avoid_falling = false;
        assert_eq!(TerminationEvaluator::default().evaluate(&s), None);
    }

    #[test]
    fn test_no_idle_limit_never_idles_out() {
        let mut s = session();
        s.scenario.constraints.max_idle_steps = None;
        s.idle_steps = 1_000;
        assert_eq!(TerminationEvaluator::default().evaluate(&s), None);
    }

    #[test]
    fn test_zero_attempt_cap_needs_one_attempt() {
        let config = SessionConfig {
            max_objective_attempts: 0,
            ..SessionConfig::default()
        };
        let evaluator = TerminationEvaluator::from_config(&config);
        let mut s = session();
        s.steps_taken = 1;
        assert_eq!(evaluator.evaluate(&s), None);
        s.objective_attempts = 1;
        assert_eq!(evaluator.evaluate(&s), Some(DoneReason::AttemptsComplete));
    }
}
