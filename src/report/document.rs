//! The structured report document and its reduction from a session.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::seconds_between;
use crate::command::verb_of;
use crate::observation::Observation;
use crate::session::{DoneReason, ObjectiveStatus, Session};

/// Placeholder narrative when no generator is configured.
pub const NARRATIVE_DISABLED: &str =
    "Narrative summary not generated: no narrative generator is configured.";
/// Placeholder narrative when the generator errors, times out, or returns nothing.
pub const NARRATIVE_FAILED: &str =
    "Narrative summary unavailable: the narrative generator failed or timed out.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    Pass,
    Fail,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

/// One row of the per-objective table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveRow {
    pub attempt: u32,
    pub id: String,
    pub kind: String,
    pub target: String,
    pub actual: String,
    pub elapsed_seconds: f64,
    pub passed: bool,
}

/// One row of the constraints-compliance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRow {
    pub name: String,
    pub limit: String,
    pub actual: String,
    pub passed: bool,
}

/// Aggregate progress percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub goal_found: u32,
    pub goal_total: u32,
    pub goal_percent: f64,
    pub step_budget_percent: f64,
    pub objective_success_percent: f64,
}

/// A deterministic summary of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub status: ReportStatus,
    pub session_id: Uuid,
    pub scenario_name: String,
    pub scenario_description: String,
    pub started_at: DateTime<Utc>,
    /// When the report was produced. The only field that differs between two
    /// reports of an unchanged session.
    pub reported_at: DateTime<Utc>,
    /// Time from session start to the last recorded step.
    pub duration_seconds: f64,
    pub done_reason: Option<DoneReason>,
    pub steps_taken: u32,
    pub max_steps: u32,
    pub objectives: Vec<ObjectiveRow>,
    pub attempts_used: u32,
    pub attempts_cap: u32,
    pub constraints: Vec<ConstraintRow>,
    pub progress: ProgressSummary,
    /// Issued commands counted by verb.
    pub command_histogram: BTreeMap<String, usize>,
    pub last_observation: Option<Observation>,
    pub issue: String,
    pub recommendation: String,
    pub narrative: String,
}

/// Fixed explanation of a termination reason (`None` = still running).
/// Scenarios without objectives can only end on a limit and get their own
/// wording for an exhausted step budget.
pub fn issue_for(reason: Option<DoneReason>, has_objectives: bool) -> &'static str {
    match reason {
        Some(DoneReason::MaxSteps) if !has_objectives => {
            "The scenario defines no objectives, so it ran until the step budget was used up; \
             no other limit was hit."
        }
        None => "Session still running: no termination condition has fired yet.",
        Some(DoneReason::AttemptsComplete) => {
            "No blocking issue: the scenario used its full objective attempt budget."
        }
        Some(DoneReason::MaxSteps) => {
            "The step budget ran out before the objective attempts completed."
        }
        Some(DoneReason::IdleTooLong) => {
            "The actor stopped moving for longer than the scenario's idle limit."
        }
        Some(DoneReason::FellOutOfLevel) => "The actor fell below the level floor.",
    }
}

/// Fixed follow-up advice for a termination reason.
pub fn recommendation_for(reason: Option<DoneReason>, has_objectives: bool) -> &'static str {
    match reason {
        Some(DoneReason::MaxSteps) if !has_objectives => {
            "Add at least one objective so the scenario has a completion condition; \
             without one a run can never pass."
        }
        None => "Keep stepping the session, or raise maxSteps if the scenario needs more time.",
        Some(DoneReason::AttemptsComplete) => {
            "Review per-objective timings; tighten objectives or the time limit if every attempt passed easily."
        }
        Some(DoneReason::MaxSteps) => {
            "Raise maxSteps or improve how efficiently the decision policy explores the level."
        }
        Some(DoneReason::IdleTooLong) => {
            "Check for collision traps or ignored commands near the last position and teach the policy to get unstuck."
        }
        Some(DoneReason::FellOutOfLevel) => {
            "Inspect level geometry near the last position for missing colliders and steer the policy away from ledges."
        }
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

impl ReportDocument {
    /// Reduce `session` into a report. `narrative` defaults to
    /// [`NARRATIVE_DISABLED`] and can be replaced afterwards.
    pub fn from_session(session: &Session, attempts_cap: u32, reported_at: DateTime<Utc>) -> Self {
        let scenario = &session.scenario;
        let reason = session.done_reason;
        let has_objectives = !scenario.objectives.is_empty();

        let status = match reason {
            Some(r) if r.is_success() => ReportStatus::Pass,
            _ => ReportStatus::Fail,
        };

        let duration_seconds = session
            .last_record()
            .map_or(0.0, |r| seconds_between(session.started_at, r.timestamp));

        let objectives: Vec<ObjectiveRow> = session
            .objective_results
            .iter()
            .map(|result| ObjectiveRow {
                attempt: result.attempt,
                id: result.id.clone(),
                kind: result.kind.to_string(),
                target: scenario
                    .objective_by_id(&result.id)
                    .map_or_else(|| "unknown objective".to_string(), |o| o.target_text()),
                actual: format!("goalFound = {}", result.goal_found),
                elapsed_seconds: result.elapsed_seconds,
                passed: result.status == ObjectiveStatus::Success,
            })
            .collect();

        let constraints = vec![
            ConstraintRow {
                name: "Step budget".to_string(),
                limit: scenario.max_steps.to_string(),
                actual: session.steps_taken.to_string(),
                passed: reason != Some(DoneReason::MaxSteps),
            },
            ConstraintRow {
                name: "Idle limit".to_string(),
                limit: scenario
                    .constraints
                    .max_idle_steps
                    .map_or_else(|| "none".to_string(), |l| l.to_string()),
                actual: format!("peak {}", session.peak_idle_steps),
                passed: scenario
                    .constraints
                    .max_idle_steps
                    .map_or(true, |l| session.peak_idle_steps <= l),
            },
            ConstraintRow {
                name: "Avoid falling".to_string(),
                limit: if scenario.constraints.avoid_falling {
                    "enabled".to_string()
                } else {
                    "disabled".to_string()
                },
                actual: if session.fell {
                    "fell".to_string()
                } else {
                    "stayed in level".to_string()
                },
                passed: !(scenario.constraints.avoid_falling && session.fell),
            },
        ];

        let successes = objectives.iter().filter(|o| o.passed).count();
        let progress = ProgressSummary {
            goal_found: session.goal_found,
            goal_total: session.goal_total,
            goal_percent: percent(f64::from(session.goal_found), f64::from(session.goal_total)),
            step_budget_percent: percent(
                f64::from(session.steps_taken),
                f64::from(scenario.max_steps),
            ),
            objective_success_percent: percent(successes as f64, objectives.len() as f64),
        };

        let mut command_histogram = BTreeMap::new();
        for command in session.history.iter().filter_map(|r| r.command_issued.as_deref()) {
            *command_histogram.entry(verb_of(command).to_string()).or_insert(0) += 1;
        }

        let last_observation = session
            .last_record()
            .map(|r| Observation::decode(&r.raw_observation));

        Self {
            status,
            session_id: session.session_id,
            scenario_name: scenario.name.clone(),
            scenario_description: scenario.description.clone(),
            started_at: session.started_at,
            reported_at,
            duration_seconds,
            done_reason: reason,
            steps_taken: session.steps_taken,
            max_steps: scenario.max_steps,
            objectives,
            attempts_used: session.objective_attempts,
            attempts_cap,
            constraints,
            progress,
            command_histogram,
            last_observation,
            issue: issue_for(reason, has_objectives).to_string(),
            recommendation: recommendation_for(reason, has_objectives).to_string(),
            narrative: NARRATIVE_DISABLED.to_string(),
        }
    }

    /// A plain-text digest handed to the narrative generator.
    pub fn facts(&self) -> String {
        let reason = self.done_reason.map_or("running", |r| r.as_str());
        let passed = self.objectives.iter().filter(|o| o.passed).count();
        format!(
            "scenario: {}\ndescription: {}\nstatus: {}\ntermination: {}\nsteps: {}/{}\n\
             objective attempts: {}/{} ({} passed)\ngoals found: {}/{}\nissue: {}",
            self.scenario_name,
            self.scenario_description,
            self.status.as_str(),
            reason,
            self.steps_taken,
            self.max_steps,
            self.attempts_used,
            self.attempts_cap,
            passed,
            self.progress.goal_found,
            self.progress.goal_total,
            self.issue,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::scenario::{ObjectiveKind, ScenarioDefinition};
    use crate::session::{ObjectiveResult, StepRecord};

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn finished_session() -> Session {
        let mut session = Session::new(ScenarioDefinition::default_scenario(), t0());
        for (i, command) in ["move_fwd:1.0", "move_fwd:1.0", "turn_right:90.0"].iter().enumerate() {
            session.history.push(StepRecord {
                timestamp: t0() + Duration::seconds(i as i64 + 1),
                raw_observation: format!(
                    r#"{{"position":{{"x":{i},"y":0,"z":0}},"yaw":12.5,"goalFound":1,"goalTotal":4}}"#
                ),
                command_issued: Some((*command).to_string()),
            });
        }
        session.history.push(StepRecord {
            timestamp: t0() + Duration::seconds(4),
            raw_observation: "garbage".into(),
            command_issued: None,
        });
        session.steps_taken = 4;
        session.goal_found = 1;
        session.goal_total = 4;
        session.peak_idle_steps = 2;
        session.objective_attempts = 2;
        session.objective_results = vec![
            ObjectiveResult {
                id: "collect_one_goal".into(),
                kind: ObjectiveKind::GoalCountAtLeast,
                status: ObjectiveStatus::Success,
                elapsed_seconds: 1.0,
                attempt: 1,
                goal_found: 1,
            },
            ObjectiveResult {
                id: "gone".into(),
                kind: ObjectiveKind::AllGoalsFound,
                status: ObjectiveStatus::Timeout,
                elapsed_seconds: 60.0,
                attempt: 2,
                goal_found: 1,
            },
        ];
        session.finish(DoneReason::MaxSteps);
        session
    }

    #[test]
    fn test_status_follows_reason() {
        let mut session = Session::new(ScenarioDefinition::default_scenario(), t0());
        assert_eq!(ReportDocument::from_session(&session, 5, t0()).status, ReportStatus::Fail);
        session.finish(DoneReason::AttemptsComplete);
        assert_eq!(ReportDocument::from_session(&session, 5, t0()).status, ReportStatus::Pass);
    }

    #[test]
    fn test_objective_rows_match_scenario() {
        let doc = ReportDocument::from_session(&finished_session(), 5, t0());
        assert_eq!(doc.objectives.len(), 2);
        assert_eq!(doc.objectives[0].target, "goalFound >= 1");
        assert_eq!(doc.objectives[0].actual, "goalFound = 1");
        assert!(doc.objectives[0].passed);
        assert_eq!(doc.objectives[1].target, "unknown objective");
        assert!(!doc.objectives[1].passed);
        assert!((doc.progress.objective_success_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_counts_verbs() {
        let doc = ReportDocument::from_session(&finished_session(), 5, t0());
        assert_eq!(doc.command_histogram.get("move_fwd"), Some(&2));
        assert_eq!(doc.command_histogram.get("turn_right"), Some(&1));
        assert_eq!(doc.command_histogram.len(), 2);
    }

    #[test]
    fn test_constraints_and_progress() {
        let doc = ReportDocument::from_session(&finished_session(), 5, t0());
        let steps = &doc.constraints[0];
        assert_eq!(steps.limit, "200");
        assert!(!steps.passed);
        let idle = &doc.constraints[1];
        assert_eq!(idle.actual, "peak 2");
        assert!(idle.passed);
        assert!(doc.constraints[2].passed);
        assert!((doc.progress.goal_percent - 25.0).abs() < 1e-9);
        assert!((doc.progress.step_budget_percent - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_and_last_observation() {
        let doc = ReportDocument::from_session(&finished_session(), 5, t0());
        assert!((doc.duration_seconds - 4.0).abs() < 1e-9);
        // Last payload was garbage, so it decodes to the default observation.
        assert_eq!(doc.last_observation, Some(Observation::default()));
    }

    #[test]
    fn test_issue_mapping() {
        let doc = ReportDocument::from_session(&finished_session(), 5, t0());
        assert_eq!(doc.issue, issue_for(Some(DoneReason::MaxSteps), true));
        assert!(doc.recommendation.contains("maxSteps"));
        assert!(issue_for(None, true).contains("still running"));
    }

    #[test]
    fn test_objectiveless_budget_run_has_own_findings() {
        let mut scenario = ScenarioDefinition::default_scenario();
        scenario.objectives.clear();
        scenario.max_steps = 3;
        let mut session = Session::new(scenario, t0());
        session.steps_taken = 3;
        session.finish(DoneReason::MaxSteps);

        let doc = ReportDocument::from_session(&session, 5, t0());
        assert_eq!(doc.status, ReportStatus::Fail);
        assert!(doc.issue.contains("defines no objectives"));
        assert!(!doc.issue.contains("objective attempts completed"));
        assert!(doc.recommendation.contains("Add at least one objective"));
        assert!(!doc.recommendation.contains("Raise maxSteps"));

        // Other reasons keep their usual wording.
        assert_eq!(
            issue_for(Some(DoneReason::IdleTooLong), false),
            issue_for(Some(DoneReason::IdleTooLong), true)
        );
    }

    #[test]
    fn test_empty_session_report() {
        let session = Session::new(ScenarioDefinition::default_scenario(), t0());
        let doc = ReportDocument::from_session(&session, 5, t0());
        assert_eq!(doc.duration_seconds, 0.0);
        assert!(doc.last_observation.is_none());
        assert!(doc.command_histogram.is_empty());
        assert_eq!(doc.progress.goal_percent, 0.0);
        assert_eq!(doc.narrative, NARRATIVE_DISABLED);
    }

    #[test]
    fn test_facts_digest() {
        let facts = ReportDocument::from_session(&finished_session(), 5, t0()).facts();
        assert!(facts.contains("status: FAIL"));
        assert!(facts.contains("termination: maxSteps"));
        assert!(facts.contains("objective attempts: 2/5 (1 passed)"));
    }
}
