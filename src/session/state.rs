//! Session state: the single mutable entity of a test run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::observation::Vec3;
use crate::scenario::{ObjectiveKind, ScenarioDefinition};

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DoneReason {
    /// The objective attempt budget was used up.
    AttemptsComplete,
    /// The scenario's step budget was used up.
    MaxSteps,
    /// The actor stayed put for longer than the idle limit.
    IdleTooLong,
    /// The actor dropped below the floor threshold.
    FellOutOfLevel,
}

impl DoneReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AttemptsComplete => "attemptsComplete",
            Self::MaxSteps => "maxSteps",
            Self::IdleTooLong => "idleTooLong",
            Self::FellOutOfLevel => "fellOutOfLevel",
        }
    }

    /// Whether this reason counts as the scenario completing as intended.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::AttemptsComplete)
    }
}

impl std::fmt::Display for DoneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one objective attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectiveStatus {
    Success,
    Timeout,
}

impl ObjectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Timeout => "timeout",
        }
    }
}

/// One resolved objective attempt. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObjectiveKind,
    pub status: ObjectiveStatus,
    pub elapsed_seconds: f64,
    /// 1-based position of this attempt against the global cap.
    pub attempt: u32,
    /// `goalFound` at the moment the attempt resolved.
    pub goal_found: u32,
}

/// One entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub timestamp: DateTime<Utc>,
    /// The payload exactly as received.
    pub raw_observation: String,
    /// Canonical wire form of the command sent back, if any.
    pub command_issued: Option<String>,
}

/// Read-only counters handed to the decision policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCounters {
    pub steps_taken: u32,
    pub max_steps: u32,
    pub idle_steps: u32,
    pub goal_found: u32,
    pub goal_total: u32,
    pub objective_index: usize,
    pub objective_attempts: u32,
    /// Resolved id of the objective currently being attempted.
    pub active_objective: Option<String>,
}

/// The live state of one test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: Uuid,
    pub scenario: ScenarioDefinition,
    pub steps_taken: u32,
    /// Length of the current run of consecutive idle steps.
    pub idle_steps: u32,
    /// Longest idle run seen so far.
    pub peak_idle_steps: u32,
    pub last_position: Option<Vec3>,
    pub last_yaw: Option<f64>,
    pub goal_found: u32,
    pub goal_total: u32,
    pub history: Vec<StepRecord>,
    pub done: bool,
    pub done_reason: Option<DoneReason>,
    /// Set once any step saw the actor below the floor with the fall
    /// constraint active.
    pub fell: bool,
    pub started_at: DateTime<Utc>,
    pub objective_index: usize,
    pub objective_attempts: u32,
    pub objective_started_at: Option<DateTime<Utc>>,
    pub objective_results: Vec<ObjectiveResult>,
}

impl Session {
    /// A fresh session bound to `scenario`.
    pub fn new(scenario: ScenarioDefinition, now: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            scenario,
            steps_taken: 0,
            idle_steps: 0,
            peak_idle_steps: 0,
            last_position: None,
            last_yaw: None,
            goal_found: 0,
            goal_total: 0,
            history: Vec::new(),
            done: false,
            done_reason: None,
            fell: false,
            started_at: now,
            objective_index: 0,
            objective_attempts: 0,
            objective_started_at: None,
            objective_results: Vec::new(),
        }
    }

    /// Mark the session terminal. The first reason sticks.
    pub fn finish(&mut self, reason: DoneReason) {
        if !self.done {
            self.done = true;
            self.done_reason = Some(reason);
        }
    }

    /// Resolved id of the objective at `objective_index`, if any.
    pub fn active_objective_id(&self) -> Option<String> {
        self.scenario
            .objectives
            .get(self.objective_index)
            .map(|o| o.resolved_id(self.objective_index))
    }

    pub fn counters(&self) -> SessionCounters {
        SessionCounters {
            steps_taken: self.steps_taken,
            max_steps: self.scenario.max_steps,
            idle_steps: self.idle_steps,
            goal_found: self.goal_found,
            goal_total: self.goal_total,
            objective_index: self.objective_index,
            objective_attempts: self.objective_attempts,
            active_objective: self.active_objective_id(),
        }
    }

    pub fn last_record(&self) -> Option<&StepRecord> {
        self.history.last()
    }
}
