//! Scenario definition types.
//!
//! A scenario is loaded once from JSON and never mutated by the orchestrator.
//! The wire format uses camelCase keys:
//!
//! ```json
//! {
//!   "name": "find_one_goal",
//!   "description": "Locate at least one goal marker.",
//!   "maxSteps": 50,
//!   "objectives": [ { "id": "first", "type": "goalCountAtLeast", "params": { "minimum": 1 } } ],
//!   "constraints": { "maxIdleSteps": 10, "avoidFalling": true },
//!   "decisionContext": "Explore the level and collect goals."
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Objective predicate type. Unrecognised type names are preserved so that
/// reports can show them, but they can never succeed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectiveKind {
    /// Succeeds once `goalFound >= params.minimum`.
    GoalCountAtLeast,
    /// Succeeds once every goal in the level has been found.
    AllGoalsFound,
    Unknown(String),
}

impl ObjectiveKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::GoalCountAtLeast => "goalCountAtLeast",
            Self::AllGoalsFound => "allGoalsFound",
            Self::Unknown(name) => name,
        }
    }
}

impl From<String> for ObjectiveKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "goalCountAtLeast" | "goal_count_at_least" => Self::GoalCountAtLeast,
            "allGoalsFound" | "all_goals_found" => Self::AllGoalsFound,
            _ => Self::Unknown(s),
        }
    }
}

impl From<ObjectiveKind> for String {
    fn from(kind: ObjectiveKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single success condition the session attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ObjectiveKind,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl Objective {
    pub fn goal_count_at_least(id: impl Into<String>, minimum: u32) -> Self {
        let mut params = serde_json::Map::new();
        params.insert("minimum".into(), minimum.into());
        Self {
            id: Some(id.into()),
            kind: ObjectiveKind::GoalCountAtLeast,
            params,
        }
    }

    /// The objective's id, or `objective_<n>` (1-based) when none was given.
    pub fn resolved_id(&self, index: usize) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => format!("objective_{}", index + 1),
        }
    }

    /// `params.minimum` for count objectives. Missing or non-numeric values
    /// mean 1.
    pub fn minimum(&self) -> u32 {
        self.params
            .get("minimum")
            .and_then(serde_json::Value::as_u64)
            .map_or(1, |m| u32::try_from(m).unwrap_or(u32::MAX))
    }

    /// Whether the objective is met by the given goal counters.
    pub fn is_satisfied(&self, goal_found: u32, goal_total: u32) -> bool {
        match &self.kind {
            ObjectiveKind::GoalCountAtLeast => goal_found >= self.minimum(),
            ObjectiveKind::AllGoalsFound => goal_total > 0 && goal_found >= goal_total,
            ObjectiveKind::Unknown(_) => false,
        }
    }

    /// Human-readable target, e.g. `goalFound >= 3`.
    pub fn target_text(&self) -> String {
        match &self.kind {
            ObjectiveKind::GoalCountAtLeast => format!("goalFound >= {}", self.minimum()),
            ObjectiveKind::AllGoalsFound => "goalFound >= goalTotal".to_string(),
            ObjectiveKind::Unknown(name) => format!("unsupported objective type `{name}`"),
        }
    }
}

/// Run-wide limits that are not objectives themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_idle_steps: Option<u32>,
    #[serde(default)]
    pub avoid_falling: bool,
}

/// The immutable description of one test scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub max_steps: u32,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub constraints: Constraints,
    /// Opaque prompt material handed to the decision policy.
    #[serde(default)]
    pub decision_context: serde_json::Value,
}

impl ScenarioDefinition {
    /// Name of the built-in scenario used when none is requested.
    pub const DEFAULT_NAME: &'static str = "free_explore";

    /// The built-in scenario a session falls back to when `step` or `report`
    /// is called before any `start`.
    pub fn default_scenario() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            description: "Free exploration: wander the level and collect at least one goal marker."
                .to_string(),
            max_steps: 200,
            objectives: vec![Objective::goal_count_at_least("collect_one_goal", 1)],
            constraints: Constraints {
                max_idle_steps: Some(20),
                avoid_falling: true,
            },
            decision_context: serde_json::Value::String(
                "Explore the level systematically. Found {goal_found} of {goal_total} goals \
                 after {steps_taken}/{max_steps} steps."
                    .to_string(),
            ),
        }
    }

    /// Look up an objective by its resolved id.
    pub fn objective_by_id(&self, id: &str) -> Option<&Objective> {
        self.objectives
            .iter()
            .enumerate()
            .find(|(i, o)| o.resolved_id(*i) == id)
            .map(|(_, o)| o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario_json() {
        let json = r#"{
            "name": "find_one",
            "description": "Find one goal",
            "maxSteps": 50,
            "objectives": [
                { "type": "goalCountAtLeast", "params": { "minimum": 2 } },
                { "id": "all", "type": "allGoalsFound" }
            ],
            "constraints": { "maxIdleSteps": 10, "avoidFalling": true },
            "decisionContext": { "hint": "look left" }
        }"#;
        let scenario: ScenarioDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.max_steps, 50);
        assert_eq!(scenario.objectives.len(), 2);
        assert_eq!(scenario.objectives[0].kind, ObjectiveKind::GoalCountAtLeast);
        assert_eq!(scenario.objectives[0].minimum(), 2);
        assert_eq!(scenario.objectives[0].resolved_id(0), "objective_1");
        assert_eq!(scenario.objectives[1].resolved_id(1), "all");
        assert_eq!(scenario.constraints.max_idle_steps, Some(10));
        assert!(scenario.constraints.avoid_falling);
        assert_eq!(scenario.decision_context["hint"], "look left");
    }

    #[test]
    fn test_minimal_scenario_uses_defaults() {
        let scenario: ScenarioDefinition =
            serde_json::from_str(r#"{ "name": "bare", "maxSteps": 5 }"#).unwrap();
        assert!(scenario.objectives.is_empty());
        assert!(scenario.constraints.max_idle_steps.is_none());
        assert!(!scenario.constraints.avoid_falling);
        assert!(scenario.decision_context.is_null());
    }

    #[test]
    fn test_unknown_objective_kind_never_succeeds() {
        let objective: Objective =
            serde_json::from_str(r#"{ "type": "reachExit", "params": { "minimum": 0 } }"#).unwrap();
        assert_eq!(objective.kind, ObjectiveKind::Unknown("reachExit".into()));
        assert!(!objective.is_satisfied(100, 100));
        assert_eq!(objective.kind.to_string(), "reachExit");
    }

    #[test]
    fn test_goal_count_predicate() {
        let objective = Objective::goal_count_at_least("g", 3);
        assert!(!objective.is_satisfied(2, 5));
        assert!(objective.is_satisfied(3, 5));
        assert_eq!(objective.target_text(), "goalFound >= 3");
    }

    #[test]
    fn test_missing_minimum_defaults_to_one() {
        let objective: Objective =
            serde_json::from_str(r#"{ "type": "goalCountAtLeast", "params": { "minimum": "two" } }"#)
                .unwrap();
        assert_eq!(objective.minimum(), 1);
    }

    #[test]
    fn test_all_goals_found_requires_known_total() {
        let objective: Objective = serde_json::from_str(r#"{ "type": "allGoalsFound" }"#).unwrap();
        assert!(!objective.is_satisfied(0, 0));
        assert!(!objective.is_satisfied(2, 3));
        assert!(objective.is_satisfied(3, 3));
    }

    #[test]
    fn test_kind_serializes_as_plain_string() {
        let json = serde_json::to_value(Objective::goal_count_at_least("x", 1)).unwrap();
        assert_eq!(json["type"], "goalCountAtLeast");
        assert_eq!(json["params"]["minimum"], 1);
    }

    #[test]
    fn test_objective_by_id_matches_positional_names() {
        let mut scenario = ScenarioDefinition::default_scenario();
        scenario.objectives.push(Objective {
            id: None,
            kind: ObjectiveKind::AllGoalsFound,
            params: serde_json::Map::new(),
        });
        assert!(scenario.objective_by_id("collect_one_goal").is_some());
        assert_eq!(
            scenario.objective_by_id("objective_2").map(|o| o.kind.clone()),
            Some(ObjectiveKind::AllGoalsFound)
        );
        assert!(scenario.objective_by_id("missing").is_none());
    }
}
