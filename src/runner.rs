//! Probe runner: drives an [`Actor`] against an [`Orchestrator`].
//!
//! The loop repeatedly:
//!   1. asks the actor for an observation payload,
//!   2. feeds it to the orchestrator's `step`,
//!   3. hands the returned command back to the actor,
//!
//! until the orchestrator answers with an empty command (the session is
//! done) or the iteration cap is reached. The report is returned either way.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::actor::Actor;
use crate::command::Command;
use crate::policy::DecisionPolicy;
use crate::report::{NarrativeGenerator, ReportDocument};
use crate::session::Orchestrator;

#[derive(Debug, Clone, Copy)]
pub struct ProbeRunner {
    /// Hard cap on loop iterations, independent of the scenario's budget.
    max_iterations: usize,
}

impl ProbeRunner {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub async fn run<A, P, N>(
        &self,
        actor: &mut A,
        orchestrator: &Orchestrator<P, N>,
    ) -> Result<ReportDocument>
    where
        A: Actor,
        P: DecisionPolicy,
        N: NarrativeGenerator,
    {
        let mut finished = false;

        for iteration in 0..self.max_iterations {
            let payload = actor.observe().await.context("actor failed to observe")?;
            let response = orchestrator.step(&payload).await;

            if response.is_terminal() {
                info!(iterations = iteration + 1, reason = %response.note, "probe finished");
                finished = true;
                break;
            }

            let command = Command::parse(&response.command)
                .with_context(|| format!("orchestrator issued invalid command {:?}", response.command))?;
            debug!(iteration, command = %command, note = %response.note, "executing");
            actor
                .execute(&command)
                .await
                .with_context(|| format!("actor failed to execute {command}"))?;
        }

        if !finished {
            warn!(
                max_iterations = self.max_iterations,
                "probe stopped at the iteration cap before the session finished"
            );
        }

        Ok(orchestrator.report().await)
    }
}

impl Default for ProbeRunner {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::SimulatedActor;
    use crate::config::ScoutConfig;
    use crate::policy::SweepPolicy;
    use crate::report::ReportStatus;
    use crate::scenario::{Constraints, DirectoryLoader, Objective, ScenarioDefinition};
    use crate::session::DoneReason;

    fn scenario(max_steps: u32, objectives: Vec<Objective>) -> ScenarioDefinition {
        ScenarioDefinition {
            name: "probe".into(),
            description: "runner test".into(),
            max_steps,
            objectives,
            constraints: Constraints {
                max_idle_steps: Some(10),
                avoid_falling: true,
            },
            decision_context: serde_json::Value::Null,
        }
    }

    async fn orchestrator(s: ScenarioDefinition) -> Orchestrator<SweepPolicy> {
        let orch = Orchestrator::new(
            SweepPolicy::default(),
            DirectoryLoader::new("does-not-exist"),
            &ScoutConfig::default(),
        );
        orch.start(s).await;
        orch
    }

    #[tokio::test]
    async fn runs_until_step_budget() {
        let orch = orchestrator(scenario(30, vec![])).await;
        let mut actor = SimulatedActor::with_goals(1, 500.0, vec![]);

        let report = ProbeRunner::default().run(&mut actor, &orch).await.unwrap();
        assert_eq!(report.done_reason, Some(DoneReason::MaxSteps));
        assert_eq!(report.steps_taken, 30);
        assert_eq!(report.command_histogram.values().sum::<usize>(), 29);
    }

    #[tokio::test]
    async fn walking_off_small_level_fails() {
        let orch = orchestrator(scenario(50, vec![])).await;
        let mut actor = SimulatedActor::with_goals(1, 3.0, vec![]);

        let report = ProbeRunner::default().run(&mut actor, &orch).await.unwrap();
        assert_eq!(report.done_reason, Some(DoneReason::FellOutOfLevel));
        assert_eq!(report.status, ReportStatus::Fail);
        assert_eq!(report.steps_taken, 3);
    }

    #[tokio::test]
    async fn collecting_goal_passes() {
        let orch = orchestrator(scenario(
            100,
            vec![Objective::goal_count_at_least("grab", 1)],
        ))
        .await;
        let mut actor = SimulatedActor::with_goals(1, 50.0, vec![(0.0, 2.5)]);

        let report = ProbeRunner::default().run(&mut actor, &orch).await.unwrap();
        assert_eq!(report.status, ReportStatus::Pass);
        assert_eq!(report.steps_taken, 6);
        assert!(report.objectives.iter().all(|o| o.passed));
    }

    #[tokio::test]
    async fn iteration_cap_stops_early() {
        let orch = orchestrator(scenario(100, vec![])).await;
        let mut actor = SimulatedActor::with_goals(1, 500.0, vec![]);

        let report = ProbeRunner::new(5).run(&mut actor, &orch).await.unwrap();
        assert_eq!(report.done_reason, None);
        assert_eq!(report.steps_taken, 5);
    }
}
