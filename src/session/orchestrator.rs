//! The session orchestrator: owns one live session and runs the
//! observe -> evaluate -> decide cycle for every incoming snapshot.
//!
//! All operations take the same async lock, so `start`, `step` and `report`
//! are serialized per orchestrator. The lock is held across the decision
//! policy call; two racing `step`s can never interleave their updates.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::objectives::ObjectiveSequencer;
use super::progress::ProgressTracker;
use super::state::{DoneReason, Session, SessionCounters, StepRecord};
use super::termination::TerminationEvaluator;
use crate::clock::{Clock, SystemClock};
use crate::command::Command;
use crate::config::{ScoutConfig, FALLBACK_COMMAND};
use crate::observation::Observation;
use crate::policy::DecisionPolicy;
use crate::report::{
    NarrativeGenerator, NoNarrator, ReportDocument, NARRATIVE_DISABLED, NARRATIVE_FAILED,
};
use crate::scenario::{ScenarioDefinition, ScenarioError, ScenarioLoader};

// ---------------------------------------------------------------------------
// Boundary responses
// ---------------------------------------------------------------------------

/// Acknowledgement of a (re)started session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub ok: bool,
    pub active_test: String,
}

/// The answer to one observation. `command` is empty once the session is
/// terminal, in which case `note` carries the termination reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResponse {
    pub command: String,
    pub note: String,
}

impl StepResponse {
    fn terminal(reason: Option<DoneReason>) -> Self {
        Self {
            command: String::new(),
            note: reason.map(|r| r.as_str().to_string()).unwrap_or_default(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.command.is_empty()
    }
}

fn secs_to_duration(secs: f64, default: Duration) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator<P, N = NoNarrator> {
    policy: P,
    narrator: Option<N>,
    loader: Arc<dyn ScenarioLoader>,
    clock: Arc<dyn Clock>,
    tracker: ProgressTracker,
    sequencer: ObjectiveSequencer,
    evaluator: TerminationEvaluator,
    fallback_command: String,
    policy_timeout: Duration,
    narrative_timeout: Duration,
    session: Mutex<Option<Session>>,
}

impl<P: DecisionPolicy> Orchestrator<P, NoNarrator> {
    /// An orchestrator with no live session and no narrative generator.
    pub fn new(policy: P, loader: impl ScenarioLoader + 'static, config: &ScoutConfig) -> Self {
        let fallback_command = match Command::parse(&config.session.fallback_command) {
            Ok(command) => command.to_string(),
            Err(e) => {
                warn!(
                    configured = %config.session.fallback_command,
                    error = %e,
                    "configured fallback command is invalid; using the built-in one"
                );
                FALLBACK_COMMAND.to_string()
            }
        };

        Self {
            policy,
            narrator: None,
            loader: Arc::new(loader),
            clock: Arc::new(SystemClock),
            tracker: ProgressTracker::from_config(&config.session),
            sequencer: ObjectiveSequencer::from_config(&config.session),
            evaluator: TerminationEvaluator::from_config(&config.session),
            fallback_command,
            policy_timeout: secs_to_duration(config.policy.timeout_secs, Duration::from_secs(10)),
            narrative_timeout: secs_to_duration(
                config.narrative.timeout_secs,
                Duration::from_secs(20),
            ),
            session: Mutex::new(None),
        }
    }
}

impl<P: DecisionPolicy, N: NarrativeGenerator> Orchestrator<P, N> {
    /// Attach a narrative generator used by [`Orchestrator::report`].
    pub fn with_narrator<M: NarrativeGenerator>(self, narrator: M) -> Orchestrator<P, M> {
        Orchestrator {
            policy: self.policy,
            narrator: Some(narrator),
            loader: self.loader,
            clock: self.clock,
            tracker: self.tracker,
            sequencer: self.sequencer,
            evaluator: self.evaluator,
            fallback_command: self.fallback_command,
            policy_timeout: self.policy_timeout,
            narrative_timeout: self.narrative_timeout,
            session: self.session,
        }
    }

    /// Replace the time source (tests drive a [`crate::clock::ManualClock`]).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Names the scenario loader can resolve.
    pub fn list_scenarios(&self) -> Result<Vec<String>, ScenarioError> {
        self.loader.list()
    }

    fn fresh_session(&self, scenario: ScenarioDefinition) -> Session {
        let session = Session::new(scenario, self.clock.now());
        info!(
            session_id = %session.session_id,
            scenario = %session.scenario.name,
            max_steps = session.scenario.max_steps,
            objectives = session.scenario.objectives.len(),
            "session started"
        );
        session
    }

    // ------------------------------------------------------------------
    // start
    // ------------------------------------------------------------------

    /// Replace the live session with a fresh one bound to `scenario`.
    pub async fn start(&self, scenario: ScenarioDefinition) -> StartResponse {
        let session = self.fresh_session(scenario);
        let active_test = session.scenario.name.clone();
        *self.session.lock().await = Some(session);
        StartResponse {
            ok: true,
            active_test,
        }
    }

    /// Start the named scenario, or the built-in default for `None`.
    ///
    /// The built-in default is also reachable by its name unless the loader
    /// shadows it with a file of the same name. A load failure is returned
    /// to the caller and leaves the live session untouched.
    pub async fn start_named(&self, name: Option<&str>) -> Result<StartResponse, ScenarioError> {
        let scenario = match name {
            Some(name) => match self.loader.load(name) {
                Ok(scenario) => scenario,
                Err(ScenarioError::NotFound(_)) if name == ScenarioDefinition::DEFAULT_NAME => {
                    ScenarioDefinition::default_scenario()
                }
                Err(e) => {
                    warn!(scenario = name, error = %e, "failed to start scenario");
                    return Err(e);
                }
            },
            None => ScenarioDefinition::default_scenario(),
        };
        Ok(self.start(scenario).await)
    }

    // ------------------------------------------------------------------
    // step
    // ------------------------------------------------------------------

    /// Fold one raw observation into the session and choose the next
    /// command. Never fails: malformed payloads decode to defaults and
    /// policy failures fall back to the configured command.
    pub async fn step(&self, raw_observation: &str) -> StepResponse {
        let mut guard = self.session.lock().await;
        let session = guard.get_or_insert_with(|| {
            self.fresh_session(ScenarioDefinition::default_scenario())
        });

        if session.done {
            debug!(reason = ?session.done_reason, "step on a finished session ignored");
            return StepResponse::terminal(session.done_reason);
        }

        let now = self.clock.now();
        let observation = Observation::decode(raw_observation);

        session.steps_taken += 1;
        self.tracker.update(session, &observation);
        session.goal_found = observation.goal_found;
        session.goal_total = observation.goal_total;
        session.history.push(StepRecord {
            timestamp: now,
            raw_observation: raw_observation.to_string(),
            command_issued: None,
        });

        self.sequencer.advance(session, now);

        if let Some(reason) = self.evaluator.evaluate(session) {
            session.finish(reason);
            info!(
                session_id = %session.session_id,
                reason = reason.as_str(),
                steps = session.steps_taken,
                attempts = session.objective_attempts,
                "session finished"
            );
            return StepResponse::terminal(Some(reason));
        }

        let counters = session.counters();
        let (command, note) = self
            .decide(&observation, &session.scenario.decision_context, &counters)
            .await;

        if let Some(record) = session.history.last_mut() {
            record.command_issued = Some(command.clone());
        }
        debug!(step = session.steps_taken, command = %command, "step answered");

        StepResponse { command, note }
    }

    /// Ask the policy for a command under the configured timeout. Any
    /// failure yields the fallback command and a `fallback:` note.
    async fn decide(
        &self,
        observation: &Observation,
        context: &Value,
        counters: &SessionCounters,
    ) -> (String, String) {
        let call = self.policy.decide(observation, context, counters);
        let failure = match tokio::time::timeout(self.policy_timeout, call).await {
            Ok(Ok(decision)) => match Command::parse(&decision.command) {
                Ok(command) => return (command.to_string(), decision.note),
                Err(e) => format!("policy proposed unusable command {:?}: {e}", decision.command),
            },
            Ok(Err(e)) => format!("policy error: {e:#}"),
            Err(_) => format!(
                "policy timed out after {:.1}s",
                self.policy_timeout.as_secs_f64()
            ),
        };

        warn!(
            step = counters.steps_taken,
            reason = %failure,
            fallback = %self.fallback_command,
            "decision policy failed; issuing fallback command"
        );
        (self.fallback_command.clone(), format!("fallback: {failure}"))
    }

    // ------------------------------------------------------------------
    // report / snapshot
    // ------------------------------------------------------------------

    /// Reduce the current session into a report. Starts the default
    /// session first when none exists.
    pub async fn report(&self) -> ReportDocument {
        let mut guard = self.session.lock().await;
        let session = guard.get_or_insert_with(|| {
            self.fresh_session(ScenarioDefinition::default_scenario())
        });

        let mut document =
            ReportDocument::from_session(session, self.sequencer.max_attempts(), self.clock.now());
        document.narrative = self.narrate(&document.facts()).await;
        document
    }

    async fn narrate(&self, facts: &str) -> String {
        let Some(narrator) = &self.narrator else {
            return NARRATIVE_DISABLED.to_string();
        };

        match tokio::time::timeout(self.narrative_timeout, narrator.narrate(facts)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => {
                warn!("narrative generator returned nothing; using placeholder");
                NARRATIVE_FAILED.to_string()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "narrative generation failed; using placeholder");
                NARRATIVE_FAILED.to_string()
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.narrative_timeout.as_secs_f64(),
                    "narrative generation timed out; using placeholder"
                );
                NARRATIVE_FAILED.to_string()
            }
        }
    }

    /// A copy of the live session, if one has been started.
    pub async fn snapshot(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }
}
