//! Session state and the orchestrator that drives it.
//!
//! - [`state`] -- the session record, step history and termination reasons.
//! - [`progress`] -- idle detection and out-of-bounds tracking.
//! - [`objectives`] -- attempt sequencing with a global cap.
//! - [`termination`] -- the prioritized stop decision.
//! - [`orchestrator`] -- `start` / `step` / `report` over one live session.

pub mod objectives;
pub mod orchestrator;
pub mod progress;
pub mod state;
pub mod termination;

pub use objectives::ObjectiveSequencer;
pub use orchestrator::{Orchestrator, StartResponse, StepResponse};
pub use progress::{yaw_delta, ProgressTracker};
pub use state::{
    DoneReason, ObjectiveResult, ObjectiveStatus, Session, SessionCounters, StepRecord,
};
pub use termination::TerminationEvaluator;
