//! Scout: a scripted-exploration test-session orchestrator.
//!
//! An actor inside a game level streams observation snapshots; the
//! orchestrator tracks progress against a scenario's objectives and limits,
//! asks a decision policy for the next command, and reduces the whole run
//! into a report.

pub mod actor;
pub mod clock;
pub mod command;
pub mod config;
pub mod model;
pub mod observation;
pub mod policy;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod session;
