//! The interface of the thing being tested.
//!
//! An actor lives inside the level under test. It reports its state as a raw
//! JSON payload and carries out wire commands. The probe runner drives any
//! [`Actor`] against an orchestrator.

use anyhow::Result;

use crate::command::Command;

#[allow(async_fn_in_trait)]
pub trait Actor: Send + Sync {
    /// Serialize the current state as an observation payload.
    async fn observe(&mut self) -> Result<String>;

    /// Carry out one command.
    async fn execute(&mut self, command: &Command) -> Result<()>;
}
