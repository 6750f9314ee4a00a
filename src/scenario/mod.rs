//! Scenario definitions and the loaders that resolve them by name.
//!
//! - [`types`] -- the immutable [`ScenarioDefinition`], its objectives and
//!   constraints.
//! - [`loader`] -- the [`ScenarioLoader`] trait and a JSON [`DirectoryLoader`].

pub mod loader;
pub mod types;

pub use loader::{DirectoryLoader, ScenarioError, ScenarioLoader};
pub use types::{Constraints, Objective, ObjectiveKind, ScenarioDefinition};
